//! Dart adapter (tree-sitter-dart node names).
//!
//! Besides `noinspection`, the analyzer's own `// ignore: id` comments
//! suppress the following node.

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

/// Normalizes Dart trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct DartAdapter;

impl LanguageAdapter for DartAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Dart
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "program" => NodeKind::File,
            "library_name" | "part_of_directive" => NodeKind::Module,
            "import_or_export" | "import_specification" => NodeKind::Import,
            "class_definition" | "mixin_declaration" | "extension_declaration"
            | "enum_declaration" => NodeKind::Class,
            "function_signature" | "method_signature" | "function_expression" => {
                NodeKind::Function
            }
            "argument_part" => NodeKind::Call,
            "argument" | "named_argument" => NodeKind::Argument,
            "identifier" => NodeKind::Identifier,
            "string_literal" if literal::has_child_kind(node, &["template_substitution"]) => {
                NodeKind::TemplateString
            }
            "string_literal" => NodeKind::StringLiteral,
            "decimal_integer_literal" | "decimal_floating_point_literal"
            | "hex_integer_literal" => NodeKind::NumberLiteral,
            "true" | "false" | "boolean_literal" => NodeKind::BooleanLiteral,
            "comment" | "documentation_comment" => NodeKind::Comment,
            "annotation" | "marker_annotation" => NodeKind::Annotation,
            "block" | "class_body" => NodeKind::Block,
            "expression_statement" | "return_statement" => NodeKind::Statement,
            "assignment_expression" | "initialized_variable_definition" => NodeKind::Assignment,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        literal::extract(kind, node, |text| {
            literal::unquote(
                literal::strip_prefix_letters(text, "r"),
                &["\"\"\"", "'''", "\"", "'"],
            )
        })
    }

    fn leading_suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        (node.kind == "comment")
            .then(|| suppress::comment(literal::comment_body(node.text_or_empty()), &["ignore"]))
            .flatten()
    }
}
