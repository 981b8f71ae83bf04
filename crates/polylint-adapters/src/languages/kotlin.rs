//! Kotlin adapter (tree-sitter-kotlin-ng node names).

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

const DECLARATIONS: &[&str] = &[
    "source_file",
    "class_declaration",
    "object_declaration",
    "companion_object",
    "function_declaration",
    "property_declaration",
    "secondary_constructor",
];

/// Normalizes Kotlin trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct KotlinAdapter;

impl LanguageAdapter for KotlinAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Kotlin
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "source_file" => NodeKind::File,
            "package_header" => NodeKind::Module,
            "import" | "import_header" => NodeKind::Import,
            "class_declaration" | "object_declaration" | "companion_object" => NodeKind::Class,
            "function_declaration" | "anonymous_function" | "secondary_constructor" => {
                NodeKind::Function
            }
            "call_expression" | "constructor_invocation" => NodeKind::Call,
            "value_argument" => NodeKind::Argument,
            "identifier" | "simple_identifier" => NodeKind::Identifier,
            "string_literal" | "multiline_string_literal"
                if literal::has_child_kind(node, &["interpolat", "template"]) =>
            {
                NodeKind::TemplateString
            }
            "string_literal" | "multiline_string_literal" | "character_literal" => {
                NodeKind::StringLiteral
            }
            "integer_literal" | "long_literal" | "hex_literal" | "bin_literal" | "real_literal"
            | "unsigned_literal" => NodeKind::NumberLiteral,
            "boolean_literal" => NodeKind::BooleanLiteral,
            "line_comment" | "block_comment" | "multiline_comment" => NodeKind::Comment,
            "annotation" | "file_annotation" => NodeKind::Annotation,
            "block" | "function_body" | "class_body" | "statements" => NodeKind::Block,
            "property_declaration" | "assignment" => NodeKind::Assignment,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        literal::extract(kind, node, |text| {
            literal::unquote(text, &["\"\"\"", "\"", "'"])
        })
    }

    fn suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        if !DECLARATIONS.contains(&node.kind.as_str()) {
            return None;
        }
        suppress::annotated(node, &["annotation", "file_annotation"], &["modifiers"])
    }

    fn leading_suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        matches!(node.kind.as_str(), "line_comment" | "block_comment")
            .then(|| suppress::comment(literal::comment_body(node.text_or_empty()), &[]))
            .flatten()
    }
}
