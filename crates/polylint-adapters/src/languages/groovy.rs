//! Groovy adapter (tree-sitter-groovy node names).

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

const DECLARATIONS: &[&str] = &[
    "class_declaration",
    "function_definition",
    "method_declaration",
    "declaration",
];

/// Normalizes Groovy trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroovyAdapter;

impl LanguageAdapter for GroovyAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Groovy
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "source_file" => NodeKind::File,
            "groovy_package" | "package_declaration" => NodeKind::Module,
            "groovy_import" | "import_declaration" => NodeKind::Import,
            "class_declaration" => NodeKind::Class,
            "function_definition" | "method_declaration" | "closure" => NodeKind::Function,
            "function_call" | "method_invocation" | "juxt_function_call" => NodeKind::Call,
            "identifier" => NodeKind::Identifier,
            "string" if literal::has_child_kind(node, &["interpolation"]) => {
                NodeKind::TemplateString
            }
            "string" | "string_literal" => NodeKind::StringLiteral,
            "number_literal" | "integer_literal" | "decimal_floating_point_literal" => {
                NodeKind::NumberLiteral
            }
            "boolean_literal" | "true" | "false" => NodeKind::BooleanLiteral,
            "comment" | "line_comment" | "block_comment" => NodeKind::Comment,
            "annotation" | "marker_annotation" => NodeKind::Annotation,
            "block" | "closure_body" | "class_body" => NodeKind::Block,
            "assignment" | "declaration" => NodeKind::Assignment,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        literal::extract(kind, node, |text| {
            literal::unquote(text, &["\"\"\"", "'''", "\"", "'", "/"])
        })
    }

    fn suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        if !DECLARATIONS.contains(&node.kind.as_str()) {
            return None;
        }
        suppress::annotated(node, &["annotation", "marker_annotation"], &["modifiers"])
    }

    fn leading_suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        matches!(node.kind.as_str(), "comment" | "line_comment" | "block_comment")
            .then(|| suppress::comment(literal::comment_body(node.text_or_empty()), &[]))
            .flatten()
    }
}
