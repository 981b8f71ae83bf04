//! Scala adapter (tree-sitter-scala node names).

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

const DECLARATIONS: &[&str] = &[
    "class_definition",
    "object_definition",
    "trait_definition",
    "enum_definition",
    "function_definition",
    "val_definition",
    "var_definition",
];

/// Normalizes Scala trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalaAdapter;

impl LanguageAdapter for ScalaAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Scala
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "compilation_unit" => NodeKind::File,
            "package_clause" => NodeKind::Module,
            "import_declaration" => NodeKind::Import,
            "class_definition" | "object_definition" | "trait_definition" | "enum_definition" => {
                NodeKind::Class
            }
            "function_definition" | "function_declaration" | "lambda_expression" => {
                NodeKind::Function
            }
            "call_expression" | "instance_expression" => NodeKind::Call,
            "identifier" | "operator_identifier" => NodeKind::Identifier,
            "string" | "character_literal" => NodeKind::StringLiteral,
            "interpolated_string_expression" | "interpolated_string" => NodeKind::TemplateString,
            "integer_literal" | "floating_point_literal" => NodeKind::NumberLiteral,
            "boolean_literal" => NodeKind::BooleanLiteral,
            "comment" | "block_comment" => NodeKind::Comment,
            "annotation" => NodeKind::Annotation,
            "block" | "template_body" => NodeKind::Block,
            "val_definition" | "var_definition" | "assignment_expression" => NodeKind::Assignment,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        literal::extract(kind, node, |text| {
            // s"...", f"...", raw"..." interpolators
            let text = text.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
            literal::unquote(text, &["\"\"\"", "\"", "'"])
        })
    }

    fn suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        if !DECLARATIONS.contains(&node.kind.as_str()) {
            return None;
        }
        suppress::annotated(node, &["annotation"], &["modifiers"])
    }

    fn leading_suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        matches!(node.kind.as_str(), "comment" | "block_comment")
            .then(|| suppress::comment(literal::comment_body(node.text_or_empty()), &[]))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolated_strings_drop_interpolator() {
        let s = ExternalNode::new("interpolated_string_expression", 0, 15)
            .with_text("s\"Hello, $name\"");
        assert_eq!(ScalaAdapter.classify(&s), NodeKind::TemplateString);
        assert_eq!(
            ScalaAdapter.extract_literal(NodeKind::TemplateString, &s),
            Some("Hello, $name".to_string())
        );
    }

    #[test]
    fn suppress_warnings_annotation() {
        let class = ExternalNode::new("class_definition", 0, 90).with_child(
            ExternalNode::new("annotation", 0, 30).with_text("@SuppressWarnings(Array(\"R1\"))"),
        );
        assert_eq!(
            ScalaAdapter.suppression(&class),
            Some(Suppression::Rules(vec!["R1".to_string()]))
        );
    }
}
