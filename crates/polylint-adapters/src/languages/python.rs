//! Python adapter (tree-sitter-python node names).

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

/// Normalizes Python trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonAdapter;

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Python
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "module" => NodeKind::File,
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                NodeKind::Import
            }
            "class_definition" => NodeKind::Class,
            "function_definition" | "lambda" => NodeKind::Function,
            "call" => NodeKind::Call,
            "keyword_argument" => NodeKind::Argument,
            "identifier" => NodeKind::Identifier,
            "string" if literal::has_child_kind(node, &["interpolation"]) => {
                NodeKind::TemplateString
            }
            "string" | "concatenated_string" => NodeKind::StringLiteral,
            "integer" | "float" => NodeKind::NumberLiteral,
            "true" | "false" => NodeKind::BooleanLiteral,
            "comment" => NodeKind::Comment,
            "decorator" => NodeKind::Annotation,
            "block" => NodeKind::Block,
            "expression_statement" | "return_statement" | "raise_statement" => NodeKind::Statement,
            "assignment" | "augmented_assignment" => NodeKind::Assignment,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        literal::extract(kind, node, |text| {
            literal::unquote(
                literal::strip_prefix_letters(text, "rRbBuUfF"),
                &["\"\"\"", "'''", "\"", "'"],
            )
        })
    }

    fn leading_suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        (node.kind == "comment")
            .then(|| suppress::comment(literal::comment_body(node.text_or_empty()), &[]))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f_strings_are_templates() {
        let f = ExternalNode::new("string", 0, 12)
            .with_text("f'Hi {name}'")
            .with_child(ExternalNode::new("interpolation", 5, 11));
        assert_eq!(PythonAdapter.classify(&f), NodeKind::TemplateString);
        assert_eq!(
            PythonAdapter.extract_literal(NodeKind::TemplateString, &f),
            Some("Hi {name}".to_string())
        );
    }

    #[test]
    fn triple_quoted_strings_are_unquoted() {
        let s = ExternalNode::new("string", 0, 13).with_text("\"\"\"Welcome\"\"\"");
        assert_eq!(PythonAdapter.classify(&s), NodeKind::StringLiteral);
        assert_eq!(
            PythonAdapter.extract_literal(NodeKind::StringLiteral, &s),
            Some("Welcome".to_string())
        );
    }

    #[test]
    fn noinspection_comment_leads() {
        let c = ExternalNode::new("comment", 0, 20).with_text("# noinspection R1");
        assert_eq!(
            PythonAdapter.leading_suppression(&c),
            Some(Suppression::Rules(vec!["R1".to_string()]))
        );
    }
}
