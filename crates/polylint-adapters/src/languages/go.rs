//! Go adapter (tree-sitter-go node names).
//!
//! `//nolint:R1,R2` is honored alongside `noinspection`.

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

/// Normalizes Go trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoAdapter;

impl LanguageAdapter for GoAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Go
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "source_file" => NodeKind::File,
            "package_clause" => NodeKind::Module,
            "import_declaration" | "import_spec" => NodeKind::Import,
            "type_declaration" | "type_spec" => NodeKind::Class,
            "function_declaration" | "method_declaration" | "func_literal" => NodeKind::Function,
            "call_expression" => NodeKind::Call,
            "identifier" | "field_identifier" | "package_identifier" | "type_identifier" => {
                NodeKind::Identifier
            }
            "interpreted_string_literal" | "raw_string_literal" | "rune_literal" => {
                NodeKind::StringLiteral
            }
            "int_literal" | "float_literal" | "imaginary_literal" => NodeKind::NumberLiteral,
            "true" | "false" => NodeKind::BooleanLiteral,
            "comment" => NodeKind::Comment,
            "block" => NodeKind::Block,
            "expression_statement" | "return_statement" | "go_statement" => NodeKind::Statement,
            "assignment_statement" | "short_var_declaration" => NodeKind::Assignment,
            "keyed_element" => NodeKind::Expression,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        literal::extract(kind, node, |text| literal::unquote(text, &["\"", "`", "'"]))
    }

    fn leading_suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        (node.kind == "comment")
            .then(|| suppress::comment(literal::comment_body(node.text_or_empty()), &["nolint"]))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nolint_lists_ids() {
        let c = ExternalNode::new("comment", 0, 20).with_text("//nolint:R1,R2");
        assert_eq!(
            GoAdapter.leading_suppression(&c),
            Some(Suppression::Rules(vec!["R1".to_string(), "R2".to_string()]))
        );
        let bare = ExternalNode::new("comment", 0, 9).with_text("//nolint");
        assert_eq!(GoAdapter.leading_suppression(&bare), Some(Suppression::All));
    }

    #[test]
    fn raw_strings_are_unquoted() {
        let s = ExternalNode::new("raw_string_literal", 0, 7).with_text("`a\\nb`");
        assert_eq!(
            GoAdapter.extract_literal(NodeKind::StringLiteral, &s),
            Some("a\\nb".to_string())
        );
    }
}
