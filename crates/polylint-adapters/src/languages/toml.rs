//! TOML adapter (tree-sitter-toml node names).

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

fn unquote(text: &str) -> &str {
    literal::unquote(text, &["\"\"\"", "'''", "\"", "'"])
}

/// Normalizes TOML trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlAdapter;

impl LanguageAdapter for TomlAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Toml
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "document" => NodeKind::File,
            "table" | "table_array_element" => NodeKind::Table,
            "pair" => NodeKind::Assignment,
            "bare_key" | "quoted_key" | "dotted_key" => NodeKind::Key,
            "string" => NodeKind::StringLiteral,
            "integer" | "float" => NodeKind::NumberLiteral,
            "boolean" => NodeKind::BooleanLiteral,
            "comment" => NodeKind::Comment,
            "array" | "inline_table" => NodeKind::Expression,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        match kind {
            NodeKind::Key => node.text.as_deref().map(|text| unquote(text).to_string()),
            _ => literal::extract(kind, node, unquote),
        }
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
    fn quoted_keys_and_multiline_strings() {
        let key = ExternalNode::new("quoted_key", 0, 7).with_text("\"title\"");
        assert_eq!(TomlAdapter.classify(&key), NodeKind::Key);
        assert_eq!(
            TomlAdapter.extract_literal(NodeKind::Key, &key),
            Some("title".to_string())
        );

        let s = ExternalNode::new("string", 0, 11).with_text("'''Hello'''");
        assert_eq!(
            TomlAdapter.extract_literal(NodeKind::StringLiteral, &s),
            Some("Hello".to_string())
        );
    }
}
