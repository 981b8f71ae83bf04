//! TeX / LaTeX adapter (tree-sitter-latex node names).
//!
//! `%! suppress = R1` comments suppress the following node.

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

/// Normalizes LaTeX trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct TexAdapter;

impl LanguageAdapter for TexAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Tex
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "source_file" => NodeKind::File,
            "part" | "chapter" | "section" | "subsection" | "subsubsection" | "paragraph"
            | "subparagraph" | "curly_group" | "generic_environment" | "math_environment" => {
                NodeKind::Block
            }
            "generic_command" => NodeKind::Call,
            "command_name" => NodeKind::Command,
            "text" => NodeKind::Text,
            "word" => NodeKind::Other,
            "line_comment" | "block_comment" | "comment_environment" => NodeKind::Comment,
            "package_include" | "class_include" | "latex_include" => NodeKind::Import,
            "new_command_definition" | "old_command_definition" => NodeKind::Function,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        let value = literal::extract(kind, node, |text| text)?;
        Some(match kind {
            NodeKind::Text => value.split_whitespace().collect::<Vec<_>>().join(" "),
            NodeKind::Command => value.trim_start_matches('\\').to_string(),
            _ => value,
        })
    }

    fn leading_suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        (node.kind == "line_comment")
            .then(|| suppress::comment(literal::comment_body(node.text_or_empty()), &["suppress"]))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_and_text() {
        let cmd = ExternalNode::new("command_name", 0, 8).with_text("\\section");
        assert_eq!(TexAdapter.classify(&cmd), NodeKind::Command);
        assert_eq!(
            TexAdapter.extract_literal(NodeKind::Command, &cmd),
            Some("section".to_string())
        );

        let text = ExternalNode::new("text", 0, 16).with_text("Hello\n   world");
        assert_eq!(
            TexAdapter.extract_literal(NodeKind::Text, &text),
            Some("Hello world".to_string())
        );
    }

    #[test]
    fn suppress_directive() {
        let c = ExternalNode::new("line_comment", 0, 20).with_text("%! suppress = R1");
        assert_eq!(
            TexAdapter.leading_suppression(&c),
            Some(Suppression::Rules(vec!["R1".to_string()]))
        );
    }
}
