//! Ruby adapter (tree-sitter-ruby node names).

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

/// Normalizes Ruby trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct RubyAdapter;

impl LanguageAdapter for RubyAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Ruby
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "program" => NodeKind::File,
            "module" => NodeKind::Module,
            "class" | "singleton_class" => NodeKind::Class,
            "method" | "singleton_method" | "lambda" | "block" | "do_block" => NodeKind::Function,
            "call" => NodeKind::Call,
            "pair" => NodeKind::Argument,
            "identifier" | "constant" => NodeKind::Identifier,
            "string" | "heredoc_body"
                if literal::has_child_kind(node, &["interpolation"]) =>
            {
                NodeKind::TemplateString
            }
            "string" | "heredoc_body" | "simple_symbol" => NodeKind::StringLiteral,
            "integer" | "float" | "rational" => NodeKind::NumberLiteral,
            "true" | "false" => NodeKind::BooleanLiteral,
            "comment" => NodeKind::Comment,
            "body_statement" | "begin_block" => NodeKind::Block,
            "assignment" | "operator_assignment" => NodeKind::Assignment,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        literal::extract(kind, node, |text| {
            literal::unquote(text.strip_prefix(':').unwrap_or(text), &["\"", "'"])
        })
    }

    fn leading_suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        (node.kind == "comment")
            .then(|| suppress::comment(literal::comment_body(node.text_or_empty()), &[]))
            .flatten()
    }
}
