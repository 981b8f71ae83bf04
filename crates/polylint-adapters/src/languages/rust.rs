//! Rust adapter (tree-sitter-rust node names).
//!
//! Outer attributes such as `#[allow(polylint::R1)]` suppress the item that
//! follows them; inner attributes (`#![allow(R1)]`) suppress their
//! enclosing item or file.

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

/// Normalizes Rust trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustAdapter;

impl LanguageAdapter for RustAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Rust
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "source_file" => NodeKind::File,
            "mod_item" => NodeKind::Module,
            "use_declaration" | "extern_crate_declaration" => NodeKind::Import,
            "struct_item" | "enum_item" | "trait_item" | "impl_item" | "union_item" => {
                NodeKind::Class
            }
            "function_item" | "closure_expression" => NodeKind::Function,
            "call_expression" | "macro_invocation" => NodeKind::Call,
            "identifier" | "field_identifier" | "type_identifier" => NodeKind::Identifier,
            "string_literal" | "raw_string_literal" | "char_literal" => NodeKind::StringLiteral,
            "integer_literal" | "float_literal" => NodeKind::NumberLiteral,
            "boolean_literal" => NodeKind::BooleanLiteral,
            "line_comment" | "block_comment" => NodeKind::Comment,
            "attribute_item" | "inner_attribute_item" => NodeKind::Annotation,
            "block" | "declaration_list" => NodeKind::Block,
            "expression_statement" | "let_declaration" => NodeKind::Statement,
            "assignment_expression" | "compound_assignment_expr" => NodeKind::Assignment,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        literal::extract(kind, node, |text| {
            let text = literal::strip_raw_hashes(literal::strip_prefix_letters(text, "b"));
            literal::unquote(text, &["\"", "'"])
        })
    }

    fn suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        node.children
            .iter()
            .filter(|child| child.kind == "inner_attribute_item")
            .filter_map(|child| suppress::attribute(child.text_or_empty()))
            .reduce(Suppression::merge)
    }

    fn leading_suppression(&self, node: &ExternalNode) -> Option<Suppression> {
        match node.kind.as_str() {
            "attribute_item" => suppress::attribute(node.text_or_empty()),
            "line_comment" | "block_comment" => {
                suppress::comment(literal::comment_body(node.text_or_empty()), &[])
            }
            _ => None,
        }
    }
}
