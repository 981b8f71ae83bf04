//! PHP adapter (tree-sitter-php node names).

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

/// Normalizes PHP trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpAdapter;

impl LanguageAdapter for PhpAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Php
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "program" => NodeKind::File,
            "namespace_definition" => NodeKind::Module,
            "namespace_use_declaration" | "include_expression" | "require_expression" => {
                NodeKind::Import
            }
            "class_declaration" | "interface_declaration" | "trait_declaration"
            | "enum_declaration" => NodeKind::Class,
            "function_definition" | "method_declaration" | "anonymous_function"
            | "arrow_function" => NodeKind::Function,
            "function_call_expression"
            | "member_call_expression"
            | "scoped_call_expression"
            | "object_creation_expression" => NodeKind::Call,
            "argument" => NodeKind::Argument,
            "name" | "variable_name" => NodeKind::Identifier,
            "encapsed_string" | "heredoc"
                if literal::has_child_kind(node, &["variable_name", "dynamic_variable_name"]) =>
            {
                NodeKind::TemplateString
            }
            "string" | "encapsed_string" | "heredoc" | "nowdoc" => NodeKind::StringLiteral,
            "integer" | "float" => NodeKind::NumberLiteral,
            "boolean" => NodeKind::BooleanLiteral,
            "comment" => NodeKind::Comment,
            "attribute" | "attribute_list" => NodeKind::Annotation,
            "compound_statement" | "declaration_list" => NodeKind::Block,
            "expression_statement" | "echo_statement" | "return_statement" => NodeKind::Statement,
            "assignment_expression" => NodeKind::Assignment,
            "text" => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        let value = literal::extract(kind, node, |text| literal::unquote(text, &["\"", "'"]))?;
        Some(if kind == NodeKind::Text {
            value.trim().to_string()
        } else {
            value
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
    fn interpolated_strings_are_templates() {
        let s = ExternalNode::new("encapsed_string", 0, 14)
            .with_text("\"Hello $name\"")
            .with_child(ExternalNode::new("variable_name", 7, 12));
        assert_eq!(PhpAdapter.classify(&s), NodeKind::TemplateString);

        let plain = ExternalNode::new("encapsed_string", 0, 7).with_text("\"Hello\"");
        assert_eq!(PhpAdapter.classify(&plain), NodeKind::StringLiteral);
    }

    #[test]
    fn docblock_noinspection() {
        let c = ExternalNode::new("comment", 0, 30).with_text("/** @noinspection R1 */");
        assert_eq!(
            PhpAdapter.leading_suppression(&c),
            Some(Suppression::Rules(vec!["R1".to_string()]))
        );
    }
}
