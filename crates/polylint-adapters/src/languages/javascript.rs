//! JavaScript adapter (tree-sitter-javascript node names).

use polylint_core::{ExternalNode, LanguageAdapter, LanguageId, NodeKind, Suppression};

use crate::{literal, suppress};

/// Normalizes JavaScript trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScriptAdapter;

impl LanguageAdapter for JavaScriptAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::JavaScript
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "program" => NodeKind::File,
            "import_statement" => NodeKind::Import,
            "class_declaration" | "class" => NodeKind::Class,
            "function_declaration"
            | "function_expression"
            | "function"
            | "arrow_function"
            | "method_definition"
            | "generator_function_declaration" => NodeKind::Function,
            "call_expression" | "new_expression" => NodeKind::Call,
            "identifier" | "property_identifier" | "shorthand_property_identifier" => {
                NodeKind::Identifier
            }
            "string" => NodeKind::StringLiteral,
            "template_string" => NodeKind::TemplateString,
            "number" => NodeKind::NumberLiteral,
            "true" | "false" => NodeKind::BooleanLiteral,
            "comment" => NodeKind::Comment,
            "decorator" => NodeKind::Annotation,
            "statement_block" | "class_body" => NodeKind::Block,
            "expression_statement" | "return_statement" | "throw_statement" => NodeKind::Statement,
            "assignment_expression" | "variable_declarator" => NodeKind::Assignment,
            "jsx_text" => NodeKind::Text,
            "pair" => NodeKind::Expression,
            "property_key" => NodeKind::Key,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        let value = literal::extract(kind, node, |text| {
            literal::unquote(text, &["\"", "'", "`"])
        })?;
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
    fn template_strings_and_jsx_text() {
        let t = ExternalNode::new("template_string", 0, 14).with_text("`Hi ${name}!`");
        assert_eq!(JavaScriptAdapter.classify(&t), NodeKind::TemplateString);
        assert_eq!(
            JavaScriptAdapter.extract_literal(NodeKind::TemplateString, &t),
            Some("Hi ${name}!".to_string())
        );

        let jsx = ExternalNode::new("jsx_text", 0, 12).with_text("\n  Sign in\n");
        assert_eq!(JavaScriptAdapter.classify(&jsx), NodeKind::Text);
        assert_eq!(
            JavaScriptAdapter.extract_literal(NodeKind::Text, &jsx),
            Some("Sign in".to_string())
        );
    }

    #[test]
    fn block_comment_directive() {
        let c = ExternalNode::new("comment", 0, 30).with_text("/* noinspection R1, R2 */");
        assert_eq!(
            JavaScriptAdapter.leading_suppression(&c),
            Some(Suppression::Rules(vec!["R1".to_string(), "R2".to_string()]))
        );
    }
}
