//! Literal extraction helpers shared by the language adapters.

use polylint_core::{ExternalNode, NodeKind};

/// Strips one layer of matching quotes.
///
/// Triple quotes are tried before single ones. Text without a recognized
/// quote pair is returned unchanged.
#[must_use]
pub fn unquote<'a>(text: &'a str, quotes: &[&str]) -> &'a str {
    let mut sorted: Vec<&str> = quotes.to_vec();
    sorted.sort_by_key(|q| std::cmp::Reverse(q.len()));
    for quote in sorted {
        if text.len() >= 2 * quote.len() {
            if let Some(inner) = text
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
            {
                return inner;
            }
        }
    }
    text
}

/// Strips leading string prefix letters (`r`, `b`, `f`, ...) before a quote.
#[must_use]
pub fn strip_prefix_letters<'a>(text: &'a str, letters: &str) -> &'a str {
    let start = text
        .char_indices()
        .find(|(_, c)| !letters.contains(*c))
        .map_or(text.len(), |(i, _)| i);
    let rest = &text[start..];
    if rest.starts_with(['"', '\'', '`']) {
        rest
    } else {
        text
    }
}

/// Strips Rust raw-string hashes: `r#"x"#` becomes `"x"`.
#[must_use]
pub fn strip_raw_hashes(text: &str) -> &str {
    let Some(rest) = text.strip_prefix('r').or_else(|| text.strip_prefix("br")) else {
        return text;
    };
    let hashes = rest.len() - rest.trim_start_matches('#').len();
    if hashes == 0 {
        return rest;
    }
    let fence = &rest[..hashes];
    rest[hashes..].strip_suffix(fence).unwrap_or(text)
}

/// Returns the body of a comment without its markers.
#[must_use]
pub fn comment_body(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("/**")
        .or_else(|| text.strip_prefix("/*"))
        .map_or(text, |body| body.strip_suffix("*/").unwrap_or(body));
    let text = ["///", "//!", "//", "#", "%", "--"]
        .iter()
        .find_map(|marker| text.strip_prefix(marker))
        .unwrap_or(text);
    text.trim().trim_start_matches('*').trim()
}

/// Extracts a literal for `kind` from the node text.
///
/// `unquote_string` turns raw string source into its contents; comments
/// lose their markers; other literal-carrying kinds keep their raw text.
pub fn extract(
    kind: NodeKind,
    node: &ExternalNode,
    unquote_string: impl Fn(&str) -> &str,
) -> Option<String> {
    let text = node.text.as_deref()?;
    match kind {
        NodeKind::StringLiteral | NodeKind::TemplateString => Some(unquote_string(text).to_string()),
        NodeKind::Comment => Some(comment_body(text).to_string()),
        k if k.carries_literal() => Some(text.to_string()),
        _ => None,
    }
}

/// Returns true if any direct child's kind starts with one of `prefixes`.
#[must_use]
pub fn has_child_kind(node: &ExternalNode, prefixes: &[&str]) -> bool {
    node.children
        .iter()
        .any(|c| prefixes.iter().any(|p| c.kind.starts_with(p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_prefers_triple_quotes() {
        assert_eq!(unquote("\"\"\"doc\"\"\"", &["\"", "\"\"\""]), "doc");
        assert_eq!(unquote("'x'", &["'", "\""]), "x");
        assert_eq!(unquote("plain", &["\""]), "plain");
        assert_eq!(unquote("\"", &["\""]), "\"");
    }

    #[test]
    fn prefix_letters_only_before_quotes() {
        assert_eq!(strip_prefix_letters("f'hi {x}'", "rRbBuUfF"), "'hi {x}'");
        assert_eq!(strip_prefix_letters("rb\"x\"", "rRbBuUfF"), "\"x\"");
        assert_eq!(strip_prefix_letters("bar", "rRbBuUfF"), "bar");
    }

    #[test]
    fn raw_hashes() {
        assert_eq!(strip_raw_hashes("r#\"a \"q\" b\"#"), "\"a \"q\" b\"");
        assert_eq!(strip_raw_hashes("r\"x\""), "\"x\"");
        assert_eq!(strip_raw_hashes("\"x\""), "\"x\"");
    }

    #[test]
    fn comment_markers() {
        assert_eq!(comment_body("// noinspection R1"), "noinspection R1");
        assert_eq!(comment_body("/** @noinspection R1 */"), "@noinspection R1");
        assert_eq!(comment_body("# TODO"), "TODO");
        assert_eq!(comment_body("%! suppress = R1"), "! suppress = R1");
    }

    #[test]
    fn extract_by_kind() {
        let node = ExternalNode::new("string", 0, 7).with_text("\"Hello\"");
        assert_eq!(
            extract(NodeKind::StringLiteral, &node, |t| unquote(t, &["\""])),
            Some("Hello".to_string())
        );
        assert_eq!(extract(NodeKind::Call, &node, |t| t), None);
    }
}
