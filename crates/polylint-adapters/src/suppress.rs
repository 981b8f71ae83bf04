//! Recognition of in-source suppression directives.
//!
//! Three families are understood:
//!
//! - JVM-style annotations: `@Suppress("ID")`, `@SuppressWarnings({"A", "B"})`
//! - Rust attributes: `#[allow(ID)]`, `#![allow(polylint::ID)]`
//! - comment directives: `noinspection ID` plus language-specific words

use polylint_core::{ExternalNode, Suppression};

/// Annotation names that suppress inspections.
const SUPPRESS_ANNOTATIONS: &[&str] = &["Suppress", "SuppressWarnings"];

/// Comment directive understood in every language.
pub const NOINSPECTION: &str = "noinspection";

/// Parses an annotation such as `@file:Suppress("R1", "R2")`.
#[must_use]
pub fn annotation(text: &str) -> Option<Suppression> {
    let body = text.trim().strip_prefix('@')?;
    let body = body.strip_prefix("file:").unwrap_or(body);
    let (name, args) = match body.find('(') {
        Some(open) => (&body[..open], &body[open..]),
        None => (body, ""),
    };
    let simple_name = name.trim().rsplit('.').next().unwrap_or(name);
    if !SUPPRESS_ANNOTATIONS.contains(&simple_name) {
        return None;
    }
    Some(ids_or_all(quoted_strings(args)))
}

/// Parses a Rust attribute such as `#[allow(polylint::R1, R2)]`.
#[must_use]
pub fn attribute(text: &str) -> Option<Suppression> {
    let body = text
        .trim()
        .strip_prefix("#!")
        .or_else(|| text.trim().strip_prefix('#'))?
        .trim()
        .strip_prefix('[')?
        .strip_suffix(']')?
        .trim();
    let inner = body
        .strip_prefix("allow")
        .or_else(|| body.strip_prefix("expect"))?
        .trim()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let ids = inner
        .split(',')
        .map(|id| id.trim())
        .map(|id| id.strip_prefix("polylint::").unwrap_or(id))
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect();
    Some(ids_or_all(ids))
}

/// Parses a comment body for `noinspection` or one of `extra` directives.
///
/// The directive may be followed by `:` or `=`. A directive without ids
/// suppresses everything.
#[must_use]
pub fn comment(body: &str, extra: &[&str]) -> Option<Suppression> {
    let body = body.trim().trim_start_matches(['@', '!']).trim_start();
    std::iter::once(NOINSPECTION)
        .chain(extra.iter().copied())
        .find_map(|directive| strip_directive(body, directive))
        .map(|rest| Suppression::from_id_list(rest.trim_start_matches([':', '=']).trim()))
}

fn strip_directive<'a>(body: &'a str, directive: &str) -> Option<&'a str> {
    let head = body.get(..directive.len())?;
    if !head.eq_ignore_ascii_case(directive) {
        return None;
    }
    let rest = &body[directive.len()..];
    rest.chars()
        .next()
        .map_or(true, |c| c.is_whitespace() || c == ':' || c == '=')
        .then_some(rest.trim_start())
}

/// Scans the direct children of a declaration, and of its `containers`
/// (e.g. `modifiers`), for suppressing annotations of the given kinds.
#[must_use]
pub fn annotated(
    node: &ExternalNode,
    annotation_kinds: &[&str],
    containers: &[&str],
) -> Option<Suppression> {
    node.children
        .iter()
        .flat_map(|child| {
            let nested: &[ExternalNode] = if containers.contains(&child.kind.as_str()) {
                &child.children
            } else {
                &[]
            };
            std::iter::once(child).chain(nested)
        })
        .filter(|n| annotation_kinds.contains(&n.kind.as_str()))
        .filter_map(|n| annotation(n.text_or_empty()))
        .reduce(Suppression::merge)
}

fn quoted_strings(args: &str) -> Vec<String> {
    args.split('"')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect()
}

fn ids_or_all(ids: Vec<String>) -> Suppression {
    if ids.is_empty() {
        Suppression::All
    } else {
        Suppression::from_id_list(&ids.join(","))
    }
}
