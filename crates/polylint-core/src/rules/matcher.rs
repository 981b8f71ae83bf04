//! Pluggable matchers behind a rule's `pattern`.

use std::fmt;
use std::str::FromStr;

use super::model::ModelError;

/// Text captured by a successful match.
///
/// Index 0 is the whole match; further indices are capture groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<String>);

impl Captures {
    /// Creates captures from group texts.
    #[must_use]
    pub fn new(groups: Vec<String>) -> Self {
        Self(groups)
    }

    /// Returns the text of group `index`, if it exists.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

/// Tests a node's literal value against a rule pattern.
pub trait Matcher: fmt::Debug + Send + Sync {
    /// Returns captures if `text` matches.
    fn find(&self, text: &str) -> Option<Captures>;
}

/// Unanchored regular-expression search.
#[derive(Debug)]
pub struct RegexMatcher(regex::Regex);

impl RegexMatcher {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] for invalid regex syntax.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        regex::Regex::new(pattern)
            .map(Self)
            .map_err(|e| ModelError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Matcher for RegexMatcher {
    fn find(&self, text: &str) -> Option<Captures> {
        let caps = self.0.captures(text)?;
        Some(Captures::new(
            caps.iter()
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        ))
    }
}

/// Substring search.
#[derive(Debug)]
pub struct LiteralMatcher(String);

impl Matcher for LiteralMatcher {
    fn find(&self, text: &str) -> Option<Captures> {
        text.contains(&self.0)
            .then(|| Captures::new(vec![self.0.clone()]))
    }
}

/// Whole-value equality.
#[derive(Debug)]
pub struct ExactMatcher(String);

impl Matcher for ExactMatcher {
    fn find(&self, text: &str) -> Option<Captures> {
        (text == self.0).then(|| Captures::new(vec![text.to_string()]))
    }
}

/// Matcher flavour selected by a rule's `matcher` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatcherKind {
    /// [`RegexMatcher`].
    #[default]
    Regex,
    /// [`LiteralMatcher`].
    Literal,
    /// [`ExactMatcher`].
    Exact,
}

impl MatcherKind {
    /// Builds a matcher of this flavour for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] if the pattern does not compile.
    pub fn build(self, pattern: &str) -> Result<Box<dyn Matcher>, ModelError> {
        Ok(match self {
            Self::Regex => Box::new(RegexMatcher::new(pattern)?),
            Self::Literal => Box::new(LiteralMatcher(pattern.to_string())),
            Self::Exact => Box::new(ExactMatcher(pattern.to_string())),
        })
    }
}

impl FromStr for MatcherKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regex" => Ok(Self::Regex),
            "literal" => Ok(Self::Literal),
            "exact" => Ok(Self::Exact),
            other => Err(ModelError::UnknownMatcher {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_is_unanchored_with_groups() {
        let m = MatcherKind::Regex.build(r"(\w+)\.format\(").unwrap();
        let caps = m.find("x = String.format(\"%d\", n)").unwrap();
        assert_eq!(caps.get(0), Some("String.format("));
        assert_eq!(caps.get(1), Some("String"));
        assert!(m.find("format").is_none());
    }

    #[test]
    fn regex_optional_group_captures_empty() {
        let m = MatcherKind::Regex.build("a(b)?").unwrap();
        let caps = m.find("a").unwrap();
        assert_eq!(caps.get(1), Some(""));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let err = MatcherKind::Regex.build("(unclosed").unwrap_err();
        assert!(matches!(err, ModelError::InvalidPattern { .. }));
    }

    #[test]
    fn literal_and_exact() {
        let lit = MatcherKind::Literal.build("toUpperCase").unwrap();
        assert!(lit.find("name.toUpperCase()").is_some());
        let exact = MatcherKind::Exact.build("OK").unwrap();
        assert!(exact.find("OK").is_some());
        assert!(exact.find("OK!").is_none());
    }

    #[test]
    fn unknown_matcher_name() {
        assert!("glob".parse::<MatcherKind>().is_err());
        assert_eq!("exact".parse::<MatcherKind>().unwrap(), MatcherKind::Exact);
    }
}
