//! Pure domain model for inspection rules.
//!
//! This module contains no serde and no I/O. All invariants are enforced at
//! construction time; a [`RuleModel`] is immutable once built.

use crate::language::LanguageId;
use crate::tree::NodeKind;
use crate::types::Severity;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::matcher::{Captures, Matcher};

/// Field-level and cross-rule validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Rule id is empty.
    #[error("rule id must not be empty")]
    EmptyId,

    /// Two rules share an id.
    #[error("duplicate rule id `{id}`")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },

    /// Severity string is not one of info, warning, error.
    #[error("unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// The invalid value.
        value: String,
    },

    /// Language id is not supported.
    #[error("unknown language id `{value}`")]
    UnknownLanguage {
        /// The invalid value.
        value: String,
    },

    /// Node kind is not in the vocabulary.
    #[error("unknown node kind `{value}`")]
    UnknownKind {
        /// The invalid value.
        value: String,
    },

    /// A rule targets no kinds.
    #[error("rule must target at least one node kind")]
    NoKinds,

    /// Matcher name is not recognized.
    #[error("unknown matcher `{name}`, expected: regex, literal, exact")]
    UnknownMatcher {
        /// The invalid name.
        name: String,
    },

    /// Pattern does not compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Preset name is not recognized.
    #[error("unknown preset `{name}`")]
    UnknownPreset {
        /// The invalid name.
        name: String,
    },
}

// ────────────────────────────────────────────
// Value objects
// ────────────────────────────────────────────

/// Node kinds a rule targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindSelector {
    /// Every kind (`"*"`).
    Any,
    /// The listed kinds.
    Kinds(Vec<NodeKind>),
}

impl KindSelector {
    /// Returns true if `kind` is targeted.
    #[must_use]
    pub fn matches(&self, kind: NodeKind) -> bool {
        match self {
            Self::Any => true,
            Self::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

impl fmt::Display for KindSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Kinds(kinds) => {
                let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

/// Languages a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSet {
    /// Every language.
    Any,
    /// The listed languages.
    Only(Vec<LanguageId>),
}

impl LanguageSet {
    /// Returns true if the rule applies to `lang`.
    #[must_use]
    pub fn includes(&self, lang: LanguageId) -> bool {
        match self {
            Self::Any => true,
            Self::Only(langs) => langs.contains(&lang),
        }
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(langs) => {
                let names: Vec<&str> = langs.iter().map(|l| l.as_str()).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

/// Ancestor constraints evaluated within the engine's context window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextConstraint {
    /// At least one ancestor must have one of these kinds (ignored if empty).
    pub inside: Vec<NodeKind>,
    /// No ancestor may have one of these kinds.
    pub not_inside: Vec<NodeKind>,
}

impl ContextConstraint {
    /// Returns true if the constraint never inspects ancestors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inside.is_empty() && self.not_inside.is_empty()
    }

    /// Checks the constraint against the nearest ancestors (innermost last).
    #[must_use]
    pub fn admits(&self, ancestors: &[NodeKind]) -> bool {
        let inside_ok =
            self.inside.is_empty() || ancestors.iter().any(|k| self.inside.contains(k));
        let not_inside_ok = !ancestors.iter().any(|k| self.not_inside.contains(k));
        inside_ok && not_inside_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Value,
    Kind,
    Rule,
    Lang,
    Capture(usize),
}

/// A pre-parsed message template.
///
/// Placeholders: `{value}`, `{kind}`, `{rule}`, `{lang}` and `{0}`..`{9}`
/// for matcher captures. Anything else is copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    raw: String,
    segments: Vec<Segment>,
}

/// Values available when rendering a [`MessageTemplate`].
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    /// Rule id.
    pub rule: &'a str,
    /// Kind of the matched node.
    pub kind: NodeKind,
    /// Language of the file.
    pub lang: LanguageId,
    /// Literal value of the node (empty if none).
    pub value: &'a str,
    /// Matcher captures.
    pub captures: &'a Captures,
}

impl MessageTemplate {
    /// Parses a template.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = raw;

        while let Some(open) = rest.find('{') {
            text.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find(['{', '}']) else {
                text.push_str(&rest[open..]);
                rest = "";
                break;
            };
            // a stray `{` is literal; the next one may still open a placeholder
            if after[close..].starts_with('{') {
                text.push_str(&rest[open..=open + close]);
                rest = &after[close..];
                continue;
            }
            let segment = match &after[..close] {
                "value" => Some(Segment::Value),
                "kind" => Some(Segment::Kind),
                "rule" => Some(Segment::Rule),
                "lang" => Some(Segment::Lang),
                name if name.len() == 1 => name
                    .chars()
                    .next()
                    .and_then(|c| c.to_digit(10))
                    .map(|d| Segment::Capture(d as usize)),
                _ => None,
            };
            match segment {
                Some(segment) => {
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(segment);
                }
                None => text.push_str(&rest[open..=open + 1 + close]),
            }
            rest = &after[close + 1..];
        }
        text.push_str(rest);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// Returns the template source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Renders the template.
    #[must_use]
    pub fn render(&self, input: &RenderInput<'_>) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Value => out.push_str(input.value),
                Segment::Kind => out.push_str(input.kind.as_str()),
                Segment::Rule => out.push_str(input.rule),
                Segment::Lang => out.push_str(input.lang.as_str()),
                Segment::Capture(i) => out.push_str(input.captures.get(*i).unwrap_or("")),
            }
        }
        out
    }
}

// ────────────────────────────────────────────
// Domain entities
// ────────────────────────────────────────────

/// One validated inspection rule.
#[derive(Debug)]
pub struct Rule {
    id: Arc<str>,
    kinds: KindSelector,
    languages: LanguageSet,
    matcher: Box<dyn Matcher>,
    pattern: String,
    severity: Severity,
    message: MessageTemplate,
    context: ContextConstraint,
    doc: Option<Arc<str>>,
    enabled: bool,
}

impl Rule {
    /// Creates a rule. Ids are checked for uniqueness by [`RuleModel::new`].
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: &str,
        kinds: KindSelector,
        languages: LanguageSet,
        matcher: Box<dyn Matcher>,
        pattern: &str,
        severity: Severity,
        message: MessageTemplate,
    ) -> Self {
        Self {
            id: Arc::from(id),
            kinds,
            languages,
            matcher,
            pattern: pattern.to_string(),
            severity,
            message,
            context: ContextConstraint::default(),
            doc: None,
            enabled: true,
        }
    }

    /// Sets ancestor constraints.
    #[must_use]
    pub fn with_context(mut self, context: ContextConstraint) -> Self {
        self.context = context;
        self
    }

    /// Sets the documentation reference.
    #[must_use]
    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc.map(Arc::from);
        self
    }

    /// Enables or disables the rule.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Rule id.
    #[must_use]
    pub fn id(&self) -> &Arc<str> {
        &self.id
    }

    /// Targeted kinds.
    #[must_use]
    pub fn kinds(&self) -> &KindSelector {
        &self.kinds
    }

    /// Applicable languages.
    #[must_use]
    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    /// Matcher built from the pattern.
    #[must_use]
    pub fn matcher(&self) -> &dyn Matcher {
        self.matcher.as_ref()
    }

    /// Pattern source text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Message template.
    #[must_use]
    pub fn message(&self) -> &MessageTemplate {
        &self.message
    }

    /// Ancestor constraints.
    #[must_use]
    pub fn context(&self) -> &ContextConstraint {
        &self.context
    }

    /// Documentation reference.
    #[must_use]
    pub fn doc(&self) -> Option<&Arc<str>> {
        self.doc.as_ref()
    }

    /// Whether the rule is evaluated.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// The aggregate root: an immutable, indexed set of rules.
///
/// The index maps `(language, kind)` to the enabled rules that apply, in
/// declaration order, so the engine never scans rules that cannot match.
#[derive(Debug, Default)]
pub struct RuleModel {
    rules: Vec<Rule>,
    index: HashMap<(LanguageId, NodeKind), Vec<usize>>,
}

impl RuleModel {
    /// Creates a model, validating id uniqueness.
    ///
    /// # Errors
    ///
    /// Returns every [`ModelError::DuplicateId`] found.
    pub fn new(rules: Vec<Rule>) -> Result<Self, Vec<ModelError>> {
        let mut seen = HashSet::new();
        let errors: Vec<ModelError> = rules
            .iter()
            .filter(|r| !seen.insert(Arc::clone(&r.id)))
            .map(|r| ModelError::DuplicateId {
                id: r.id.to_string(),
            })
            .collect();
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut index: HashMap<(LanguageId, NodeKind), Vec<usize>> = HashMap::new();
        for (i, rule) in rules.iter().enumerate().filter(|(_, r)| r.enabled) {
            for lang in LanguageId::ALL {
                if !rule.languages.includes(lang) {
                    continue;
                }
                for kind in NodeKind::ALL {
                    if rule.kinds.matches(kind) {
                        index.entry((lang, kind)).or_default().push(i);
                    }
                }
            }
        }

        Ok(Self { rules, index })
    }

    /// A model with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// All rules in declaration order, including disabled ones.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the model has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks up a rule by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| &*r.id == id)
    }

    /// Enabled rules applicable to `lang` that target `kind`, in order.
    pub fn rules_for(&self, lang: LanguageId, kind: NodeKind) -> impl Iterator<Item = &Rule> {
        self.index
            .get(&(lang, kind))
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .map(move |&i| &self.rules[i])
    }

    /// Returns true if any enabled rule applies to `lang`.
    #[must_use]
    pub fn has_rules_for(&self, lang: LanguageId) -> bool {
        self.index.keys().any(|(l, _)| *l == lang)
    }
}
