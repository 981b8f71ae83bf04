//! Language-neutral syntax tree model.
//!
//! External front ends hand over an [`ExternalNode`] tree carrying their own
//! concrete kind names. A [`LanguageAdapter`](crate::LanguageAdapter)
//! normalizes it into [`Node`]s drawn from the closed [`NodeKind`]
//! vocabulary, which is what the engine walks.

use crate::adapter::MAX_TREE_DEPTH;
use crate::language::LanguageId;
use crate::types::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Closed vocabulary of neutral node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    /// Root of a source file.
    File,
    /// Module, package or namespace declaration.
    Module,
    /// Import / use / require statement.
    Import,
    /// Class, object, trait, struct or interface declaration.
    Class,
    /// Function or method declaration.
    Function,
    /// Function or method invocation.
    Call,
    /// Argument list entry of a call.
    Argument,
    /// Identifier reference or name.
    Identifier,
    /// String literal without interpolation.
    StringLiteral,
    /// String with interpolated expressions.
    TemplateString,
    /// Numeric literal.
    NumberLiteral,
    /// Boolean literal.
    BooleanLiteral,
    /// Comment of any style.
    Comment,
    /// Annotation, decorator or attribute.
    Annotation,
    /// Block of statements.
    Block,
    /// Statement not covered by a more specific kind.
    Statement,
    /// Expression not covered by a more specific kind.
    Expression,
    /// Assignment or binding.
    Assignment,
    /// Key of a key/value pair (TOML keys, map entries).
    Key,
    /// Table or section header.
    Table,
    /// TeX command such as `\section`.
    Command,
    /// Running prose text.
    Text,
    /// Region in which matching rules are disabled.
    SuppressionMarker,
    /// Anything the adapter does not classify.
    Other,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 24] = [
        Self::File,
        Self::Module,
        Self::Import,
        Self::Class,
        Self::Function,
        Self::Call,
        Self::Argument,
        Self::Identifier,
        Self::StringLiteral,
        Self::TemplateString,
        Self::NumberLiteral,
        Self::BooleanLiteral,
        Self::Comment,
        Self::Annotation,
        Self::Block,
        Self::Statement,
        Self::Expression,
        Self::Assignment,
        Self::Key,
        Self::Table,
        Self::Command,
        Self::Text,
        Self::SuppressionMarker,
        Self::Other,
    ];

    /// Configuration name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Module => "Module",
            Self::Import => "Import",
            Self::Class => "Class",
            Self::Function => "Function",
            Self::Call => "Call",
            Self::Argument => "Argument",
            Self::Identifier => "Identifier",
            Self::StringLiteral => "StringLiteral",
            Self::TemplateString => "TemplateString",
            Self::NumberLiteral => "NumberLiteral",
            Self::BooleanLiteral => "BooleanLiteral",
            Self::Comment => "Comment",
            Self::Annotation => "Annotation",
            Self::Block => "Block",
            Self::Statement => "Statement",
            Self::Expression => "Expression",
            Self::Assignment => "Assignment",
            Self::Key => "Key",
            Self::Table => "Table",
            Self::Command => "Command",
            Self::Text => "Text",
            Self::SuppressionMarker => "SuppressionMarker",
            Self::Other => "Other",
        }
    }

    /// Whether adapters extract a literal value for nodes of this kind.
    #[must_use]
    pub const fn carries_literal(self) -> bool {
        matches!(
            self,
            Self::StringLiteral
                | Self::TemplateString
                | Self::NumberLiteral
                | Self::BooleanLiteral
                | Self::Comment
                | Self::Identifier
                | Self::Key
                | Self::Command
                | Self::Text
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown node kind `{s}`"))
    }
}

/// Which rules a suppression marker disables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suppression {
    /// Every rule.
    All,
    /// Only the listed rule ids.
    Rules(Vec<String>),
}

static SUPPRESS_ALL: Suppression = Suppression::All;

impl Suppression {
    /// Builds a suppression from a comma- or whitespace-separated id list.
    ///
    /// An empty list disables every rule, as does `all` or `*` on its own.
    /// Inside a longer list those words are ordinary ids, so prose such as
    /// `ignore all of this` stays a narrow suppression.
    #[must_use]
    pub fn from_id_list(list: &str) -> Self {
        let ids: Vec<String> = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(|s| s.trim_matches(|c| c == '"' || c == '\''))
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        match ids.as_slice() {
            [] => Self::All,
            [only] if only == "all" || only == "*" => Self::All,
            _ => Self::Rules(ids),
        }
    }

    /// Returns true if this suppression disables `rule_id`.
    #[must_use]
    pub fn covers(&self, rule_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Rules(ids) => ids.iter().any(|id| id == rule_id),
        }
    }

    /// Combines two suppressions on the same node.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Rules(mut ids), Self::Rules(more)) => {
                for id in more {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                Self::Rules(ids)
            }
            _ => Self::All,
        }
    }
}

/// An immutable, language-neutral tree element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    span: Span,
    children: Vec<Node>,
    value: Option<String>,
    suppression: Option<Suppression>,
}

impl Node {
    /// Creates a childless node.
    #[must_use]
    pub fn leaf(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            children: Vec::new(),
            value: None,
            suppression: None,
        }
    }

    /// Creates a node with children, enforcing span containment.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Malformed`] if the span is inverted or any
    /// child span falls outside `span`.
    pub fn branch(kind: NodeKind, span: Span, children: Vec<Node>) -> Result<Self, TreeError> {
        if span.start > span.end {
            return Err(TreeError::malformed(
                kind.as_str(),
                format!("inverted span {span}"),
            ));
        }
        if let Some(bad) = children.iter().find(|c| !span.contains(c.span)) {
            return Err(TreeError::malformed(
                kind.as_str(),
                format!("child {} span {} outside parent span {span}", bad.kind, bad.span),
            ));
        }
        Ok(Self {
            kind,
            span,
            children,
            value: None,
            suppression: None,
        })
    }

    /// Creates a suppression marker node wrapping `children`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Node::branch`].
    pub fn marker(
        span: Span,
        suppression: Suppression,
        children: Vec<Node>,
    ) -> Result<Self, TreeError> {
        Ok(Self::branch(NodeKind::SuppressionMarker, span, children)?.with_suppression(suppression))
    }

    /// Sets the literal value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Tags this node as a suppression marker.
    #[must_use]
    pub fn with_suppression(mut self, suppression: Suppression) -> Self {
        self.suppression = Some(suppression);
        self
    }

    /// Adds a suppression, merging with whatever the node already carries.
    #[must_use]
    pub fn add_suppression(mut self, suppression: Suppression) -> Self {
        let merged = match self.suppression.take() {
            Some(existing) => existing.merge(suppression),
            None if self.kind == NodeKind::SuppressionMarker => Suppression::All,
            None => suppression,
        };
        self.suppression = Some(merged);
        self
    }

    /// Node kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Byte span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Ordered children.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Literal value, if the adapter extracted one.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Suppression carried by this node.
    ///
    /// `SuppressionMarker` nodes without an explicit list suppress everything.
    #[must_use]
    pub fn suppression(&self) -> Option<&Suppression> {
        match (&self.suppression, self.kind) {
            (Some(s), _) => Some(s),
            (None, NodeKind::SuppressionMarker) => Some(&SUPPRESS_ALL),
            (None, _) => None,
        }
    }
}

/// A normalized tree for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    file: PathBuf,
    language: LanguageId,
    root: Node,
}

impl SyntaxTree {
    /// Wraps a normalized root node.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, language: LanguageId, root: Node) -> Self {
        Self {
            file: file.into(),
            language,
            root,
        }
    }

    /// File the tree was parsed from.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Language of the tree.
    #[must_use]
    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }
}

/// A concrete tree node as produced by an external parser.
///
/// Kind names are whatever the front end uses (`string_literal`,
/// `interpreted_string_literal`, ...). `text` is the source slice when the
/// front end provides it; adapters need it to extract literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalNode {
    /// Front-end specific kind name.
    pub kind: String,
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Source text of this node, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExternalNode>,
}

impl ExternalNode {
    /// Creates a node without text or children.
    #[must_use]
    pub fn new(kind: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind: kind.into(),
            start,
            end,
            text: None,
            children: Vec::new(),
        }
    }

    /// Sets the source text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Appends a child.
    #[must_use]
    pub fn with_child(mut self, child: ExternalNode) -> Self {
        self.children.push(child);
        self
    }

    /// Text of this node, or the empty string.
    #[must_use]
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// A host-supplied tree for one file, as exchanged on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalTree {
    /// File path the tree belongs to.
    pub file: PathBuf,
    /// Language identifier (canonical id or alias).
    pub language: String,
    /// Full source text, when the host shares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Root of the concrete tree.
    pub root: ExternalNode,
}

impl ExternalTree {
    /// Reads a host dump.
    ///
    /// Nesting is not capped by the JSON reader's default recursion limit;
    /// dumps are accepted as deep as [`MAX_TREE_DEPTH`] allows.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError`] for invalid JSON, a shape mismatch, or nesting
    /// beyond what normalization would accept.
    pub fn from_json(text: &str) -> Result<Self, DumpError> {
        // tree object, then an object and a `children` array per level
        let limit = 2 * (MAX_TREE_DEPTH + 1) + 1;
        if json_nesting(text) > limit {
            return Err(DumpError::TooDeep {
                limit: MAX_TREE_DEPTH,
            });
        }
        let mut reader = serde_json::Deserializer::from_str(text);
        reader.disable_recursion_limit();
        let tree = Self::deserialize(serde_stacker::Deserializer::new(&mut reader))?;
        reader.end()?;
        Ok(tree)
    }
}

/// Deepest bracket nesting in a JSON text, ignoring brackets inside strings.
fn json_nesting(text: &str) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Errors reading a host tree dump.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// The text is not a valid tree dump.
    #[error("invalid tree dump: {0}")]
    Json(#[from] serde_json::Error),

    /// The dump nests deeper than the engine accepts.
    #[error("tree dump nests deeper than {limit} levels")]
    TooDeep {
        /// Maximum accepted tree depth.
        limit: usize,
    },
}

/// Errors raised while building or normalizing trees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No adapter is registered for the requested language.
    #[error("unsupported language `{language}`")]
    UnsupportedLanguage {
        /// The requested identifier.
        language: String,
    },

    /// The external tree violates structural assumptions.
    #[error("malformed tree at {path}: {reason}")]
    Malformed {
        /// Slash-separated kind path to the offending node.
        path: String,
        /// What went wrong.
        reason: String,
    },
}

impl TreeError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_at(start: usize, end: usize) -> Node {
        Node::leaf(NodeKind::StringLiteral, Span::new(start, end)).with_value("hello")
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.as_str().parse::<NodeKind>(), Ok(kind));
        }
        assert!("stringliteral".parse::<NodeKind>().is_err());
    }

    #[test]
    fn branch_rejects_child_outside_parent() {
        let err = Node::branch(NodeKind::Block, Span::new(0, 15), vec![string_at(10, 20)])
            .unwrap_err();
        assert!(matches!(err, TreeError::Malformed { .. }));
    }

    #[test]
    fn branch_rejects_inverted_span() {
        let err = Node::branch(NodeKind::Block, Span::new(9, 3), vec![]).unwrap_err();
        assert!(err.to_string().contains("inverted span"));
    }

    #[test]
    fn marker_defaults_to_all() {
        let plain = Node::leaf(NodeKind::SuppressionMarker, Span::new(0, 30));
        assert_eq!(plain.suppression(), Some(&Suppression::All));
        assert!(string_at(1, 2).suppression().is_none());
    }

    #[test]
    fn suppression_id_list_parsing() {
        assert_eq!(Suppression::from_id_list(""), Suppression::All);
        assert_eq!(Suppression::from_id_list("all"), Suppression::All);
        let listed = Suppression::from_id_list("\"R1\", R2");
        assert!(listed.covers("R1"));
        assert!(listed.covers("R2"));
        assert!(!listed.covers("R3"));
    }

    #[test]
    fn all_only_counts_on_its_own() {
        assert_eq!(Suppression::from_id_list("*"), Suppression::All);
        let prose = Suppression::from_id_list("all of this");
        assert!(!prose.covers("R1"));
        assert!(prose.covers("all"));
    }

    #[test]
    fn merge_unions_ids_and_all_wins() {
        let a = Suppression::Rules(vec!["R1".to_string()]);
        let b = Suppression::Rules(vec!["R2".to_string(), "R1".to_string()]);
        assert_eq!(
            a.clone().merge(b),
            Suppression::Rules(vec!["R1".to_string(), "R2".to_string()])
        );
        assert_eq!(a.merge(Suppression::All), Suppression::All);
    }

#[test]
    fn external_tree_deserializes_without_optional_fields() {
        let json = r#"{"file":"a.py","language":"py","root":{"kind":"module","start":0,"end":3}}"#;
        let tree: ExternalTree = serde_json::from_str(json).unwrap();
        assert!(tree.source.is_none());
        assert!(tree.root.children.is_empty());
    }

    fn nested(depth: usize) -> ExternalNode {
        let mut node = ExternalNode::new("expr", 0, 1).with_text("{\"[");
        for _ in 0..depth {
            node = ExternalNode::new("expr", 0, 1).with_child(node);
        }
        node
    }

    #[test]
    fn deep_dumps_are_readable() {
        let tree = ExternalTree {
            file: "deep.py".into(),
            language: "py".to_string(),
            source: None,
            root: nested(300),
        };
        let text = serde_json::to_string(&tree).unwrap();
        let read = ExternalTree::from_json(&text).unwrap();
        assert_eq!(read.root, tree.root);
    }

    #[test]
    fn dumps_beyond_depth_limit_are_rejected() {
        let text = "[".repeat(3 * MAX_TREE_DEPTH);
        assert!(matches!(
            ExternalTree::from_json(&text),
            Err(DumpError::TooDeep { .. })
        ));
        assert!(matches!(
            ExternalTree::from_json("{\"file\": 1}"),
            Err(DumpError::Json(_))
        ));
    }

    #[test]
    fn brackets_inside_strings_do_not_count() {
        assert_eq!(json_nesting(r#"{"a": "[[{\"x", "b": [1]}"#), 2);
    }
}
