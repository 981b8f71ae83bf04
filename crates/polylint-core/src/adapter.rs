//! Syntax tree adapters and the adapter registry.
//!
//! `LanguageAdapter` is the extension point for adding a language. An
//! adapter only answers local questions about one concrete node (its neutral
//! kind, its literal value, whether it suppresses rules); the shared
//! [`normalize`] walk owns structure validation.

use crate::language::LanguageId;
use crate::tree::{ExternalNode, ExternalTree, Node, NodeKind, Suppression, SyntaxTree, TreeError};
use crate::types::Span;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Concrete kind any host may emit to wrap a suppressed region.
///
/// The node text, if present, lists the suppressed rule ids.
pub const HOST_SUPPRESSION_KIND: &str = "suppression";

/// Deepest nesting accepted from an external tree.
pub const MAX_TREE_DEPTH: usize = 2048;

/// Per-language normalization capabilities.
pub trait LanguageAdapter: Send + Sync {
    /// Language handled by this adapter.
    fn language(&self) -> LanguageId;

    /// Maps a concrete node to its neutral kind.
    fn classify(&self, node: &ExternalNode) -> NodeKind;

    /// Extracts the literal value of a classified node.
    ///
    /// The default returns the raw node text for kinds that carry literals.
    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        if kind.carries_literal() {
            node.text.clone()
        } else {
            None
        }
    }

    /// Returns the suppression a node introduces for its subtree, if any.
    fn suppression(&self, _node: &ExternalNode) -> Option<Suppression> {
        None
    }

    /// Returns the suppression a node applies to its next sibling, if any.
    ///
    /// Used for directives that precede what they cover, such as
    /// `// noinspection ID` comments or Rust outer attributes.
    fn leading_suppression(&self, _node: &ExternalNode) -> Option<Suppression> {
        None
    }
}

/// Normalizes an external tree with one adapter.
///
/// `source_len`, when known, bounds every span.
///
/// # Errors
///
/// Returns [`TreeError::Malformed`] if any span is inverted, escapes its
/// parent or the source, or if nesting exceeds [`MAX_TREE_DEPTH`].
pub fn normalize(
    adapter: &dyn LanguageAdapter,
    root: &ExternalNode,
    source_len: Option<usize>,
) -> Result<Node, TreeError> {
    let bounds = Span::new(0, source_len.unwrap_or(usize::MAX));
    let mut path = Vec::new();
    normalize_node(adapter, root, bounds, &mut path)
}

fn normalize_node<'a>(
    adapter: &dyn LanguageAdapter,
    ext: &'a ExternalNode,
    parent: Span,
    path: &mut Vec<&'a str>,
) -> Result<Node, TreeError> {
    path.push(ext.kind.as_str());
    if path.len() > MAX_TREE_DEPTH {
        return Err(TreeError::malformed(
            path.join("/"),
            format!("nesting deeper than {MAX_TREE_DEPTH}"),
        ));
    }

    let span = Span::new(ext.start, ext.end);
    if span.start > span.end {
        return Err(TreeError::malformed(
            path.join("/"),
            format!("inverted span {span}"),
        ));
    }
    if !parent.contains(span) {
        return Err(TreeError::malformed(
            path.join("/"),
            format!("span {span} outside parent span {parent}"),
        ));
    }

    let mut children = Vec::with_capacity(ext.children.len());
    let mut pending: Option<Suppression> = None;
    for child in &ext.children {
        let mut node = normalize_node(adapter, child, span, path)?;
        if let Some(leading) = pending.take() {
            node = node.add_suppression(leading);
        }
        pending = adapter.leading_suppression(child);
        children.push(node);
    }

    let (kind, suppression) = if ext.kind == HOST_SUPPRESSION_KIND {
        (
            NodeKind::SuppressionMarker,
            Some(Suppression::from_id_list(ext.text_or_empty())),
        )
    } else {
        (adapter.classify(ext), adapter.suppression(ext))
    };

    let mut node = Node::branch(kind, span, children)
        .map_err(|e| TreeError::malformed(path.join("/"), e.to_string()))?;
    if let Some(value) = adapter.extract_literal(kind, ext) {
        node = node.with_value(value);
    }
    if let Some(suppression) = suppression {
        node = node.with_suppression(suppression);
    }

    path.pop();
    Ok(node)
}

/// Fixed mapping from language to adapter, built once at startup.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<LanguageId, Arc<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter, replacing any previous one for its language.
    #[must_use]
    pub fn with<A: LanguageAdapter + 'static>(mut self, adapter: A) -> Self {
        self.register(Arc::new(adapter));
        self
    }

    /// Registers a shared adapter, replacing any previous one for its language.
    pub fn register(&mut self, adapter: Arc<dyn LanguageAdapter>) {
        self.adapters.insert(adapter.language(), adapter);
    }

    /// Languages with a registered adapter, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<LanguageId> {
        let mut langs: Vec<LanguageId> = self.adapters.keys().copied().collect();
        langs.sort();
        langs
    }

    /// Resolves a language identifier to its adapter.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnsupportedLanguage`] if the id is unknown or no
    /// adapter is registered for it.
    pub fn adapter(&self, language_id: &str) -> Result<&dyn LanguageAdapter, TreeError> {
        LanguageId::lookup(language_id)
            .and_then(|lang| self.adapters.get(&lang))
            .map(|adapter| &**adapter)
            .ok_or_else(|| TreeError::UnsupportedLanguage {
                language: language_id.to_string(),
            })
    }

    /// Normalizes an external tree for `language_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnsupportedLanguage`] or [`TreeError::Malformed`].
    pub fn normalize(
        &self,
        language_id: &str,
        file: &Path,
        root: &ExternalNode,
    ) -> Result<SyntaxTree, TreeError> {
        self.normalize_bounded(language_id, file, root, None)
    }

    /// Normalizes a host-supplied tree, bounding spans by its source if present.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnsupportedLanguage`] or [`TreeError::Malformed`].
    pub fn normalize_tree(&self, tree: &ExternalTree) -> Result<SyntaxTree, TreeError> {
        self.normalize_bounded(
            &tree.language,
            &tree.file,
            &tree.root,
            tree.source.as_ref().map(String::len),
        )
    }

    fn normalize_bounded(
        &self,
        language_id: &str,
        file: &Path,
        root: &ExternalNode,
        source_len: Option<usize>,
    ) -> Result<SyntaxTree, TreeError> {
        let adapter = self.adapter(language_id)?;
        debug!("Normalizing {} as {}", file.display(), adapter.language());
        let node = normalize(adapter, root, source_len)?;
        Ok(SyntaxTree::new(file, adapter.language(), node))
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
