//! Per-file scratch state for one evaluation run.

use std::path::Path;

use crate::language::LanguageId;
use crate::tree::{NodeKind, Suppression};
use crate::types::Diagnostic;

/// State owned by a single evaluation run.
///
/// Not shared across files or threads; dropped when the run ends, which is
/// also how a cancelled run releases everything it held.
#[derive(Debug)]
pub struct EvaluationContext<'t> {
    file: &'t Path,
    language: LanguageId,
    suppressions: Vec<&'t Suppression>,
    ancestors: Vec<NodeKind>,
    window: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> EvaluationContext<'t> {
    /// Creates a context for `file`, exposing at most `window` ancestors to
    /// context constraints.
    #[must_use]
    pub fn new(file: &'t Path, language: LanguageId, window: usize) -> Self {
        Self {
            file,
            language,
            suppressions: Vec::new(),
            ancestors: Vec::new(),
            window,
            diagnostics: Vec::new(),
        }
    }

    /// File being evaluated.
    #[must_use]
    pub fn file(&self) -> &'t Path {
        self.file
    }

    /// Language of the file.
    #[must_use]
    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// Enters a suppressed region.
    pub fn push_suppression(&mut self, suppression: &'t Suppression) {
        self.suppressions.push(suppression);
    }

    /// Leaves the innermost suppressed region.
    pub fn pop_suppression(&mut self) {
        self.suppressions.pop();
    }

    /// Returns true if any active region disables `rule_id`.
    #[must_use]
    pub fn is_suppressed(&self, rule_id: &str) -> bool {
        self.suppressions.iter().any(|s| s.covers(rule_id))
    }

    /// Records that traversal descended into a node of `kind`.
    pub fn enter(&mut self, kind: NodeKind) {
        self.ancestors.push(kind);
    }

    /// Records that traversal left the innermost node.
    pub fn leave(&mut self) {
        self.ancestors.pop();
    }

    /// The nearest ancestors within the window, innermost last.
    #[must_use]
    pub fn ancestors(&self) -> &[NodeKind] {
        let from = self.ancestors.len().saturating_sub(self.window);
        &self.ancestors[from..]
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Buffers a finding.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Ends the run, returning findings in emission order.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
