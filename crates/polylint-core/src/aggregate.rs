//! Deduplication, ordering and per-file batching of diagnostics.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::types::Diagnostic;

/// Deduplicates and orders diagnostics.
///
/// Exact `(file, rule, span)` repeats are dropped, keeping the first.
/// The result is sorted by file path, span start, severity (highest first),
/// then rule id. Distinct rules on one span are all kept. Applying the
/// function to its own output returns it unchanged.
#[must_use]
pub fn aggregate(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = HashSet::with_capacity(diagnostics.len());
    let mut unique: Vec<Diagnostic> = diagnostics
        .into_iter()
        .filter(|d| seen.insert((d.file.clone(), d.rule.clone(), d.span)))
        .collect();

    unique.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.span.start.cmp(&b.span.start))
            .then(Reverse(a.severity).cmp(&Reverse(b.severity)))
            .then(a.rule.cmp(&b.rule))
    });
    unique
}

/// Diagnostics of one file, in aggregate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBatch {
    /// File the batch belongs to.
    pub file: PathBuf,
    /// Ordered diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl FileBatch {
    /// File path.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Aggregates and splits diagnostics into per-file batches, ordered by path.
#[must_use]
pub fn batch_by_file(diagnostics: Vec<Diagnostic>) -> Vec<FileBatch> {
    let mut batches: Vec<FileBatch> = Vec::new();
    for diagnostic in aggregate(diagnostics) {
        match batches.last_mut() {
            Some(batch) if batch.file == diagnostic.file => batch.diagnostics.push(diagnostic),
            _ => batches.push(FileBatch {
                file: diagnostic.file.clone(),
                diagnostics: vec![diagnostic],
            }),
        }
    }
    batches
}
