//! Delivery of results to the host and of failures to telemetry.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::tree::TreeError;
use crate::types::Diagnostic;

/// Receives the aggregated diagnostics of a run.
pub trait DiagnosticSink: Send + Sync {
    /// Delivers ordered diagnostics.
    fn publish(&self, diagnostics: &[Diagnostic]);
}

/// Receives sanitized failure records.
///
/// Implementations must return promptly and never panic; delivery is best
/// effort and failures are dropped.
pub trait TelemetrySink: Send + Sync {
    /// Forwards one failure record.
    fn report_failure(&self, record: FailureRecord);
}

/// Category of a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No adapter for the file's language.
    UnsupportedLanguage,
    /// The external tree was structurally invalid.
    MalformedTree,
    /// The file could not be read or parsed by a front end.
    Input,
}

/// A failure description safe to send off-host.
///
/// Holds only the error kind and where it happened, never source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// What went wrong.
    pub kind: FailureKind,
    /// File being processed.
    pub file: PathBuf,
    /// Language identifier as supplied.
    pub language: String,
    /// Kind path to the offending node, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl FailureRecord {
    /// Builds a record for a tree error.
    #[must_use]
    pub fn from_tree_error(file: &Path, language: &str, error: &TreeError) -> Self {
        let (kind, location) = match error {
            TreeError::UnsupportedLanguage { .. } => (FailureKind::UnsupportedLanguage, None),
            TreeError::Malformed { path, .. } => (FailureKind::MalformedTree, Some(path.clone())),
        };
        Self {
            kind,
            file: file.to_path_buf(),
            language: language.to_string(),
            location,
        }
    }

    /// Builds a record for an input failure.
    #[must_use]
    pub fn input(file: &Path, language: &str) -> Self {
        Self {
            kind: FailureKind::Input,
            file: file.to_path_buf(),
            language: language.to_string(),
            location: None,
        }
    }
}

/// Sink that stores everything it receives.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    failures: Mutex<Vec<FailureRecord>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics published so far.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Failure records reported so far.
    #[must_use]
    pub fn failures(&self) -> Vec<FailureRecord> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DiagnosticSink for CollectingSink {
    fn publish(&self, diagnostics: &[Diagnostic]) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(diagnostics);
    }
}

impl TelemetrySink for CollectingSink {
    fn report_failure(&self, record: FailureRecord) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn publish(&self, _diagnostics: &[Diagnostic]) {}
}

impl TelemetrySink for NullSink {
    fn report_failure(&self, _record: FailureRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_record_carries_no_source_text() {
        let error = TreeError::Malformed {
            path: "module/string".to_string(),
            reason: "span [10,20] outside parent span [0,15]".to_string(),
        };
        let record = FailureRecord::from_tree_error(Path::new("a.py"), "py", &error);
        assert_eq!(record.kind, FailureKind::MalformedTree);
        assert_eq!(record.location.as_deref(), Some("module/string"));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"malformed_tree","file":"a.py","language":"py","location":"module/string"}"#
        );
    }

    #[test]
    fn collecting_sink_records_both_channels() {
        let sink = CollectingSink::new();
        sink.publish(&[]);
        sink.report_failure(FailureRecord::input(Path::new("x.kt"), "kt"));
        assert!(sink.diagnostics().is_empty());
        assert_eq!(sink.failures().len(), 1);
    }
}
