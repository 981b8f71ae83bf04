//! # polylint-core
//!
//! Core engine for rule-driven, multi-language source inspection.
//!
//! Front ends hand over concrete syntax trees; this crate normalizes them into
//! a language-neutral node model, evaluates a configured rule set against
//! them, and aggregates the findings. It includes:
//!
//! - [`LanguageAdapter`] and [`AdapterRegistry`] for tree normalization
//! - [`RuleModel`] loaded from YAML, JSON or TOML via [`rules::load`]
//! - [`RuleEngine`] for single-file evaluation
//! - [`aggregate()`] for deduplication and stable ordering
//! - [`Analyzer`] for parallel runs with reporting and telemetry
//!
//! ## Example
//!
//! ```ignore
//! use polylint_core::{rules, Analyzer, ModelStore};
//!
//! let store = Arc::new(ModelStore::default());
//! store.reload(config_bytes, rules::ConfigFormat::Yaml)?;
//!
//! let analyzer = Analyzer::builder()
//!     .registry(registry)
//!     .store(store)
//!     .build()?;
//!
//! let report = analyzer.analyze(units);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod aggregate;
mod analyzer;
mod cancel;
mod config;
mod context;
mod engine;
mod language;
mod presets;
mod report;
mod telemetry;
mod tree;
mod types;

/// Rule configuration, validation and the rule model.
pub mod rules;

pub use adapter::{normalize, AdapterRegistry, LanguageAdapter, HOST_SUPPRESSION_KIND, MAX_TREE_DEPTH};
pub use aggregate::{aggregate, batch_by_file, FileBatch};
pub use analyzer::{AnalyzeError, Analyzer, AnalyzerBuilder, FileFailure, RunReport, SourceUnit};
pub use cancel::{CancellationToken, InFlight};
pub use config::{RuleOverride, Settings, TelemetrySettings, DEFAULT_CONTEXT_WINDOW};
pub use context::EvaluationContext;
pub use engine::{evaluate, EvaluationError, RuleEngine};
pub use language::{LanguageId, UnknownLanguage};
pub use presets::Preset;
pub use report::{
    CollectingSink, DiagnosticSink, FailureKind, FailureRecord, NullSink, TelemetrySink,
};
pub use rules::{ConfigError, ConfigFormat, ModelStore, Rule, RuleModel};
pub use telemetry::{
    BackgroundTelemetry, TelemetryTransport, TransportError, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SHUTDOWN_GRACE,
};
pub use tree::{
    DumpError, ExternalNode, ExternalTree, Node, NodeKind, Suppression, SyntaxTree,
    TreeError,
};
pub use types::{Diagnostic, DiagnosticReport, Severity, Span};
