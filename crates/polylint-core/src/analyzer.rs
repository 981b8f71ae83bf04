//! Core analyzer for orchestrating inspection runs.
//!
//! Files are normalized and evaluated independently on a worker pool; all
//! files of one run share the model snapshot taken when the run starts.

use crate::adapter::AdapterRegistry;
use crate::aggregate::{aggregate, batch_by_file, FileBatch};
use crate::cancel::InFlight;
use crate::config::Settings;
use crate::engine::{EvaluationError, RuleEngine};
use crate::report::{DiagnosticSink, FailureKind, FailureRecord, NullSink, TelemetrySink};
use crate::rules::ModelStore;
use crate::tree::{ExternalTree, TreeError};
use crate::types::{Diagnostic, Severity};

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Workers recurse once per tree level while normalizing.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Errors that can occur while setting up an analyzer.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The worker pool could not be created.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// One file handed to the analyzer.
#[derive(Debug, Clone)]
pub enum SourceUnit {
    /// A concrete tree from a front end or host.
    Tree(ExternalTree),
    /// Input that never produced a tree (unreadable, unparsable).
    Unreadable {
        /// File path.
        file: PathBuf,
        /// Language identifier as supplied.
        language: String,
        /// What went wrong.
        reason: String,
    },
}

impl SourceUnit {
    /// File path of the unit.
    #[must_use]
    pub fn file(&self) -> &std::path::Path {
        match self {
            Self::Tree(tree) => &tree.file,
            Self::Unreadable { file, .. } => file,
        }
    }
}

impl From<ExternalTree> for SourceUnit {
    fn from(tree: ExternalTree) -> Self {
        Self::Tree(tree)
    }
}

/// A file that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// File path.
    pub file: PathBuf,
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
}

/// Result of one analyzer run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Aggregated diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// Per-file failures, in input order.
    pub failures: Vec<FileFailure>,
    /// Files evaluated to completion.
    pub files_checked: usize,
    /// Files whose evaluation was cancelled.
    pub cancelled: usize,
}

impl RunReport {
    /// Returns true if any diagnostic is at or above `threshold`.
    #[must_use]
    pub fn has_violations_at(&self, threshold: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= threshold)
    }

    /// Counts diagnostics of exactly `severity`.
    #[must_use]
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Diagnostics split into per-file batches.
    #[must_use]
    pub fn batches(&self) -> Vec<FileBatch> {
        batch_by_file(self.diagnostics.clone())
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    registry: AdapterRegistry,
    store: Option<Arc<ModelStore>>,
    sink: Option<Arc<dyn DiagnosticSink>>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
    settings: Settings,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the adapter registry.
    #[must_use]
    pub fn registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the model store.
    #[must_use]
    pub fn store(mut self, store: Arc<ModelStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the sink that receives published diagnostics.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the telemetry sink.
    #[must_use]
    pub fn telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Sets run settings.
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot be created.
    pub fn build(self) -> Result<Analyzer, AnalyzeError> {
        let workers = self.settings.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("polylint-worker-{i}"))
            .stack_size(WORKER_STACK_SIZE)
            .build()?;
        debug!("Analyzer pool started with {workers} workers");

        Ok(Analyzer {
            registry: self.registry,
            store: self.store.unwrap_or_default(),
            sink: self.sink.unwrap_or_else(|| Arc::new(NullSink)),
            telemetry: self.telemetry.unwrap_or_else(|| Arc::new(NullSink)),
            settings: self.settings,
            in_flight: InFlight::new(),
            pool,
        })
    }
}

enum Outcome {
    Checked(Vec<Diagnostic>),
    Failed(FileFailure),
    Cancelled,
}

/// The main analyzer that orchestrates inspection runs.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    registry: AdapterRegistry,
    store: Arc<ModelStore>,
    sink: Arc<dyn DiagnosticSink>,
    telemetry: Arc<dyn TelemetrySink>,
    settings: Settings,
    in_flight: InFlight,
    pool: rayon::ThreadPool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// The model store evaluations read from.
    #[must_use]
    pub fn store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    /// Run settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Registry of running evaluations, for cancelling work on edited files.
    #[must_use]
    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Analyzes `units`, publishes the aggregated diagnostics, and returns
    /// the run report.
    ///
    /// Per-file failures never abort the run; they are recorded in the report
    /// and forwarded to telemetry. A path listed more than once is evaluated
    /// once, from its last unit. Submitting a path that another call is still
    /// evaluating cancels that evaluation, which counts as `cancelled` there.
    pub fn analyze(&self, units: Vec<SourceUnit>) -> RunReport {
        let units = latest_per_file(units);
        let total = units.len();
        let engine = RuleEngine::new(self.store.snapshot())
            .with_context_window(self.settings.context_window);
        info!(
            "Analyzing {total} files with {} rules",
            engine.model().len()
        );

        let outcomes: Vec<Outcome> = self.pool.install(|| {
            units
                .into_par_iter()
                .map(|unit| self.process(&engine, unit))
                .collect()
        });

        let mut report = RunReport::default();
        let mut diagnostics = Vec::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Checked(found) => {
                    report.files_checked += 1;
                    diagnostics.extend(found);
                }
                Outcome::Failed(failure) => report.failures.push(failure),
                Outcome::Cancelled => report.cancelled += 1,
            }
        }

        report.diagnostics = aggregate(self.apply_overrides(diagnostics));
        self.sink.publish(&report.diagnostics);
        info!(
            "Analysis complete: {} diagnostics, {} failures, {} cancelled",
            report.diagnostics.len(),
            report.failures.len(),
            report.cancelled
        );
        report
    }

    fn process(&self, engine: &RuleEngine, unit: SourceUnit) -> Outcome {
        let tree = match unit {
            SourceUnit::Tree(tree) => tree,
            SourceUnit::Unreadable {
                file,
                language,
                reason,
            } => {
                self.telemetry
                    .report_failure(FailureRecord::input(&file, &language));
                warn!("Skipping {}: {reason}", file.display());
                return Outcome::Failed(FileFailure {
                    file,
                    kind: FailureKind::Input,
                    message: reason,
                });
            }
        };

        let normalized = match self.registry.normalize_tree(&tree) {
            Ok(normalized) => normalized,
            Err(e) => return Outcome::Failed(self.tree_failure(&tree, &e)),
        };

        let token = self.in_flight.begin(&tree.file);
        let result = engine.evaluate_cancellable(&normalized, &token);
        self.in_flight.finish(&tree.file, &token);

        match result {
            Ok(diagnostics) => Outcome::Checked(diagnostics),
            Err(EvaluationError::Cancelled { file }) => {
                debug!("Discarding cancelled results for {}", file.display());
                Outcome::Cancelled
            }
        }
    }

    fn tree_failure(&self, tree: &ExternalTree, error: &TreeError) -> FileFailure {
        let record = FailureRecord::from_tree_error(&tree.file, &tree.language, error);
        warn!("Skipping {}: {error}", tree.file.display());
        let kind = record.kind;
        self.telemetry.report_failure(record);
        FileFailure {
            file: tree.file.clone(),
            kind,
            message: error.to_string(),
        }
    }

    fn apply_overrides(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        if self.settings.overrides.is_empty() {
            return diagnostics;
        }
        diagnostics
            .into_iter()
            .filter(|d| self.settings.is_rule_enabled(&d.rule))
            .map(|d| match self.settings.rule_severity(&d.rule) {
                Some(severity) => d.with_severity(severity),
                None => d,
            })
            .collect()
    }
}

/// Keeps the last unit given for each path, at the position the path first
/// appeared.
fn latest_per_file(units: Vec<SourceUnit>) -> Vec<SourceUnit> {
    let mut slots: HashMap<PathBuf, usize> = HashMap::with_capacity(units.len());
    let mut kept: Vec<SourceUnit> = Vec::with_capacity(units.len());
    for unit in units {
        if let Some(&slot) = slots.get(unit.file()) {
            debug!("{} given twice, keeping the later input", unit.file().display());
            kept[slot] = unit;
        } else {
            slots.insert(unit.file().to_path_buf(), kept.len());
            kept.push(unit);
        }
    }
    kept
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("registry", &self.registry)
            .field("rules", &self.store.snapshot().len())
            .field("workers", &self.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::LanguageAdapter;
    use crate::language::LanguageId;
    use crate::report::CollectingSink;
    use crate::rules::ConfigFormat;
    use crate::tree::{ExternalNode, NodeKind};

    struct Py;

    impl LanguageAdapter for Py {
        fn language(&self) -> LanguageId {
            LanguageId::Python
        }

        fn classify(&self, node: &ExternalNode) -> NodeKind {
            match node.kind.as_str() {
                "module" => NodeKind::File,
                "string" => NodeKind::StringLiteral,
                _ => NodeKind::Other,
            }
        }
    }

    const RULES: &[u8] = br#"
rules:
  - { id: R1, kinds: [StringLiteral], languages: [py], pattern: ".+", message: "hardcoded {value}" }
"#;

    fn analyzer(settings: Settings, sink: Arc<CollectingSink>) -> Analyzer {
        let store = Arc::new(ModelStore::default());
        store.reload(RULES, ConfigFormat::Yaml).unwrap();
        Analyzer::builder()
            .registry(AdapterRegistry::new().with(Py))
            .store(store)
            .sink(sink.clone())
            .telemetry(sink)
            .settings(Settings {
                jobs: Some(2),
                ..settings
            })
            .build()
            .unwrap()
    }

    fn py_tree(file: &str) -> SourceUnit {
        ExternalTree {
            file: file.into(),
            language: "py".to_string(),
            source: None,
            root: ExternalNode::new("module", 0, 40)
                .with_child(ExternalNode::new("string", 10, 20).with_text("hi")),
        }
        .into()
    }

    #[test]
    fn analyze_publishes_sorted_diagnostics() {
        let sink = Arc::new(CollectingSink::new());
        let analyzer = analyzer(Settings::default(), Arc::clone(&sink));
        let report = analyzer.analyze(vec![py_tree("b.py"), py_tree("a.py")]);

        assert_eq!(report.files_checked, 2);
        let files: Vec<PathBuf> = report.diagnostics.iter().map(|d| d.file.clone()).collect();
        assert_eq!(files, vec![PathBuf::from("a.py"), PathBuf::from("b.py")]);
        assert_eq!(sink.diagnostics(), report.diagnostics);
        assert!(report.has_violations_at(Severity::Warning));
        assert!(!report.has_violations_at(Severity::Error));
    }

    #[test]
    fn failures_are_isolated_and_reported() {
        let sink = Arc::new(CollectingSink::new());
        let analyzer = analyzer(Settings::default(), Arc::clone(&sink));
        let cobol = ExternalTree {
            file: "legacy.cob".into(),
            language: "cobol".to_string(),
            source: None,
            root: ExternalNode::new("program", 0, 5),
        };
        let unreadable = SourceUnit::Unreadable {
            file: "broken.kt".into(),
            language: "kt".to_string(),
            reason: "invalid UTF-8".to_string(),
        };
        let report = analyzer.analyze(vec![cobol.into(), py_tree("a.py"), unreadable]);

        assert_eq!(report.files_checked, 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].kind, FailureKind::UnsupportedLanguage);
        assert_eq!(sink.failures().len(), 2);
    }

    #[test]
    fn overrides_change_severity_and_disable() {
        let sink = Arc::new(CollectingSink::new());
        let mut settings = Settings::default();
        settings.overrides.insert(
            "R1".to_string(),
            crate::config::RuleOverride {
                enabled: None,
                severity: Some(Severity::Error),
            },
        );
        let report = analyzer(settings, Arc::clone(&sink)).analyze(vec![py_tree("a.py")]);
        assert_eq!(report.diagnostics[0].severity, Severity::Error);

        let mut settings = Settings::default();
        settings.overrides.insert(
            "R1".to_string(),
            crate::config::RuleOverride {
                enabled: Some(false),
                severity: None,
            },
        );
        let report = analyzer(settings, sink).analyze(vec![py_tree("a.py")]);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn run_uses_model_snapshot_and_reload_applies_next_run() {
        let sink = Arc::new(CollectingSink::new());
        let analyzer = analyzer(Settings::default(), sink);
        assert_eq!(analyzer.analyze(vec![py_tree("a.py")]).diagnostics.len(), 1);

        analyzer
            .store()
            .reload(b"rules: []", ConfigFormat::Yaml)
            .unwrap();
        assert!(analyzer.analyze(vec![py_tree("a.py")]).diagnostics.is_empty());
    }

    fn wide_py_tree(file: &str, strings: usize) -> SourceUnit {
        let root = (0..strings).fold(ExternalNode::new("module", 0, strings), |root, i| {
            root.with_child(ExternalNode::new("string", i, i + 1).with_text("x"))
        });
        ExternalTree {
            file: file.into(),
            language: "py".to_string(),
            source: None,
            root,
        }
        .into()
    }

    #[test]
    fn resubmitted_file_cancels_running_evaluation() {
        let sink = Arc::new(CollectingSink::new());
        let analyzer = analyzer(Settings::default(), sink);
        let analyzer = &analyzer;
        let big = wide_py_tree("a.py", 400_000);

        let first = std::thread::scope(|scope| {
            let first = scope.spawn(move || analyzer.analyze(vec![big, py_tree("b.py")]));
            while !analyzer.in_flight().is_running(std::path::Path::new("a.py")) {
                std::thread::yield_now();
            }
            let edited = analyzer.analyze(vec![py_tree("a.py")]);
            assert_eq!(edited.files_checked, 1);
            assert_eq!(edited.cancelled, 0);
            assert_eq!(edited.diagnostics.len(), 1);
            first.join().unwrap()
        });

        assert_eq!(first.cancelled, 1);
        assert_eq!(first.files_checked, 1);
        assert_eq!(first.diagnostics.len(), 1);
        assert_eq!(first.diagnostics[0].file, PathBuf::from("b.py"));
        assert!(analyzer.in_flight().is_empty());
    }

    #[test]
    fn duplicate_paths_keep_the_later_unit() {
        let sink = Arc::new(CollectingSink::new());
        let analyzer = analyzer(Settings::default(), sink);
        let empty = || -> SourceUnit {
            ExternalTree {
                file: "a.py".into(),
                language: "py".to_string(),
                source: None,
                root: ExternalNode::new("module", 0, 40),
            }
            .into()
        };

        let report = analyzer.analyze(vec![py_tree("a.py"), py_tree("b.py"), empty()]);
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.cancelled, 0);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].file, PathBuf::from("b.py"));

        let report = analyzer.analyze(vec![empty(), py_tree("a.py")]);
        assert_eq!(report.files_checked, 1);
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn batches_follow_aggregate_order() {
        let sink = Arc::new(CollectingSink::new());
        let report = analyzer(Settings::default(), sink)
            .analyze(vec![py_tree("b.py"), py_tree("a.py")]);
        let files: Vec<PathBuf> = report.batches().iter().map(|b| b.file.clone()).collect();
        assert_eq!(files, vec![PathBuf::from("a.py"), PathBuf::from("b.py")]);
    }
}
