//! Check command implementation.

use anyhow::{Context, Result};
use polylint_adapters::{default_registry, SourceParser};
use polylint_core::rules::RuleDocument;
use polylint_core::{
    Analyzer, BackgroundTelemetry, ExternalTree, ModelStore, Settings, SourceUnit,
    DEFAULT_QUEUE_CAPACITY,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config_resolver::ConfigSource;
use crate::discover::{self, Input, TREE_DUMP_SUFFIX};
use crate::telemetry::HttpTransport;
use crate::OutputFormat;

/// Command-line overrides for a check run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Output format.
    pub format: OutputFormat,
    /// Worker count override.
    pub jobs: Option<usize>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
}

/// Source text per file, for rendering snippets.
pub type Sources = HashMap<PathBuf, String>;

/// Runs the check command.
///
/// Returns `true` when diagnostics reach the configured `fail_on` severity.
pub fn run(path: &Path, options: &Options, source: &ConfigSource) -> Result<bool> {
    let RuleDocument {
        model,
        mut settings,
    } = source.load()?;
    if options.jobs.is_some() {
        settings.jobs = options.jobs;
    }
    settings.exclude.extend(options.exclude.iter().cloned());

    let parsers = polylint_adapters::parsers();
    let inputs = discover::discover(path, &settings, &parsers)?;
    tracing::info!("Analyzing {} files with {} rules", inputs.len(), model.len());

    let mut sources = Sources::new();
    let units: Vec<SourceUnit> = inputs
        .iter()
        .map(|input| load_unit(input, path, &parsers, &mut sources))
        .collect();

    let telemetry = spawn_telemetry(&settings);
    let mut builder = Analyzer::builder()
        .registry(default_registry())
        .store(Arc::new(ModelStore::new(model)))
        .settings(settings.clone());
    if let Some(telemetry) = &telemetry {
        builder = builder.telemetry(Arc::<BackgroundTelemetry>::clone(telemetry));
    }
    let analyzer = builder.build().context("Failed to start analyzer")?;
    let report = analyzer.analyze(units);
    drop(analyzer);

    // results go out before telemetry gets any time to drain
    super::output::print(&report, options.format, &sources)?;
    if let Some(telemetry) = telemetry {
        finish_telemetry(telemetry);
    }
    Ok(report.has_violations_at(settings.fail_on))
}

fn finish_telemetry(telemetry: Arc<BackgroundTelemetry>) {
    let Ok(telemetry) = Arc::try_unwrap(telemetry) else {
        return;
    };
    let dropped = telemetry.dropped();
    if dropped > 0 {
        tracing::debug!("Telemetry queue full, dropped {dropped} records");
    }
    if !telemetry.shutdown() {
        tracing::debug!("Telemetry still sending at exit, remaining records abandoned");
    }
}

fn spawn_telemetry(settings: &Settings) -> Option<Arc<BackgroundTelemetry>> {
    let endpoint = settings.telemetry.endpoint.as_deref()?;
    match BackgroundTelemetry::spawn(HttpTransport::new(endpoint), DEFAULT_QUEUE_CAPACITY) {
        Ok(t) => Some(Arc::new(t)),
        Err(e) => {
            tracing::warn!("Telemetry disabled: {e}");
            None
        }
    }
}

fn relative<'a>(file: &'a Path, root: &Path) -> &'a Path {
    file.strip_prefix(root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(file)
}

/// Guesses the language of a dump from its name: `views.py.tree.json` is `py`.
fn dump_language(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(TREE_DUMP_SUFFIX))
        .and_then(|stem| Path::new(stem).extension())
        .and_then(|ext| ext.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn load_unit(
    input: &Input,
    root: &Path,
    parsers: &[Box<dyn SourceParser>],
    sources: &mut Sources,
) -> SourceUnit {
    let rel = relative(input.path(), root).to_path_buf();
    let unreadable = |language: String, reason: String| {
        tracing::warn!("{}: {reason}", rel.display());
        SourceUnit::Unreadable {
            file: rel.clone(),
            language,
            reason,
        }
    };

    match input {
        Input::TreeDump(path) => {
            let parsed = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|text| ExternalTree::from_json(&text).map_err(|e| e.to_string()));
            match parsed {
                Ok(tree) => {
                    if let Some(text) = &tree.source {
                        sources.insert(tree.file.clone(), text.clone());
                    }
                    SourceUnit::Tree(tree)
                }
                Err(reason) => unreadable(dump_language(path), reason),
            }
        }
        Input::Source(path, index) => {
            let Some(parser) = parsers.get(*index) else {
                return unreadable("unknown".to_string(), "no parser".to_string());
            };
            let language = parser.language().as_str().to_string();
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => return unreadable(language, e.to_string()),
            };
            match parser.parse(&rel, &text) {
                Ok(tree) => {
                    sources.insert(rel.clone(), text);
                    SourceUnit::Tree(tree)
                }
                Err(e) => unreadable(language, e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_language_from_name() {
        assert_eq!(dump_language(Path::new("a/views.py.tree.json")), "py");
        assert_eq!(dump_language(Path::new("a/plain.tree.json")), "unknown");
    }

    #[test]
    fn relative_keeps_file_roots() {
        let root = Path::new("/repo");
        assert_eq!(relative(Path::new("/repo/src/A.kt"), root), Path::new("src/A.kt"));
        let file = Path::new("/repo/A.kt");
        assert_eq!(relative(file, file), file);
    }
}
