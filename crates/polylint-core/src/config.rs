//! Run settings carried in the `settings` section of a configuration document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::types::Severity;

/// Engine and run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Worker threads (default: number of CPUs).
    pub jobs: Option<usize>,

    /// Severity threshold at which a run counts as failed (default: error).
    pub fail_on: Severity,

    /// Ancestors visible to `inside` / `not_inside` constraints.
    pub context_window: usize,

    /// Glob patterns of files to skip.
    pub exclude: Vec<String>,

    /// Whether discovery honours `.gitignore` files.
    pub respect_gitignore: bool,

    /// Failure telemetry collector.
    pub telemetry: TelemetrySettings,

    /// Per-rule overrides keyed by rule id.
    pub overrides: HashMap<String, RuleOverride>,
}

/// Default ancestor window for context constraints.
pub const DEFAULT_CONTEXT_WINDOW: usize = 8;

impl Default for Settings {
    fn default() -> Self {
        Self {
            jobs: None,
            fail_on: Severity::Error,
            context_window: DEFAULT_CONTEXT_WINDOW,
            exclude: vec!["**/build/**".to_string(), "**/node_modules/**".to_string()],
            respect_gitignore: true,
            telemetry: TelemetrySettings::default(),
            overrides: HashMap::new(),
        }
    }
}

impl Settings {
    /// Checks if a rule is enabled by its override (rules are on by default).
    #[must_use]
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        self.overrides
            .get(rule_id)
            .map_or(true, |o| o.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_id: &str) -> Option<Severity> {
        self.overrides.get(rule_id).and_then(|o| o.severity)
    }

    /// Returns true if `path` matches any exclude pattern.
    ///
    /// Invalid patterns never match.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .any(|p| p.matches_path(path))
    }

    /// Worker threads to use.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.jobs.filter(|&n| n > 0).unwrap_or_else(num_cpus::get)
    }
}

/// Where sanitized failure records are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Collector URL; telemetry is off when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Per-rule override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleOverride {
    /// Whether this rule reports.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,
}
