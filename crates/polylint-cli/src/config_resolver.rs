//! Finding the rule document for a check.
//!
//! Lookup order:
//!
//! 1. `--config` (or `POLYLINT_CONFIG`), taken as given
//! 2. the nearest `polylint.{yaml,yml,json,toml}` or `.polylint.yaml`, from the
//!    checked directory up to the enclosing repository root
//! 3. `config.yaml` in the global directory (`$POLYLINT_CONFIG_DIR`, else
//!    `~/.polylint/`)
//! 4. an empty rule set with default settings

use anyhow::{Context, Result};
use polylint_core::rules::{self, RuleDocument};
use polylint_core::{RuleModel, Settings};
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line.
    Explicit(PathBuf),
    /// Found next to, or above, the checked path.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the document this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file, or a file it includes, cannot be read,
    /// parsed or validated.
    pub fn load(&self) -> Result<RuleDocument> {
        let path = match self {
            Self::Default => {
                tracing::info!("No configuration found, running with an empty rule set");
                return Ok(RuleDocument {
                    model: RuleModel::empty(),
                    settings: Settings::default(),
                });
            }
            Self::Global(path) => {
                tracing::info!("Using global config: {}", path.display());
                path
            }
            Self::Explicit(path) | Self::Project(path) => path,
        };
        rules::load_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Project-level config file names, by preference.
pub const PROJECT_CONFIG_NAMES: &[&str] = &[
    "polylint.yaml",
    "polylint.yml",
    "polylint.json",
    "polylint.toml",
    ".polylint.yaml",
];

const GLOBAL_CONFIG_NAME: &str = "config.yaml";

/// Marks a repository root; the upward search stops there.
const REPOSITORY_MARKER: &str = ".git";

/// Resolves the configuration for checking `target`.
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    Lookup {
        global_dir: global_config_dir(),
    }
    .find(target)
}

struct Lookup {
    global_dir: Option<PathBuf>,
}

impl Lookup {
    fn find(&self, target: &Path) -> ConfigSource {
        // relative paths have no ancestors to climb
        let target = target.canonicalize().unwrap_or_else(|_| target.to_path_buf());
        let start = if target.is_file() {
            target.parent().unwrap_or(&target)
        } else {
            &target
        };
        if let Some(found) = nearest_project_config(start) {
            tracing::debug!("Found project config: {}", found.display());
            return ConfigSource::Project(found);
        }
        self.global_dir
            .as_deref()
            .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
            .filter(|candidate| candidate.is_file())
            .map_or(ConfigSource::Default, ConfigSource::Global)
    }
}

/// Walks from `start` towards the root, stopping after the first directory
/// that holds a repository marker.
fn nearest_project_config(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let found = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
        if dir.join(REPOSITORY_MARKER).exists() {
            break;
        }
    }
    None
}

/// Returns the global config directory: `$POLYLINT_CONFIG_DIR`, else
/// `~/.polylint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    match std::env::var_os("POLYLINT_CONFIG_DIR") {
        Some(dir) => Some(PathBuf::from(dir)),
        None => home::home_dir().map(|h| h.join(".polylint")),
    }
}
