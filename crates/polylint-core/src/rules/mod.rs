//! Inspection rules driven by a YAML, JSON or TOML document.
//!
//! # Architecture
//!
//! ```text
//! config bytes
//!   ↓ serde (DTO layer)
//! config_dto types  (preset rules, then included files, then own rules)
//!   ↓ validate + convert
//! RuleModel (pure domain model, indexed)
//!   ↓ ModelStore::replace / reload
//! Arc<RuleModel> snapshots for evaluation
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Settings;
use crate::presets::Preset;
use config_dto::{ConfigDocumentDto, IncludeDto};
use loader::RuleGroup;

pub mod config_dto;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod store;

pub use loader::ValidationIssue;
pub use matcher::{Captures, Matcher, MatcherKind};
pub use model::{
    ContextConstraint, KindSelector, LanguageSet, MessageTemplate, ModelError, RenderInput, Rule,
    RuleModel,
};
pub use store::ModelStore;

/// Syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// JSON (`.json`).
    Json,
    /// TOML (`.toml`).
    Toml,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Toml => "TOML",
        })
    }
}

/// Errors from loading a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not well-formed.
    #[error("{format} parse error: {message}")]
    Parse {
        /// Syntax the document was read as.
        format: ConfigFormat,
        /// Parser message.
        message: String,
    },

    /// The document parsed but describes an invalid rule set.
    #[error("configuration validation errors:\n{}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// The document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The path has no recognized configuration extension.
    #[error("cannot tell configuration format of {}", path.display())]
    UnknownFormat {
        /// The offending path.
        path: PathBuf,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A loaded document: the validated rules plus run settings.
#[derive(Debug)]
pub struct RuleDocument {
    /// Validated rule model.
    pub model: RuleModel,
    /// Engine and run settings.
    pub settings: Settings,
}

/// Parses a document and builds its [`RuleModel`].
///
/// Loading is atomic: a model is returned only if every rule is valid.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] on malformed syntax and
/// [`ConfigError::Validation`] on invalid rules.
pub fn load(bytes: &[u8], format: ConfigFormat) -> Result<RuleModel, ConfigError> {
    load_document(bytes, format).map(|doc| doc.model)
}

/// Parses a document into its rule model and settings.
///
/// `include` paths resolve against the working directory.
///
/// # Errors
///
/// Same conditions as [`load`], plus [`ConfigError::Io`] for an enabled
/// include that cannot be read.
pub fn load_document(bytes: &[u8], format: ConfigFormat) -> Result<RuleDocument, ConfigError> {
    load_document_at(bytes, format, Path::new(""))
}

/// Parses a document, resolving `include` paths against `base`.
///
/// The model is built from the preset, then every enabled include in
/// listed order, then the document's own `rules`. All of them share one id
/// namespace, and any failure rejects the whole document.
///
/// # Errors
///
/// Same conditions as [`load_document`].
pub fn load_document_at(
    bytes: &[u8],
    format: ConfigFormat,
    base: &Path,
) -> Result<RuleDocument, ConfigError> {
    let dto = parse(bytes, format)?;

    let mut groups = Vec::new();
    if let Some(name) = dto.preset.as_deref() {
        groups.push(RuleGroup::new("preset.rules", preset_rules(name)?));
    }
    groups.extend(included(&dto.include, base)?);
    groups.push(RuleGroup::new("rules", dto.rules));

    let model = loader::load_groups(groups).map_err(ConfigError::Validation)?;
    debug!("Loaded {} rules from {format} document", model.len());
    Ok(RuleDocument {
        model,
        settings: dto.settings,
    })
}

fn parse(bytes: &[u8], format: ConfigFormat) -> Result<ConfigDocumentDto, ConfigError> {
    let parse_err = |message: String| ConfigError::Parse { format, message };
    match format {
        ConfigFormat::Yaml => serde_yaml::from_slice(bytes).map_err(|e| parse_err(e.to_string())),
        ConfigFormat::Json => serde_json::from_slice(bytes).map_err(|e| parse_err(e.to_string())),
        ConfigFormat::Toml => {
            let text = std::str::from_utf8(bytes).map_err(|e| parse_err(e.to_string()))?;
            toml::from_str(text).map_err(|e| parse_err(e.to_string()))
        }
    }
}

/// Reads the enabled rule files of `include`.
fn included(includes: &[IncludeDto], base: &Path) -> Result<Vec<RuleGroup>, ConfigError> {
    let mut groups = Vec::new();
    for (i, include) in includes.iter().enumerate() {
        if !include.is_enabled() {
            debug!("Skipping disabled include {}", include.path().display());
            continue;
        }
        let path = base.join(include.path());
        let format = ConfigFormat::from_path(&path)
            .ok_or_else(|| ConfigError::UnknownFormat { path: path.clone() })?;
        let bytes = std::fs::read(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let dto = parse(&bytes, format).map_err(|e| match e {
            ConfigError::Parse { format, message } => ConfigError::Parse {
                format,
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })?;
        if dto.preset.is_some() || !dto.include.is_empty() {
            warn!("{}: only `rules` are read from an included file", path.display());
        }
        groups.push(RuleGroup::new(format!("include[{i}].rules"), dto.rules));
    }
    Ok(groups)
}

/// Reads and loads a document, detecting its format from the extension.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownFormat`], [`ConfigError::Io`], or any
/// error from [`load_document`].
pub fn load_file(path: &Path) -> Result<RuleDocument, ConfigError> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnknownFormat {
        path: path.to_path_buf(),
    })?;
    let bytes = std::fs::read(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_document_at(&bytes, format, path.parent().unwrap_or(Path::new("")))
}

fn preset_rules(name: &str) -> Result<Vec<config_dto::RuleDto>, ConfigError> {
    let preset: Preset = name.parse().map_err(|e| {
        ConfigError::Validation(vec![ValidationIssue {
            context: "preset".to_string(),
            source: e,
        }])
    })?;
    preset.rules().map_err(|e| ConfigError::Parse {
        format: ConfigFormat::Yaml,
        message: format!("preset `{preset}`: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const R1_YAML: &str = r#"
rules:
  - id: R1
    kinds: [StringLiteral]
    languages: [py]
    severity: warning
    pattern: ".+"
    message: hardcoded string
"#;

    #[test]
    fn load_yaml() {
        let model = load(R1_YAML.as_bytes(), ConfigFormat::Yaml).unwrap();
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn load_json_ignores_unknown_keys() {
        let json = r#"{"schema": 2, "rules": [{"id": "R1", "kinds": ["Comment"], "languages": ["go"],
            "severity": "info", "pattern": "FIXME", "message": "fixme"}]}"#;
        let model = load(json.as_bytes(), ConfigFormat::Json).unwrap();
        assert!(model.get("R1").is_some());
    }

    #[test]
    fn load_toml_with_settings() {
        let toml = r#"
[settings]
jobs = 2
fail_on = "warning"

[[rules]]
id = "R1"
kinds = ["Key"]
languages = ["toml"]
pattern = "^name$"
message = "key {value}"
"#;
        let doc = load_document(toml.as_bytes(), ConfigFormat::Toml).unwrap();
        assert_eq!(doc.model.len(), 1);
        assert_eq!(doc.settings.jobs, Some(2));
    }

    #[test]
    fn malformed_syntax_is_parse_error() {
        let err = load(b"rules: [", ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: ConfigFormat::Yaml, .. }));
    }

    #[test]
    fn preset_rules_come_first() {
        let yaml = format!("preset: i18n\n{R1_YAML}");
        let model = load(yaml.as_bytes(), ConfigFormat::Yaml).unwrap();
        assert_eq!(&**model.rules()[0].id(), "i18n-hardcoded-string");
        assert_eq!(&**model.rules()[model.len() - 1].id(), "R1");
    }

    #[test]
    fn preset_ids_clash_with_user_ids() {
        let yaml = r#"
preset: i18n
rules:
  - { id: i18n-case-conversion, kinds: [Call], pattern: x, message: m }
"#;
        let err = load(yaml.as_bytes(), ConfigFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate rule id `i18n-case-conversion`"));
    }

    #[test]
    fn unknown_preset_is_validation_error() {
        let err = load(b"preset: strict", ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("polylint.yml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("Cargo.lock")), None);
    }

    mod include {
        use super::*;
        use std::fs;
        use std::path::PathBuf;
        use tempfile::TempDir;

        const SHARED: &str = "rules:\n  - { id: S1, kinds: [Comment], pattern: FIXME, message: fixme }\n";

        fn workspace(main: &str) -> (TempDir, PathBuf) {
            let tmp = TempDir::new().unwrap();
            fs::create_dir_all(tmp.path().join("shared")).unwrap();
            fs::write(tmp.path().join("shared/fixme.yaml"), SHARED).unwrap();
            let main_path = tmp.path().join("polylint.yaml");
            fs::write(&main_path, main).unwrap();
            (tmp, main_path)
        }

        #[test]
        fn enabled_files_merge_in_order() {
            let (_tmp, path) = workspace(&format!(
                "preset: i18n\ninclude:\n  - shared/fixme.yaml\n  - {{ path: missing.yaml, enabled: false }}\n{R1_YAML}"
            ));
            let model = load_file(&path).unwrap().model;
            let ids: Vec<&str> = model.rules().iter().map(|r| &**r.id()).collect();
            let s1 = ids.iter().position(|id| *id == "S1").unwrap();
            assert_eq!(ids[0], "i18n-hardcoded-string");
            assert_eq!(ids[s1 + 1], "R1");
            assert_eq!(ids.last(), Some(&"R1"));
        }

        #[test]
        fn disabling_an_include_drops_its_rules() {
            let (_tmp, path) =
                workspace("include:\n  - { path: shared/fixme.yaml, enabled: false }\n");
            assert!(load_file(&path).unwrap().model.is_empty());
        }

        #[test]
        fn missing_include_rejects_the_document() {
            let (_tmp, path) = workspace(&format!("include: [nowhere.yaml]\n{R1_YAML}"));
            assert!(matches!(load_file(&path), Err(ConfigError::Io { .. })));
        }

        #[test]
        fn ids_are_unique_across_files() {
            let (_tmp, path) = workspace(
                "include: [shared/fixme.yaml]\nrules:\n  - { id: S1, kinds: [Call], pattern: x, message: m }\n",
            );
            let err = load_file(&path).unwrap_err();
            assert!(err.to_string().contains("duplicate rule id `S1`"));
        }

        #[test]
        fn issues_in_included_files_are_located() {
            let (tmp, path) = workspace("include: [bad.json]\n");
            fs::write(
                tmp.path().join("bad.json"),
                r#"{"rules": [{"id": "B1", "kinds": ["Nope"], "pattern": "x", "message": "m"}]}"#,
            )
            .unwrap();
            let Err(ConfigError::Validation(issues)) = load_file(&path) else {
                panic!("expected validation issues");
            };
            assert_eq!(issues[0].context, "include[0].rules[0] 'B1'.kinds[0]");
        }
    }
}
