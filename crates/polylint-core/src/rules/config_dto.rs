//! Configuration deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::Settings;

/// Raw representation of a configuration document.
///
/// Unknown top-level keys are ignored so newer documents still load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocumentDto {
    /// Built-in rule set to prepend (e.g., `"i18n"`).
    #[serde(default)]
    pub preset: Option<String>,

    /// Rule files merged after the preset and before `rules`, in order.
    #[serde(default)]
    pub include: Vec<IncludeDto>,

    /// Ordered rule records.
    #[serde(default)]
    pub rules: Vec<RuleDto>,

    /// Engine and run settings.
    #[serde(default)]
    pub settings: Settings,
}

/// One entry of `include`: a bare path, or a path with an on/off switch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IncludeDto {
    /// `- extra/rules.yaml`
    Path(PathBuf),
    /// `- { path: extra/rules.yaml, enabled: false }`
    Entry {
        /// Rule file, relative to the including document.
        path: PathBuf,
        /// Whether the file is merged (default: true).
        #[serde(default = "default_enabled")]
        enabled: bool,
    },
}

impl IncludeDto {
    /// Path as written.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Path(path) | Self::Entry { path, .. } => path,
        }
    }

    /// Whether the file takes part in the model.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Path(_) => true,
            Self::Entry { enabled, .. } => *enabled,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Raw representation of one rule record.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDto {
    /// Unique rule id (e.g., `"i18n-hardcoded-string"`).
    pub id: String,
    /// Target node kinds, or `["*"]`.
    pub kinds: Vec<String>,
    /// Language ids the rule applies to; empty or `["*"]` means all.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Severity (default: "warning").
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Matcher expression.
    pub pattern: String,
    /// Message template.
    pub message: String,
    /// Matcher flavour (default: "regex").
    #[serde(default)]
    pub matcher: Option<String>,
    /// Ancestor kinds, at least one of which must enclose the node.
    #[serde(default)]
    pub inside: Vec<String>,
    /// Ancestor kinds, none of which may enclose the node.
    #[serde(default)]
    pub not_inside: Vec<String>,
    /// Whether the rule takes part in evaluation (default: true).
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Document reference.
    #[serde(default)]
    pub doc: Option<String>,
}

fn default_severity_str() -> String {
    "warning".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty_yaml() {
        let dto: ConfigDocumentDto = serde_yaml::from_str("{}").unwrap();
        assert!(dto.rules.is_empty());
        assert!(dto.preset.is_none());
    }

    #[test]
    fn deserialize_yaml_rule() {
        let yaml = r#"
rules:
  - id: R1
    kinds: [StringLiteral]
    languages: [py]
    severity: warning
    pattern: ".+"
    message: hardcoded string
"#;
        let dto: ConfigDocumentDto = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(dto.rules.len(), 1);
        assert_eq!(dto.rules[0].id, "R1");
        assert_eq!(dto.rules[0].kinds, vec!["StringLiteral".to_string()]);
        assert!(dto.rules[0].matcher.is_none());
    }

    #[test]
    fn include_entries_in_both_shapes() {
        let yaml = r#"
include:
  - shared/i18n.yaml
  - { path: legacy.json, enabled: false }
  - { path: extra.toml }
"#;
        let dto: ConfigDocumentDto = serde_yaml::from_str(yaml).unwrap();
        let on: Vec<bool> = dto.include.iter().map(IncludeDto::is_enabled).collect();
        assert_eq!(on, vec![true, false, true]);
        assert_eq!(dto.include[1].path(), Path::new("legacy.json"));
    }

    #[test]
    fn unknown_top_level_keys_are_ignored() {
        let json = r#"{"version": 3, "owner": "i18n-team", "rules": []}"#;
        let dto: ConfigDocumentDto = serde_json::from_str(json).unwrap();
        assert!(dto.rules.is_empty());
    }

    #[test]
    fn severity_defaults_to_warning() {
        let json = r#"{"rules": [{"id": "R1", "kinds": ["*"], "pattern": "", "message": "m"}]}"#;
        let dto: ConfigDocumentDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.rules[0].severity, "warning");
        assert!(dto.rules[0].languages.is_empty());
    }
}
