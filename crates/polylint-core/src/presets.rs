//! Built-in rule sets selectable with `preset:`.

use std::fmt;
use std::str::FromStr;

use crate::rules::config_dto::{ConfigDocumentDto, RuleDto};
use crate::rules::ModelError;

const I18N: &str = include_str!("presets/i18n.yaml");

/// A named built-in rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Hardcoded user-facing text and locale-sensitive API calls.
    I18n,
}

impl Preset {
    /// Every preset.
    pub const ALL: [Self; 1] = [Self::I18n];

    /// Preset name as written in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I18n => "i18n",
        }
    }

    /// Raw YAML source of the preset.
    #[must_use]
    pub const fn source(self) -> &'static str {
        match self {
            Self::I18n => I18N,
        }
    }

    /// Deserializes the preset's rule records.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the embedded document is malformed.
    pub fn rules(self) -> Result<Vec<RuleDto>, serde_yaml::Error> {
        let doc: ConfigDocumentDto = serde_yaml::from_str(self.source())?;
        Ok(doc.rules)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ModelError::UnknownPreset {
                name: s.to_string(),
            })
    }
}
