//! Language identifiers understood by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported source language.
///
/// The canonical identifier is the short form used in rule configuration
/// (`py`, `kt`, ...). Long names are accepted as aliases when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LanguageId {
    /// Python.
    Python,
    /// Kotlin.
    Kotlin,
    /// Scala.
    Scala,
    /// JavaScript.
    JavaScript,
    /// Dart.
    Dart,
    /// Groovy.
    Groovy,
    /// Ruby.
    Ruby,
    /// PHP.
    Php,
    /// Rust.
    Rust,
    /// Go.
    Go,
    /// TOML.
    Toml,
    /// TeX / LaTeX.
    Tex,
}

impl LanguageId {
    /// Every supported language, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Python,
        Self::Kotlin,
        Self::Scala,
        Self::JavaScript,
        Self::Dart,
        Self::Groovy,
        Self::Ruby,
        Self::Php,
        Self::Rust,
        Self::Go,
        Self::Toml,
        Self::Tex,
    ];

    /// Canonical short identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "py",
            Self::Kotlin => "kt",
            Self::Scala => "scala",
            Self::JavaScript => "js",
            Self::Dart => "dart",
            Self::Groovy => "groovy",
            Self::Ruby => "rb",
            Self::Php => "php",
            Self::Rust => "rs",
            Self::Go => "go",
            Self::Toml => "toml",
            Self::Tex => "tex",
        }
    }

    /// Resolves a canonical identifier or alias.
    #[must_use]
    pub fn lookup(id: &str) -> Option<Self> {
        let lang = match id.to_ascii_lowercase().as_str() {
            "py" | "python" => Self::Python,
            "kt" | "kts" | "kotlin" => Self::Kotlin,
            "scala" | "sc" => Self::Scala,
            "js" | "javascript" | "jsx" | "mjs" => Self::JavaScript,
            "dart" => Self::Dart,
            "groovy" | "gradle" => Self::Groovy,
            "rb" | "ruby" => Self::Ruby,
            "php" => Self::Php,
            "rs" | "rust" => Self::Rust,
            "go" | "golang" => Self::Go,
            "toml" => Self::Toml,
            "tex" | "latex" => Self::Tex,
            _ => return None,
        };
        Some(lang)
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an identifier that names no supported language.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language id `{0}`")]
pub struct UnknownLanguage(pub String);

impl FromStr for LanguageId {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

impl TryFrom<String> for LanguageId {
    type Error = UnknownLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LanguageId> for String {
    fn from(lang: LanguageId) -> Self {
        lang.as_str().to_string()
    }
}
