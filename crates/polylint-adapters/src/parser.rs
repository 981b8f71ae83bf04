//! Source front ends turning raw text into [`ExternalTree`]s.
//!
//! [`SourceParser`] is the extension point for parsing a language in-process.
//! Hosts that already own a parser skip this and hand over tree dumps.

use std::path::{Path, PathBuf};

use polylint_core::{ExternalTree, LanguageId};

/// Errors raised by a front end.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load {language} grammar: {source}")]
    Grammar {
        /// Language whose grammar failed.
        language: LanguageId,
        /// Underlying tree-sitter error.
        #[source]
        source: tree_sitter::LanguageError,
    },

    /// The parser produced no tree.
    #[error("{}: parser produced no tree", file.display())]
    NoTree {
        /// File being parsed.
        file: PathBuf,
    },

    /// The concrete tree nests deeper than the engine accepts.
    #[error("{}: tree nests deeper than {limit} levels", file.display())]
    TooDeep {
        /// File being parsed.
        file: PathBuf,
        /// Maximum accepted depth.
        limit: usize,
    },
}

/// Parses source text of one language.
pub trait SourceParser: Send + Sync {
    /// Language this front end produces trees for.
    fn language(&self) -> LanguageId;

    /// File extensions handled, without the dot (e.g. `["kt", "kts"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Parses `source` into an external tree for `file`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the grammar cannot be loaded or the tree is
    /// unusable.
    fn parse(&self, file: &Path, source: &str) -> Result<ExternalTree, ParseError>;

    /// Returns true if this front end handles `path`.
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}
