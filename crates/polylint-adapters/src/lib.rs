//! # polylint-adapters
//!
//! Language adapters and front ends for polylint.
//!
//! Every supported language gets a [`LanguageAdapter`] that maps its
//! front end's concrete node names onto the neutral node vocabulary and
//! recognizes its suppression idioms. This crate provides:
//!
//! - one adapter per language in [`languages`]
//! - [`default_registry()`] with all of them registered
//! - [`SourceParser`] front ends, currently [`KotlinParser`] (tree-sitter)
//!
//! [`LanguageAdapter`]: polylint_core::LanguageAdapter

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod kotlin;
pub mod languages;
mod literal;
mod parser;
mod suppress;

use std::path::Path;

use polylint_core::AdapterRegistry;

pub use kotlin::KotlinParser;
pub use parser::{ParseError, SourceParser};

/// Returns a registry with an adapter for every supported language.
#[must_use]
pub fn default_registry() -> AdapterRegistry {
    use languages::{
        DartAdapter, GoAdapter, GroovyAdapter, JavaScriptAdapter, KotlinAdapter, PhpAdapter,
        PythonAdapter, RubyAdapter, RustAdapter, ScalaAdapter, TexAdapter, TomlAdapter,
    };

    AdapterRegistry::new()
        .with(PythonAdapter)
        .with(KotlinAdapter)
        .with(ScalaAdapter)
        .with(JavaScriptAdapter)
        .with(DartAdapter)
        .with(GroovyAdapter)
        .with(RubyAdapter)
        .with(PhpAdapter)
        .with(RustAdapter)
        .with(GoAdapter)
        .with(TomlAdapter)
        .with(TexAdapter)
}

/// Returns every in-process front end.
#[must_use]
pub fn parsers() -> Vec<Box<dyn SourceParser>> {
    vec![Box::new(KotlinParser::new())]
}

/// Returns the front end handling `path`, if any.
#[must_use]
pub fn parser_for_path(path: &Path) -> Option<Box<dyn SourceParser>> {
    parsers().into_iter().find(|p| p.handles(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polylint_core::LanguageId;

    #[test]
    fn registry_covers_every_language() {
        let registry = default_registry();
        for lang in LanguageId::ALL {
            assert!(registry.adapter(lang.as_str()).is_ok(), "missing adapter for {lang}");
        }
    }

    #[test]
    fn parser_lookup_by_extension() {
        assert!(parser_for_path(Path::new("App.kt")).is_some());
        assert!(parser_for_path(Path::new("app.py")).is_none());
    }
}
