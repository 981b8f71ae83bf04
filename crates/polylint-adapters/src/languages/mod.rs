//! Per-language adapters mapping front-end kind names to [`NodeKind`]s.
//!
//! [`NodeKind`]: polylint_core::NodeKind

mod dart;
mod go;
mod groovy;
mod javascript;
mod kotlin;
mod php;
mod python;
mod ruby;
mod rust;
mod scala;
mod tex;
mod toml;

pub use dart::DartAdapter;
pub use go::GoAdapter;
pub use groovy::GroovyAdapter;
pub use javascript::JavaScriptAdapter;
pub use kotlin::KotlinAdapter;
pub use php::PhpAdapter;
pub use python::PythonAdapter;
pub use ruby::RubyAdapter;
pub use rust::RustAdapter;
pub use scala::ScalaAdapter;
pub use tex::TexAdapter;
pub use toml::TomlAdapter;
