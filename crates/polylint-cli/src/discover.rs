//! Input discovery: host tree dumps and sources with an in-process parser.

use anyhow::Result;
use ignore::WalkBuilder;
use polylint_adapters::SourceParser;
use polylint_core::Settings;
use std::path::{Path, PathBuf};

/// Suffix of host-produced tree dumps.
pub const TREE_DUMP_SUFFIX: &str = ".tree.json";

/// A discovered input file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Input {
    /// A serialized external tree.
    TreeDump(PathBuf),
    /// Source text for the parser at the given index.
    Source(PathBuf, usize),
}

impl Input {
    /// Path of the input.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::TreeDump(p) | Self::Source(p, _) => p,
        }
    }
}

/// Walks `root` and returns inputs in path order.
///
/// A file `root` is returned as-is when it is a recognized input.
///
/// # Errors
///
/// Returns an error if the walk cannot start.
pub fn discover(
    root: &Path,
    settings: &Settings,
    parsers: &[Box<dyn SourceParser>],
) -> Result<Vec<Input>> {
    if !root.exists() {
        anyhow::bail!("Path does not exist: {}", root.display());
    }

    let mut inputs = Vec::new();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(settings.respect_gitignore)
        .git_exclude(settings.respect_gitignore)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        if settings.is_excluded(rel) {
            tracing::debug!("Excluded {}", rel.display());
            continue;
        }
        if let Some(input) = classify(path, parsers) {
            inputs.push(input);
        }
    }

    inputs.sort();
    Ok(inputs)
}

fn classify(path: &Path, parsers: &[Box<dyn SourceParser>]) -> Option<Input> {
    let name = path.file_name()?.to_str()?;
    if name.ends_with(TREE_DUMP_SUFFIX) {
        return Some(Input::TreeDump(path.to_path_buf()));
    }
    parsers
        .iter()
        .position(|p| p.handles(path))
        .map(|index| Input::Source(path.to_path_buf(), index))
}
