//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# polylint configuration
# Rules match normalized syntax nodes by kind, language and value.

# Built-in rule set: hardcoded UI strings and locale-sensitive calls.
preset: i18n

rules:
  - id: no-todo-comments
    kinds: [Comment]
    languages: ["*"]
    severity: info
    pattern: "\\bTODO\\b"
    message: "unresolved TODO: {value}"

  # - id: no-print-debugging
  #   kinds: [Identifier]
  #   languages: [py]
  #   pattern: "^print$"
  #   inside: [Call]
  #   message: "use logging instead of {value}"

settings:
  # Exit non-zero when any diagnostic reaches this severity.
  fail_on: error
  exclude:
    - "**/build/**"
    - "**/node_modules/**"
  # jobs: 4
  # overrides:
  #   i18n-hardcoded-string:
  #     severity: error
"#;

/// Name of the file written by `init`.
pub const CONFIG_FILE: &str = "polylint.yaml";

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: polylint check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }
    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polylint_core::rules::{self, ConfigFormat};
    use tempfile::TempDir;

    #[test]
    fn starter_config_is_valid() {
        let doc = rules::load_document(DEFAULT_CONFIG.as_bytes(), ConfigFormat::Yaml).unwrap();
        assert!(doc.model.get("no-todo-comments").is_some());
        assert!(doc.model.get("i18n-hardcoded-string").is_some());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "keep me").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
