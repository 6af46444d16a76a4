//! Configuration for the skilltree index builder.
//!
//! Settings come from (lowest to highest priority):
//! 1. Built-in defaults
//! 2. `skilltree.toml` in the workspace root, or an explicit `--config` file
//! 3. Environment variables `SKILLTREE_<SECTION>__<KEY>` (e.g. `SKILLTREE_TREE__OUTPUT`)
//!
//! Paths are kept as written and resolved against the workspace root on use.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the workspace root when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "skilltree.toml";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "SKILLTREE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub skills: SkillsConfig,
    pub tree: TreeConfig,
}

/// Where skill documents live and how they are recognized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Directory scanned recursively for skill documents
    pub dir: String,
    /// Exact filename of a skill document
    pub filename: String,
    /// Line prefix marking a breadcrumb line
    pub breadcrumb_prefix: String,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            dir: "skills".to_string(),
            filename: "SKILL.md".to_string(),
            breadcrumb_prefix: ">".to_string(),
        }
    }
}

/// The generated index document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Path of the persisted index
    pub output: String,
    /// Leading phrase stripped from sdk-setup descriptions
    pub sdk_setup_prefix: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            output: "SKILL_TREE.md".to_string(),
            sdk_setup_prefix: "Set up ".to_string(),
        }
    }
}

impl Config {
    /// Load configuration for a workspace.
    ///
    /// An explicit `config_path` must exist; the default `skilltree.toml` is optional.
    pub fn load(workspace_root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let (file, required) = match config_path {
            Some(path) => (resolve_path(workspace_root, &path.to_string_lossy()), true),
            None => (workspace_root.join(DEFAULT_CONFIG_FILE), false),
        };

        let settings = config::Config::builder()
            .add_source(config::File::from(file.as_path()).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to load configuration from {}", file.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", file.display()))
    }

    /// Absolute (or workspace-relative) skills directory.
    pub fn skills_dir(&self, workspace_root: &Path) -> PathBuf {
        resolve_path(workspace_root, &self.skills.dir)
    }

    /// Location of the persisted index document.
    pub fn output_path(&self, workspace_root: &Path) -> PathBuf {
        resolve_path(workspace_root, &self.tree.output)
    }
}

/// Expand `~` and anchor relative paths at the workspace root.
pub fn resolve_path(workspace_root: &Path, raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        workspace_root.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path(), None).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.skills.dir, "skills");
        assert_eq!(config.skills.filename, "SKILL.md");
        assert_eq!(config.skills.breadcrumb_prefix, ">");
        assert_eq!(config.tree.output, "SKILL_TREE.md");
        assert_eq!(config.tree.sdk_setup_prefix, "Set up ");
    }

    #[test]
    #[serial]
    fn test_workspace_file_partial_override() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            "[tree]\noutput = \"docs/TREE.md\"\n",
        )
        .unwrap();

        let config = Config::load(temp.path(), None).unwrap();
        assert_eq!(config.tree.output, "docs/TREE.md");
        // Untouched keys keep their defaults
        assert_eq!(config.tree.sdk_setup_prefix, "Set up ");
        assert_eq!(config.skills.dir, "skills");
    }

    #[test]
    #[serial]
    fn test_explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(temp.path(), Some(Path::new("missing.toml")));
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_explicit_config_relative_to_workspace() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("conf")).unwrap();
        fs::write(
            temp.path().join("conf/tree.toml"),
            "[skills]\ndir = \"docs/skills\"\nbreadcrumb_prefix = \"> \"\n",
        )
        .unwrap();

        let config = Config::load(temp.path(), Some(Path::new("conf/tree.toml"))).unwrap();
        assert_eq!(config.skills.dir, "docs/skills");
        assert_eq!(config.skills.breadcrumb_prefix, "> ");
    }

    #[test]
    #[serial]
    fn test_env_override() {
        let temp = TempDir::new().unwrap();
        std::env::set_var("SKILLTREE_TREE__OUTPUT", "INDEX.md");
        let config = Config::load(temp.path(), None);
        std::env::remove_var("SKILLTREE_TREE__OUTPUT");

        assert_eq!(config.unwrap().tree.output, "INDEX.md");
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/work");
        assert_eq!(resolve_path(root, "skills"), PathBuf::from("/work/skills"));
        assert_eq!(resolve_path(root, "/abs/skills"), PathBuf::from("/abs/skills"));
        assert!(!resolve_path(root, "~/skills").to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_skills_and_output_paths() {
        let config = Config::default();
        let root = Path::new("/work");
        assert_eq!(config.skills_dir(root), PathBuf::from("/work/skills"));
        assert_eq!(config.output_path(root), PathBuf::from("/work/SKILL_TREE.md"));
    }
}
