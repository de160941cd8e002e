//! Project configuration (`pkgscope.yaml`).
//!
//! Every field has a default, so an absent file or a partial file both work.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzer::AnalyzerSettings;
use crate::error::{Error, Result};
use crate::layout::LayoutSettings;
use crate::selection::InteractionSettings;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "pkgscope.yaml";

/// Glob patterns excluded from analysis unless configured otherwise.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/__pycache__/",
    "**/.*/",
    "build/",
    "dist/",
    "docs/",
    "**/tests/",
    "**/test/",
    "**/test_*.py",
    "**/*_test.py",
    "*.egg-info/",
    "venv/",
    ".venv/",
    "env/",
    ".env/",
    "**/venv/",
    "**/.venv/",
    "**/env/",
    "**/.env/",
    "site-packages/",
    "**/site-packages/",
];

/// Configuration file structure for pkgscope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Glob patterns handed to the analyzer.
    pub exclude: Vec<String>,
    /// Merge every internal node into its top-level package.
    pub collapse_to_top_level: bool,
    /// Analyzer invocation.
    pub analyzer: AnalyzerSettings,
    /// Layout algorithms and tunables.
    pub layout: LayoutSettings,
    /// Pointer interaction.
    pub interaction: InteractionSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect(),
            collapse_to_top_level: false,
            analyzer: AnalyzerSettings::default(),
            layout: LayoutSettings::default(),
            interaction: InteractionSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if it
    /// is not valid configuration YAML or lists no layout algorithms.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        if config.layout.algorithms.is_empty() {
            return Err(Error::Config(format!(
                "{}: layout.algorithms must name at least one algorithm",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Load `pkgscope.yaml` from `root`, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!(path = %path.display(), "Loading configuration");
            Self::load(&path)
        } else {
            debug!(root = %root.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Write the default configuration to `pkgscope.yaml` in `root`.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file exists and `force` is not set, or
    /// an I/O error if the write fails.
    pub fn init(root: &Path, force: bool) -> Result<PathBuf> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() && !force {
            return Err(Error::Config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        Self::default().save(&path)?;
        info!(path = %path.display(), "Wrote default configuration");
        Ok(path)
    }

    /// Save configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Algorithm;
    use std::fs;

    #[test]
    fn defaults_carry_the_standard_excludes() {
        let config = Config::default();

        assert!(config.exclude.iter().any(|p| p == "**/__pycache__/"));
        assert!(config.exclude.iter().any(|p| p == "**/site-packages/"));
        assert_eq!(config.exclude.len(), DEFAULT_EXCLUDES.len());
        assert!(!config.collapse_to_top_level);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("should create temp dir");

        let config = Config::load_or_default(dir.path()).expect("should load");

        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "collapse-to-top-level: true\nlayout:\n  algorithms: [force, manual]\n  seed: 7\ninteraction:\n  double-click-ms: 250\n",
        )
        .expect("should write config");

        let config = Config::load_or_default(dir.path()).expect("should load");

        assert!(config.collapse_to_top_level);
        assert_eq!(config.layout.algorithms, vec![Algorithm::Force, Algorithm::Manual]);
        assert_eq!(config.layout.seed, 7);
        assert_eq!(config.layout.iterations, LayoutSettings::default().iterations);
        assert_eq!(config.interaction.double_click_ms, 250);
        assert_eq!(config.analyzer, AnalyzerSettings::default());
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "layout: [not, a, mapping").expect("should write config");

        let err = Config::load(&path).expect_err("should reject");

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_algorithm_is_a_config_error() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "layout:\n  algorithms: [spectral]\n").expect("should write config");

        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn empty_algorithm_list_is_a_config_error() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "layout:\n  algorithms: []\n").expect("should write config");

        let err = Config::load(&path).expect_err("should reject");

        assert!(matches!(err, Error::Config(message) if message.contains("layout.algorithms")));
    }

    #[test]
    fn init_writes_defaults_once() {
        let dir = tempfile::tempdir().expect("should create temp dir");

        let path = Config::init(dir.path(), false).expect("should write");

        assert_eq!(Config::load(&path).expect("should load"), Config::default());
        assert!(matches!(Config::init(dir.path(), false), Err(Error::Config(_))));
        assert!(Config::init(dir.path(), true).is_ok());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = Config {
            collapse_to_top_level: true,
            exclude: vec!["build/".to_string()],
            ..Config::default()
        };

        config.save(&path).expect("should save");

        assert_eq!(Config::load(&path).expect("should load"), config);
    }
}
