//! `tach map` subprocess analyzer.

use serde::Serialize;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use super::{Analyzer, AnalyzerSettings, parse_dependency_map};
use crate::error::LoadError;
use crate::types::RawDependencyMap;

/// Name of the analyzer configuration file written into the project root.
pub const TACH_CONFIG_FILE: &str = "tach.toml";

const CONFIG_HEADER: &str = "# Generated by pkgscope. Rewritten on every load.";

const INSTALL_HINT: &str = "Install tach into the interpreter's environment: python -m pip install tach\n\
     or point `analyzer.python` in pkgscope.yaml at an interpreter that has it.";

#[derive(Serialize)]
struct TachConfig<'a> {
    source_roots: Vec<&'a str>,
    exclude: &'a [String],
}

/// Runs `<python> -m tach map` in the project root.
#[derive(Debug, Clone, Default)]
pub struct TachAnalyzer {
    settings: AnalyzerSettings,
}

impl TachAnalyzer {
    /// Create an analyzer with the given settings.
    #[must_use]
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self { settings }
    }

    /// Display form of the command line.
    #[must_use]
    pub fn command_line(&self) -> String {
        format!("{} -m tach map", self.settings.python)
    }

    fn write_config(&self, root: &Path, exclude: &[String]) -> Result<(), LoadError> {
        let config = TachConfig {
            source_roots: vec![source_root(root)],
            exclude,
        };
        let body = toml::to_string(&config).map_err(LoadError::ConfigSerialize)?;
        let path = root.join(TACH_CONFIG_FILE);

        std::fs::write(&path, format!("{CONFIG_HEADER}\n\n{body}"))
            .map_err(|source| LoadError::ConfigWrite {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), patterns = exclude.len(), "Wrote analyzer config");
        Ok(())
    }
}

impl Analyzer for TachAnalyzer {
    fn dependency_map(
        &self,
        root: &Path,
        exclude: &[String],
    ) -> Result<RawDependencyMap, LoadError> {
        if self.settings.write_config {
            self.write_config(root, exclude)?;
        }

        let command = self.command_line();
        info!(command = %command, root = %root.display(), "Running analyzer");

        let output = Command::new(&self.settings.python)
            .args(["-m", "tach", "map"])
            .current_dir(root)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LoadError::AnalyzerNotFound {
                        command: command.clone(),
                        install_hint: INSTALL_HINT.to_string(),
                    }
                } else {
                    LoadError::AnalyzerSpawn {
                        command: command.clone(),
                        source: e,
                    }
                }
            })?;

        if !output.status.success() {
            return Err(LoadError::AnalyzerFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_dependency_map(&String::from_utf8_lossy(&output.stdout))
    }
}

/// `src` when it holds Python files or sub-directories, otherwise `.`.
fn source_root(root: &Path) -> &'static str {
    let Ok(entries) = std::fs::read_dir(root.join("src")) else {
        return ".";
    };
    let has_sources = entries.filter_map(Result::ok).any(|entry| {
        let path = entry.path();
        path.is_dir() || path.extension().is_some_and(|ext| ext == "py")
    });
    if has_sources { "src" } else { "." }
}
