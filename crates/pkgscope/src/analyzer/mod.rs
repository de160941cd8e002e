//! Source of file-level dependency data.
//!
//! The session never inspects Python imports itself. It asks an `Analyzer`
//! for the raw file-to-file map of a project and builds everything else from
//! that. `TachAnalyzer` runs the `tach` tool; tests substitute their own.

mod tach;

pub use tach::{TACH_CONFIG_FILE, TachAnalyzer};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::LoadError;
use crate::mapper::normalize_path;
use crate::types::RawDependencyMap;

/// Byte-order mark some analyzer builds emit before their JSON output.
const BOM: char = '\u{feff}';

/// Trait for producing a project's file-level dependency map.
///
/// # Example
///
/// ```rust
/// use pkgscope::analyzer::Analyzer;
/// use pkgscope::error::LoadError;
/// use pkgscope::types::RawDependencyMap;
/// use std::path::Path;
///
/// struct Fixed(RawDependencyMap);
///
/// impl Analyzer for Fixed {
///     fn dependency_map(&self, _root: &Path, _exclude: &[String]) -> Result<RawDependencyMap, LoadError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait Analyzer: Send + Sync {
    /// Map every project-relative source file to the files it depends on.
    ///
    /// # Errors
    ///
    /// Returns a `LoadError` when the tool is missing, fails, or produces
    /// output that is not a JSON object of string lists.
    fn dependency_map(&self, root: &Path, exclude: &[String])
    -> Result<RawDependencyMap, LoadError>;
}

/// Settings for the default analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalyzerSettings {
    /// Python executable used to run `python -m tach map`.
    pub python: String,
    /// Write `tach.toml` with the current exclude list before every run.
    pub write_config: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            python: "python".to_string(),
            write_config: true,
        }
    }
}

/// Parse analyzer output into a dependency map.
///
/// A leading byte-order mark is ignored and every path is normalized to
/// forward-slash form.
///
/// # Errors
///
/// Returns `LoadError::MalformedOutput` if the text is not a JSON object
/// whose values are lists of strings.
pub fn parse_dependency_map(output: &str) -> Result<RawDependencyMap, LoadError> {
    let text = output.strip_prefix(BOM).unwrap_or(output);
    let parsed: BTreeMap<String, Vec<String>> =
        serde_json::from_str(text).map_err(LoadError::MalformedOutput)?;

    let mut map = RawDependencyMap::new();
    for (source, targets) in parsed {
        map.entry(normalize_path(&source))
            .or_default()
            .extend(targets.iter().map(|t| normalize_path(t)));
    }

    debug!(files = map.len(), "Parsed dependency map");
    Ok(map)
}
