//! Error types for pkgscope operations.
//!
//! Errors are split by how far they reach:
//!
//! - **`MappingFailure`**: one file could not be turned into an identifier.
//!   Collected and logged; the file's contribution is skipped.
//! - **Operation errors** (`LoadError`, `ExplodeError`, `NotFoundError`,
//!   `NothingToUndo`): abort only the current operation and leave the session
//!   in its last known-good state.
//! - **`LayoutError`**: one algorithm failing is recovered internally; only
//!   `LayoutError::Exhausted` escapes the layout engine.
//! - **`Error`**: top-level wrapper for callers that do not care which
//!   operation failed.

use std::path::PathBuf;
use thiserror::Error;

use crate::layout::Algorithm;
use crate::types::NodeId;

/// Result type for pkgscope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// Loading the project failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Exploding a node failed
    #[error(transparent)]
    Explode(#[from] ExplodeError),

    /// A node named by the caller does not exist
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Undo was requested with an empty history
    #[error(transparent)]
    NothingToUndo(#[from] NothingToUndo),

    /// Every configured layout algorithm failed
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to obtain or interpret the analyzer's dependency map.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The project root is missing or not a directory.
    #[error("project root is not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    /// The analyzer executable could not be found.
    #[error("{command} not found\n\n{install_hint}")]
    AnalyzerNotFound {
        /// The command that was not found.
        command: String,
        /// Installation instructions for the missing command.
        install_hint: String,
    },

    /// The analyzer process could not be started.
    #[error("failed to run analyzer '{command}': {source}")]
    AnalyzerSpawn {
        /// The command that failed to spawn.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The analyzer exited with a non-zero status.
    #[error("analyzer failed with exit code {}\n\nstderr:\n{stderr}", .code.map_or_else(|| "<signal>".to_string(), |c| c.to_string()))]
    AnalyzerFailed {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// The analyzer output is not a JSON object of string lists.
    #[error("failed to parse analyzer output as JSON: {0}")]
    MalformedOutput(#[source] serde_json::Error),

    /// The analyzer configuration file could not be written.
    #[error("failed to write analyzer config {}: {source}", .path.display())]
    ConfigWrite {
        /// Path of the configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The analyzer configuration could not be serialized.
    #[error("failed to serialize analyzer config: {0}")]
    ConfigSerialize(#[source] toml::ser::Error),

    /// No layout could be computed for the loaded graph.
    #[error("initial layout failed: {0}")]
    Layout(#[from] LayoutError),
}

/// Reasons an explode request was refused or failed.
///
/// Every variant except `Layout` is raised before the history checkpoint, so a
/// refused explode never changes session state.
#[derive(Debug, Error)]
pub enum ExplodeError {
    /// The node is not in the current graph.
    #[error("node '{0}' not found in graph")]
    NotFound(NodeId),

    /// External dependencies have no project directory to expand.
    #[error("node '{0}' is an external dependency and cannot be exploded")]
    IsExternal(NodeId),

    /// The node does not map to a directory (leaf module or missing path).
    #[error("node '{0}' does not map to a package directory")]
    NotExpandable(NodeId),

    /// No file-level dependency data from a load is available.
    #[error("no file-level dependency data loaded; load a project before exploding")]
    MissingGroundTruth,

    /// The directory holds no sub-packages or `.py` modules.
    #[error("no sub-packages or sub-modules found within '{0}'")]
    NoChildren(NodeId),

    /// The package directory could not be listed.
    #[error("failed to list children of '{node}': {source}")]
    Io {
        /// The node being exploded.
        node: NodeId,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Settling the layout after the explode failed.
    #[error("layout after explode failed: {0}")]
    Layout(#[from] LayoutError),
}

impl ExplodeError {
    /// Returns `true` for refusals that shells show as a notice rather than an
    /// error (the user picked a node that cannot be expanded).
    #[must_use]
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            Self::IsExternal(_) | Self::NotExpandable(_) | Self::NoChildren(_)
        )
    }
}

/// The named node does not exist in the current graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("node '{0}' not found in graph")]
pub struct NotFoundError(pub NodeId);

/// Undo was requested but the history is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("nothing to undo")]
pub struct NothingToUndo;

/// Failure of a layout algorithm.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// The algorithm cannot handle this input (size limit, seeded run, disabled).
    #[error("{algorithm} layout unavailable: {reason}")]
    Unavailable {
        /// The algorithm that declined.
        algorithm: Algorithm,
        /// Why it declined.
        reason: String,
    },

    /// The algorithm produced non-finite coordinates.
    #[error("{algorithm} layout diverged at node '{node}'")]
    Diverged {
        /// The algorithm that diverged.
        algorithm: Algorithm,
        /// First node found with a non-finite coordinate.
        node: NodeId,
    },

    /// The algorithm's output did not cover exactly the graph's nodes.
    #[error("{algorithm} layout returned {returned} positions for {expected} nodes")]
    Incomplete {
        /// The algorithm at fault.
        algorithm: Algorithm,
        /// Number of graph nodes.
        expected: usize,
        /// Number of positions returned.
        returned: usize,
    },

    /// Every configured algorithm failed.
    #[error("all layout algorithms failed: {}", format_attempts(.0))]
    Exhausted(Vec<LayoutError>),
}

fn format_attempts(attempts: &[LayoutError]) -> String {
    if attempts.is_empty() {
        return "no algorithms configured".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Which side of a raw dependency pair failed to map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// The importing file (a key of the raw map).
    Source,
    /// An imported file (a value of the raw map).
    Target,
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// A file whose path could not be resolved to an identifier.
///
/// These are collected during graph building but don't halt the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingFailure {
    /// The file path as reported by the analyzer.
    pub path: String,
    /// Whether the file appeared as a source or a target.
    pub role: FileRole,
    /// Human-readable reason.
    pub reason: String,
}

impl MappingFailure {
    /// Create a mapping failure.
    #[must_use]
    pub fn new(path: impl Into<String>, role: FileRole, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            role,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for MappingFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} file): {}", self.path, self.role, self.reason)
    }
}

impl std::error::Error for MappingFailure {}
