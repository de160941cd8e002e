//! Path-to-identifier mapping for Python source files.
//!
//! Maps analyzer file paths (project-relative, forward-slash) to package and
//! module identifiers. Whether a path is internal or external is decided only
//! by whether it exists under the project root, never by its name.
//!
//! | Path | Exists under root | Identifier |
//! |------|-------------------|------------|
//! | `pkg/mod.py` | yes | `pkg.mod` |
//! | `pkg/__init__.py` | yes | `pkg` |
//! | `__init__.py` | yes | `.` |
//! | `numpy/core.py` | no | `ext:numpy` |

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::graph::DependencyGraph;
use crate::types::NodeId;

/// File name that turns a directory into a Python package.
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Directory names never descended into by package discovery.
const SKIPPED_DIRS: &[&str] = &["venv", "env", "__pycache__"];

/// Normalize an analyzer path to forward-slash form without a leading `./`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let mut trimmed = normalized.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}

/// Maps file paths to identifiers relative to one project root.
#[derive(Debug, Clone)]
pub struct PathMapper {
    root: PathBuf,
}

impl PathMapper {
    /// Create a mapper for the given project root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project root this mapper resolves against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a project-relative file path to its identifier.
    ///
    /// Returns `None` when no path segment can be derived; callers log the
    /// failure and skip the file.
    #[must_use]
    pub fn map_path(&self, path: &str) -> Option<NodeId> {
        let normalized = normalize_path(path);
        let relative = normalized.trim_matches('/');

        if !self.root.join(relative).exists() {
            let segment = relative.split('/').find(|s| !s.is_empty())?;
            return Some(NodeId::external(segment));
        }

        internal_id(relative)
    }

    /// Find the node that currently represents `path` in a (possibly mutated)
    /// graph.
    ///
    /// Tries, in order:
    /// 1. the external identifier, if the path is outside the project
    /// 2. the exact dotted identifier
    /// 3. the closest dotted ancestor present in the graph
    /// 4. the root node `.`, for files without a directory component
    #[must_use]
    pub fn resolve_in_graph(&self, path: &str, graph: &DependencyGraph) -> Option<NodeId> {
        let id = self.map_path(path)?;

        if id.is_external() {
            return graph.contains(id.as_str()).then_some(id);
        }
        if graph.contains(id.as_str()) {
            return Some(id);
        }

        let mut ancestor = id.parent();
        while let Some(candidate) = ancestor {
            if graph.contains(candidate.as_str()) {
                return Some(candidate);
            }
            ancestor = candidate.parent();
        }

        let has_dir = normalize_path(path).trim_matches('/').contains('/');
        if !has_dir && graph.contains(crate::types::ROOT_ID) {
            return Some(NodeId::root());
        }
        None
    }

    /// The directory an internal identifier refers to, if it is one.
    ///
    /// Returns `None` for external identifiers and for identifiers that do not
    /// name an existing directory (leaf modules).
    #[must_use]
    pub fn node_dir(&self, id: &NodeId) -> Option<PathBuf> {
        if id.is_external() {
            return None;
        }
        let dir = id
            .segments()
            .fold(self.root.clone(), |path, segment| path.join(segment));
        dir.is_dir().then_some(dir)
    }

    /// Immediate children of a package directory as identifiers, sorted.
    ///
    /// Sub-directories count when they contain `__init__.py`; `.py` files count
    /// except `__init__.py` itself. Everything else is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub fn list_children(&self, id: &NodeId, dir: &Path) -> std::io::Result<Vec<NodeId>> {
        let mut children = BTreeSet::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                debug!(path = %path.display(), "Skipping non UTF-8 entry");
                continue;
            };

            if path.is_dir() && path.join(PACKAGE_MARKER).is_file() {
                children.insert(id.child(name));
            } else if path.is_file() && name != PACKAGE_MARKER {
                if let Some(stem) = name.strip_suffix(".py").filter(|s| !s.is_empty()) {
                    children.insert(id.child(stem));
                }
            }
        }

        Ok(children.into_iter().collect())
    }
}

/// Identifier of a path known to exist under the project root.
fn internal_id(relative: &str) -> Option<NodeId> {
    let (dir, base) = relative.rsplit_once('/').unwrap_or(("", relative));

    if base == PACKAGE_MARKER {
        if dir.is_empty() {
            return Some(NodeId::root());
        }
        return Some(NodeId::new(dir.replace('/', ".")));
    }

    let stem = relative.strip_suffix(".py").unwrap_or(relative);
    if stem.is_empty() {
        return None;
    }
    Some(NodeId::new(stem.replace('/', ".")))
}

/// Find directories containing `__init__.py` below `root`.
///
/// Returns sorted forward-slash paths relative to `root`, excluding the root
/// itself. Hidden directories and virtual environments are not descended into.
#[must_use]
pub fn discover_packages(root: &Path) -> Vec<String> {
    let mut packages = Vec::new();
    walk_packages(root, root, &mut packages);
    packages.sort();
    debug!(root = %root.display(), found = packages.len(), "Package discovery complete");
    packages
}

fn walk_packages(root: &Path, dir: &Path, packages: &mut Vec<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(
                directory = %dir.display(),
                error = %e,
                "Cannot read directory, skipping"
            );
            return;
        }
    };

    if dir != root && dir.join(PACKAGE_MARKER).is_file() {
        if let Ok(relative) = dir.strip_prefix(root) {
            packages.push(normalize_path(&relative.to_string_lossy()));
        }
    }

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(
                    directory = %dir.display(),
                    error = %e,
                    "Failed to read directory entry, skipping"
                );
                continue;
            }
        };

        let path = entry.path();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name) {
                continue;
            }
        }
        if path.is_dir() {
            walk_packages(root, &path, packages);
        }
    }
}
