//! Domain types shared by every stage of the pipeline.
//!
//! - **Identifiers**: `NodeId` names a graph node. Internal identifiers are dotted
//!   paths relative to the project root (`pkg_a.sub_b`, or `.` for the root
//!   itself); external identifiers carry the `ext:` prefix (`ext:numpy`).
//! - **Geometry**: `Point` and `LayoutPositions`.
//! - **Ground truth**: `RawDependencyMap`, the file-to-file edge list produced by
//!   the analyzer for one load cycle.
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Identifier | Newtype over `String` | Kind checks live in one place |
//! | Position map | `BTreeMap` | Deterministic iteration for layout and tests |
//! | Raw map | `BTreeMap` keyed by file | Stable processing order across runs |

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Prefix marking identifiers of dependencies outside the project root.
pub const EXTERNAL_PREFIX: &str = "ext:";

/// Identifier of the node representing the project root package.
pub const ROOT_ID: &str = ".";

/// Internal labels with this many dotted segments or more are shortened.
pub const LABEL_MAX_SEGMENTS: usize = 4;

/// External labels (prefix stripped) with this many segments or more are shortened.
pub const EXTERNAL_LABEL_MAX_SEGMENTS: usize = 2;

/// Mapping from project-relative source file to the files it depends on.
pub type RawDependencyMap = BTreeMap<String, Vec<String>>;

/// Mapping from node identifier to its 2D layout coordinate.
pub type LayoutPositions = BTreeMap<NodeId, Point>;

// ============================================================================
// Identifiers
// ============================================================================

/// Canonical name of a graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an identifier string as-is.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier of an external dependency named by its top-level segment.
    #[must_use]
    pub fn external(segment: &str) -> Self {
        Self(format!("{EXTERNAL_PREFIX}{segment}"))
    }

    /// Identifier of the project root package.
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `ext:`-prefixed identifiers.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.0.starts_with(EXTERNAL_PREFIX)
    }

    /// Returns `true` for the project root identifier `.`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    /// Dotted segments of an internal identifier.
    ///
    /// External identifiers yield their name without the prefix; the root
    /// yields nothing.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        let body = self.0.strip_prefix(EXTERNAL_PREFIX).unwrap_or(&self.0);
        body.split('.').filter(|s| !s.is_empty())
    }

    /// The first-segment form used by top-level collapsing.
    ///
    /// External identifiers and the root pass through unchanged.
    #[must_use]
    pub fn top_level(&self) -> Self {
        if self.is_external() || self.is_root() {
            return self.clone();
        }
        match self.0.split_once('.') {
            Some((first, _)) => Self(first.to_string()),
            None => self.clone(),
        }
    }

    /// Identifier of a direct child package or module named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{name}", self.0))
        }
    }

    /// Identifier with the trailing segment removed, if any remains.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_external() || self.is_root() {
            return None;
        }
        self.0
            .rsplit_once('.')
            .map(|(parent, _)| Self(parent.to_string()))
    }

    /// Shortened display label for drawing.
    ///
    /// Internal identifiers with four or more segments become `first...last2`;
    /// external identifiers lose their `ext:` prefix and are shortened at two
    /// segments.
    #[must_use]
    pub fn label(&self) -> String {
        match self.0.strip_prefix(EXTERNAL_PREFIX) {
            Some(name) => truncate_label(name, EXTERNAL_LABEL_MAX_SEGMENTS),
            None => truncate_label(&self.0, LABEL_MAX_SEGMENTS),
        }
    }

    /// The full identifier, `ext:` prefix included, shortened at four
    /// segments. Marker sizes are measured on this form.
    #[must_use]
    pub fn short_form(&self) -> String {
        truncate_label(&self.0, LABEL_MAX_SEGMENTS)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shorten a dotted label to `first...last2` once it has `max_segments` parts.
///
/// Labels with fewer segments are returned unchanged.
#[must_use]
pub fn truncate_label(label: &str, max_segments: usize) -> String {
    let parts: Vec<&str> = label.split('.').collect();
    if parts.len() >= max_segments && parts.len() >= 3 {
        let tail = parts[parts.len() - 2..].join(".");
        format!("{}...{tail}", parts[0])
    } else {
        label.to_string()
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// A 2D coordinate in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin.
    #[must_use]
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// This point shifted by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Squared euclidean distance to `other`.
    #[must_use]
    pub fn distance_sq(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Returns `true` when both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
