//! Node placement for dependency graphs.
//!
//! `LayoutEngine::layout` tries the configured algorithms in order and returns
//! the first result that places every node exactly once. A failing algorithm
//! is logged and skipped; only when all of them fail does the caller see
//! `LayoutError::Exhausted`.
//!
//! | Algorithm | Deterministic | Uses seed positions | Fails when |
//! |-----------|---------------|---------------------|------------|
//! | `hierarchical` | yes | no (declines seeded runs) | too many nodes |
//! | `force` | yes (fixed seed, fixed iterations) | yes | coordinates diverge |
//! | `circular` | yes | no | never in practice |
//! | `manual` | yes | no | never |
//!
//! Fresh layouts are normalized into the `[-1, 1]` square. Seeded force runs
//! keep the seed's coordinate frame so unaffected nodes stay where they were.

mod circular;
mod force;
mod hierarchical;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::graph::DependencyGraph;
use crate::types::{LayoutPositions, NodeId, Point};

/// Layout algorithms in their default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Layered drawing, dependents above their dependencies.
    Hierarchical,
    /// Fruchterman-Reingold spring embedding.
    Force,
    /// Ring ordered by graph traversal.
    Circular,
    /// Ring ordered by identifier; the last resort.
    Manual,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hierarchical => write!(f, "hierarchical"),
            Self::Force => write!(f, "force"),
            Self::Circular => write!(f, "circular"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Tunables for the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LayoutSettings {
    /// Algorithms to try, in order.
    pub algorithms: Vec<Algorithm>,
    /// Hierarchical layout declines graphs larger than this.
    pub hierarchical_max_nodes: usize,
    /// Seed for the force-directed initial placement.
    pub seed: u64,
    /// Force-directed iterations for a fresh layout.
    pub iterations: usize,
    /// Force-directed iterations when settling around seed positions.
    pub incremental_iterations: usize,
    /// Re-run a seeded layout after undo instead of restoring positions verbatim.
    pub settle_after_undo: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            algorithms: vec![
                Algorithm::Hierarchical,
                Algorithm::Force,
                Algorithm::Circular,
                Algorithm::Manual,
            ],
            hierarchical_max_nodes: 400,
            seed: 42,
            iterations: 50,
            incremental_iterations: 30,
            settle_after_undo: false,
        }
    }
}

/// Computes positions with ordered fall-through between algorithms.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    settings: LayoutSettings,
}

impl LayoutEngine {
    /// Create an engine with the given settings.
    #[must_use]
    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    /// The engine's settings.
    #[must_use]
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Place every node of `graph`.
    ///
    /// With `seed` positions, nodes present in both keep their coordinates as
    /// the starting point so the drawing stays stable across edits.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::Exhausted` if every configured algorithm fails.
    pub fn layout(
        &self,
        graph: &DependencyGraph,
        seed: Option<&LayoutPositions>,
    ) -> Result<LayoutPositions, LayoutError> {
        if graph.is_empty() {
            return Ok(LayoutPositions::new());
        }

        let mut attempts = Vec::new();
        for &algorithm in &self.settings.algorithms {
            let result = match algorithm {
                Algorithm::Hierarchical => {
                    hierarchical::layout(graph, seed.is_some(), &self.settings)
                }
                Algorithm::Force => force::layout(graph, seed, &self.settings),
                Algorithm::Circular => Ok(circular::traversal_ring(graph)),
                Algorithm::Manual => Ok(circular::manual_ring(graph)),
            };

            match result.and_then(|positions| check_complete(algorithm, graph, positions)) {
                Ok(positions) => {
                    debug!(
                        %algorithm,
                        nodes = positions.len(),
                        seeded = seed.is_some(),
                        "Layout complete"
                    );
                    return Ok(positions);
                }
                Err(e) => {
                    warn!(%algorithm, error = %e, "Layout algorithm failed, falling back");
                    attempts.push(e);
                }
            }
        }

        Err(LayoutError::Exhausted(attempts))
    }
}

/// Accept a result only if it covers exactly the graph's nodes with finite
/// coordinates.
fn check_complete(
    algorithm: Algorithm,
    graph: &DependencyGraph,
    positions: LayoutPositions,
) -> Result<LayoutPositions, LayoutError> {
    let covers = positions.len() == graph.node_count()
        && positions.keys().all(|id| graph.contains(id.as_str()));
    if !covers {
        return Err(LayoutError::Incomplete {
            algorithm,
            expected: graph.node_count(),
            returned: positions.len(),
        });
    }
    if let Some((node, _)) = positions.iter().find(|(_, p)| !p.is_finite()) {
        return Err(LayoutError::Diverged {
            algorithm,
            node: node.clone(),
        });
    }
    Ok(positions)
}

/// Center positions on the origin and scale them into the `[-1, 1]` square,
/// preserving aspect ratio.
pub(crate) fn normalize(positions: &mut LayoutPositions) {
    let Some(first) = positions.values().next().copied() else {
        return;
    };
    let (mut min, mut max) = (first, first);
    for p in positions.values() {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    let center = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    let half_extent = ((max.x - min.x).max(max.y - min.y)) / 2.0;
    for p in positions.values_mut() {
        *p = if half_extent > f64::EPSILON {
            Point::new((p.x - center.x) / half_extent, (p.y - center.y) / half_extent)
        } else {
            Point::origin()
        };
    }
}

/// Deterministic hash of `(seed, key, salt)` as a 64-bit integer.
pub(crate) fn stable_hash(seed: u64, key: &str, salt: u8) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(key.as_bytes());
    hasher.update([salt]);
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Deterministic pseudo-random value in `[0, 1)` keyed by `(seed, key, salt)`.
#[allow(clippy::cast_precision_loss)] // 53 bits of the hash are plenty
pub(crate) fn unit_random(seed: u64, key: &str, salt: u8) -> f64 {
    (stable_hash(seed, key, salt) >> 11) as f64 / (1u64 << 53) as f64
}

/// Small per-name offset for placing a new node next to a former position.
///
/// Within `[-0.1, 0.1)` horizontally and `[-0.05, 0.05)` vertically, and the
/// same for the same identifier in every run. The two axes come from
/// independent hashes.
#[must_use]
pub fn placement_jitter(id: &NodeId) -> (f64, f64) {
    let dx = (unit_random(0, id.as_str(), 0) - 0.5) * 0.2;
    let dy = (unit_random(0, id.as_str(), 1) - 0.5) * 0.1;
    (dx, dy)
}
