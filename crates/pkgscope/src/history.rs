//! Undo history of graph and layout snapshots.

use tracing::debug;

use crate::graph::DependencyGraph;
use crate::types::LayoutPositions;

/// A copy of the graph and its layout taken before a mutation.
///
/// Snapshots own their data, so later edits to the live graph never reach
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Graph as it was before the mutation.
    pub graph: DependencyGraph,
    /// Positions as they were before the mutation.
    pub positions: LayoutPositions,
}

/// Last-in-first-out stack of snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Snapshot>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a copy of the current state.
    pub fn checkpoint(&mut self, graph: &DependencyGraph, positions: &LayoutPositions) {
        self.entries.push(Snapshot {
            graph: graph.clone(),
            positions: positions.clone(),
        });
        debug!(depth = self.entries.len(), "History checkpoint");
    }

    /// Pop the most recent snapshot, or `None` when the stack is empty.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let snapshot = self.entries.pop();
        if snapshot.is_some() {
            debug!(depth = self.entries.len(), "History popped");
        }
        snapshot
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there is nothing to undo.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every snapshot (on reload).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
