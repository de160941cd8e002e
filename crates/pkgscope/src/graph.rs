//! Package-level dependency graph.
//!
//! Edges point from **dependent to dependency**: `u -> v` means `u` imports `v`.
//!
//! The graph is backed by petgraph's `StableDiGraph` so that node indices stay
//! valid across the removals performed by explode and delete, plus an
//! identifier-to-index map for O(1) lookups. Every node in `node_map` exists in
//! `graph` and vice versa.
//!
//! Invariants enforced here rather than by callers:
//! - no self-loops
//! - no duplicate edges
//! - both endpoints of an edge exist as nodes

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::{BTreeSet, HashMap};

use crate::types::NodeId;

/// Node payload: the identifier and its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Canonical identifier.
    pub id: NodeId,
    /// `true` for dependencies outside the project root.
    pub is_external: bool,
}

/// Directed package dependency graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: StableDiGraph<GraphNode, ()>,
    node_map: HashMap<NodeId, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns `true` if a node with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Look up a node's payload.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_map.get(id).map(|&idx| &self.graph[idx])
    }

    /// Returns `true` if the node exists and is external.
    #[must_use]
    pub fn is_external(&self, id: &str) -> bool {
        self.node(id).is_some_and(|n| n.is_external)
    }

    /// Add a node, deriving `is_external` from the identifier.
    ///
    /// Returns `false` if the node already existed.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        if self.node_map.contains_key(&id) {
            return false;
        }
        let is_external = id.is_external();
        let idx = self.graph.add_node(GraphNode {
            id: id.clone(),
            is_external,
        });
        self.node_map.insert(id, idx);
        true
    }

    /// Remove a node and all incident edges.
    ///
    /// Returns `false` if the node did not exist.
    pub fn remove_node(&mut self, id: &str) -> bool {
        match self.node_map.remove(id) {
            Some(idx) => {
                self.graph.remove_node(idx);
                true
            }
            None => false,
        }
    }

    /// Add the edge `from -> to`.
    ///
    /// Returns `false` (and changes nothing) for self-loops, missing endpoints
    /// and edges that already exist.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        let (Some(&a), Some(&b)) = (self.node_map.get(from), self.node_map.get(to)) else {
            return false;
        };
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    /// Returns `true` if the edge `from -> to` exists.
    #[must_use]
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.node_map.get(from), self.node_map.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Remove every edge, keeping all nodes.
    pub fn clear_edges(&mut self) {
        self.graph.retain_edges(|_, _| false);
    }

    /// Node identifiers in sorted order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<&NodeId> = self.node_map.keys().collect();
        ids.sort();
        ids
    }

    /// Node payloads in sorted identifier order.
    #[must_use]
    pub fn nodes(&self) -> Vec<&GraphNode> {
        let mut nodes: Vec<&GraphNode> = self.graph.node_weights().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Edges as `(dependent, dependency)` pairs in sorted order.
    #[must_use]
    pub fn edges(&self) -> Vec<(&NodeId, &NodeId)> {
        let mut edges: Vec<(&NodeId, &NodeId)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (&self.graph[a].id, &self.graph[b].id))
            .collect();
        edges.sort();
        edges
    }

    /// Owned set of node identifiers, for structural comparison.
    #[must_use]
    pub fn node_set(&self) -> BTreeSet<NodeId> {
        self.node_map.keys().cloned().collect()
    }

    /// Owned set of edges, for structural comparison.
    #[must_use]
    pub fn edge_set(&self) -> BTreeSet<(NodeId, NodeId)> {
        self.edges()
            .into_iter()
            .map(|(a, b)| (a.clone(), b.clone()))
            .collect()
    }

    /// Nodes that `id` depends on (outgoing neighbors), sorted.
    #[must_use]
    pub fn dependencies(&self, id: &str) -> Vec<&NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Nodes that depend on `id` (incoming neighbors), sorted.
    #[must_use]
    pub fn dependents(&self, id: &str) -> Vec<&NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&NodeId> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<&NodeId> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| &self.graph[n].id)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Nodes with no incident edges, sorted.
    #[must_use]
    pub fn isolated_nodes(&self) -> Vec<&NodeId> {
        let mut isolated: Vec<&NodeId> = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_undirected(idx).next().is_none())
            .map(|idx| &self.graph[idx].id)
            .collect();
        isolated.sort();
        isolated
    }

    /// The underlying petgraph structure, for layout algorithms.
    pub(crate) fn inner(&self) -> &StableDiGraph<GraphNode, ()> {
        &self.graph
    }
}

impl PartialEq for DependencyGraph {
    /// Structural equality: same nodes (with kinds) and same edges.
    fn eq(&self, other: &Self) -> bool {
        self.nodes() == other.nodes() && self.edges() == other.edges()
    }
}

impl Eq for DependencyGraph {}
