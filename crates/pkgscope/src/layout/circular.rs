//! Ring layouts. Neither can fail, so they close the fallback chain.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use crate::graph::DependencyGraph;
use crate::types::{LayoutPositions, NodeId, Point};

/// Nodes on the unit circle in depth-first order over undirected neighbors,
/// so connected nodes sit next to each other.
pub(super) fn traversal_ring(graph: &DependencyGraph) -> LayoutPositions {
    let mut visited: BTreeSet<&NodeId> = BTreeSet::new();
    let mut order: Vec<NodeId> = Vec::with_capacity(graph.node_count());

    for start in graph.node_ids() {
        if visited.contains(start) {
            continue;
        }
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id.clone());

            let mut neighbors: Vec<&NodeId> = graph
                .dependencies(id.as_str())
                .into_iter()
                .chain(graph.dependents(id.as_str()))
                .filter(|n| !visited.contains(n))
                .collect();
            // Reverse-sorted so the smallest identifier is popped first.
            neighbors.sort_unstable_by(|a, b| b.cmp(a));
            neighbors.dedup();
            stack.extend(neighbors);
        }
    }

    ring(order)
}

/// Nodes on the unit circle in identifier order.
pub(super) fn manual_ring(graph: &DependencyGraph) -> LayoutPositions {
    ring(graph.node_ids().into_iter().cloned().collect())
}

#[allow(clippy::cast_precision_loss)]
fn ring(order: Vec<NodeId>) -> LayoutPositions {
    if order.len() == 1 {
        return order.into_iter().map(|id| (id, Point::origin())).collect();
    }
    let step = TAU / order.len() as f64;
    order
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            let angle = step * i as f64;
            (id, Point::new(angle.cos(), angle.sin()))
        })
        .collect()
}
