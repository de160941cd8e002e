//! Layered layout: dependents above their dependencies.
//!
//! Phases:
//!   1. Cycle handling: strongly connected components are condensed, so every
//!      member of an import cycle shares one layer
//!   2. Layer assignment: longest path from the sources of the condensed DAG
//!   3. Ordering: barycenter sweeps down and up, ties broken by identifier
//!   4. Coordinates: unit spacing, then normalized

use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::NodeIndex;
use std::collections::{BTreeSet, HashMap};

use super::{Algorithm, LayoutSettings, normalize};
use crate::error::LayoutError;
use crate::graph::DependencyGraph;
use crate::types::{LayoutPositions, Point};

/// Number of barycenter passes (each pass is one sweep down plus one up).
const ORDERING_PASSES: usize = 4;

pub(super) fn layout(
    graph: &DependencyGraph,
    seeded: bool,
    settings: &LayoutSettings,
) -> Result<LayoutPositions, LayoutError> {
    if seeded {
        return Err(LayoutError::Unavailable {
            algorithm: Algorithm::Hierarchical,
            reason: "incremental runs keep existing positions".to_string(),
        });
    }
    if graph.node_count() > settings.hierarchical_max_nodes {
        return Err(LayoutError::Unavailable {
            algorithm: Algorithm::Hierarchical,
            reason: format!(
                "{} nodes exceeds the limit of {}",
                graph.node_count(),
                settings.hierarchical_max_nodes
            ),
        });
    }

    let g = graph.inner();
    let layer_of = assign_layers(graph);
    let layer_count = layer_of.values().max().map_or(0, |&max| max + 1);

    let mut layers: Vec<Vec<NodeIndex>> = vec![Vec::new(); layer_count];
    for (&idx, &layer) in &layer_of {
        layers[layer].push(idx);
    }
    for layer in &mut layers {
        layer.sort_by(|&a, &b| g[a].id.cmp(&g[b].id));
    }

    order_layers(graph, &mut layers);

    let mut positions = LayoutPositions::new();
    for (depth, layer) in layers.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)] // layer sizes are far below 2^52
        let offset = (layer.len() as f64 - 1.0) / 2.0;
        for (i, &idx) in layer.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let point = Point::new(i as f64 - offset, -(depth as f64));
            positions.insert(g[idx].id.clone(), point);
        }
    }

    normalize(&mut positions);
    Ok(positions)
}

/// Longest-path layering over the condensation of the graph.
fn assign_layers(graph: &DependencyGraph) -> HashMap<NodeIndex, usize> {
    let g = graph.inner();
    // tarjan_scc yields components in reverse topological order.
    let mut components = tarjan_scc(g);
    components.reverse();

    let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
    for (c, members) in components.iter().enumerate() {
        for &idx in members {
            component_of.insert(idx, c);
        }
    }

    let mut component_layer = vec![0usize; components.len()];
    for (c, members) in components.iter().enumerate() {
        let successors: BTreeSet<usize> = members
            .iter()
            .flat_map(|&idx| g.neighbors(idx))
            .filter_map(|n| component_of.get(&n).copied())
            .filter(|&s| s != c)
            .collect();
        for s in successors {
            component_layer[s] = component_layer[s].max(component_layer[c] + 1);
        }
    }

    component_of
        .into_iter()
        .map(|(idx, c)| (idx, component_layer[c]))
        .collect()
}

/// Reduce crossings with alternating barycenter sweeps.
fn order_layers(graph: &DependencyGraph, layers: &mut [Vec<NodeIndex>]) {
    if layers.len() < 2 {
        return;
    }
    for _ in 0..ORDERING_PASSES {
        for l in 1..layers.len() {
            sweep(graph, layers, l, l - 1);
        }
        for l in (0..layers.len() - 1).rev() {
            sweep(graph, layers, l, l + 1);
        }
    }
}

/// Reorder `layers[target]` by the mean position of neighbors in
/// `layers[reference]`. Nodes without such neighbors keep their slot value.
fn sweep(graph: &DependencyGraph, layers: &mut [Vec<NodeIndex>], target: usize, reference: usize) {
    let g = graph.inner();
    let slot: HashMap<NodeIndex, usize> = layers[reference]
        .iter()
        .enumerate()
        .map(|(i, &idx)| (idx, i))
        .collect();

    let mut keyed: Vec<(f64, NodeIndex)> = layers[target]
        .iter()
        .enumerate()
        .map(|(i, &idx)| {
            let neighbor_slots: Vec<usize> = g
                .neighbors_undirected(idx)
                .filter_map(|n| slot.get(&n).copied())
                .collect();
            #[allow(clippy::cast_precision_loss)]
            let key = if neighbor_slots.is_empty() {
                i as f64
            } else {
                neighbor_slots.iter().sum::<usize>() as f64 / neighbor_slots.len() as f64
            };
            (key, idx)
        })
        .collect();

    keyed.sort_by(|(ka, a), (kb, b)| ka.total_cmp(kb).then_with(|| g[*a].id.cmp(&g[*b].id)));
    layers[target] = keyed.into_iter().map(|(_, idx)| idx).collect();
}
