//! Fruchterman-Reingold force-directed placement.
//!
//! Edges are treated as undirected springs. Fresh runs start from a
//! deterministic pseudo-random placement keyed by the configured seed; seeded
//! runs start from the given positions with a lower temperature so existing
//! nodes only drift slightly while new ones settle.

use std::collections::HashMap;

use super::{Algorithm, LayoutSettings, normalize, unit_random};
use crate::error::LayoutError;
use crate::graph::DependencyGraph;
use crate::types::{LayoutPositions, NodeId, Point};

/// Distances are clamped to this to keep repulsion finite.
const MIN_DISTANCE: f64 = 0.01;

/// Initial temperature as a fraction of the layout span (fresh runs).
const FRESH_TEMPERATURE: f64 = 0.1;

/// Initial temperature as a fraction of the layout span (seeded runs).
const SEEDED_TEMPERATURE: f64 = 0.05;

/// Spread of new nodes around the seed centroid in seeded runs.
const NEW_NODE_SPREAD: f64 = 0.1;

#[allow(clippy::cast_precision_loss)] // node counts are far below 2^52
pub(super) fn layout(
    graph: &DependencyGraph,
    seed: Option<&LayoutPositions>,
    settings: &LayoutSettings,
) -> Result<LayoutPositions, LayoutError> {
    let ids: Vec<NodeId> = graph.node_ids().into_iter().cloned().collect();
    let n = ids.len();

    let mut pos = initial_positions(&ids, seed, settings.seed);
    if n < 2 {
        let mut positions: LayoutPositions = ids.into_iter().zip(pos).collect();
        if seed.is_none() {
            normalize(&mut positions);
        }
        return Ok(positions);
    }

    let slot: HashMap<&NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
    let springs: Vec<(usize, usize)> = graph
        .edges()
        .into_iter()
        .filter_map(|(a, b)| Some((*slot.get(a)?, *slot.get(b)?)))
        .collect();

    let (k, iterations, temperature) = match seed {
        Some(_) => (
            0.8 / (n as f64).sqrt(),
            settings.incremental_iterations,
            SEEDED_TEMPERATURE,
        ),
        None => (
            1.0 / (n as f64).sqrt(),
            settings.iterations,
            FRESH_TEMPERATURE,
        ),
    };

    let mut t = span(&pos) * temperature;
    let dt = t / (iterations as f64 + 1.0);

    for _ in 0..iterations {
        let mut disp = vec![Point::origin(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy, dist) = match delta(pos[i], pos[j]) {
                    (dx, dy, _) if dx.hypot(dy) < MIN_DISTANCE => {
                        separation(&ids[i], &ids[j], settings.seed)
                    }
                    d => d,
                };
                let force = k * k / dist;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                disp[i] = disp[i].offset(fx, fy);
                disp[j] = disp[j].offset(-fx, -fy);
            }
        }

        for &(a, b) in &springs {
            let (dx, dy, dist) = delta(pos[a], pos[b]);
            let force = dist * dist / k;
            let (fx, fy) = (dx / dist * force, dy / dist * force);
            disp[a] = disp[a].offset(-fx, -fy);
            disp[b] = disp[b].offset(fx, fy);
        }

        for (p, d) in pos.iter_mut().zip(&disp) {
            let length = (d.x * d.x + d.y * d.y).sqrt();
            if length > 0.0 {
                let step = length.min(t) / length;
                *p = p.offset(d.x * step, d.y * step);
            }
        }

        t -= dt;
    }

    if let Some((i, _)) = pos.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(LayoutError::Diverged {
            algorithm: Algorithm::Force,
            node: ids[i].clone(),
        });
    }

    let mut positions: LayoutPositions = ids.into_iter().zip(pos).collect();
    if seed.is_none() {
        normalize(&mut positions);
    }
    Ok(positions)
}

/// Starting coordinates: seed positions where known, otherwise deterministic
/// pseudo-random placement (around the seed centroid in seeded runs).
fn initial_positions(ids: &[NodeId], seed: Option<&LayoutPositions>, rng_seed: u64) -> Vec<Point> {
    let random = |id: &NodeId| {
        Point::new(
            unit_random(rng_seed, id.as_str(), 0),
            unit_random(rng_seed, id.as_str(), 1),
        )
    };

    let Some(seed) = seed.filter(|s| !s.is_empty()) else {
        return ids.iter().map(random).collect();
    };

    #[allow(clippy::cast_precision_loss)]
    let count = seed.len() as f64;
    let centroid = seed.values().fold(Point::origin(), |acc, p| {
        acc.offset(p.x / count, p.y / count)
    });

    ids.iter()
        .map(|id| {
            seed.get(id).copied().unwrap_or_else(|| {
                let r = random(id);
                centroid.offset(
                    (r.x - 0.5) * NEW_NODE_SPREAD,
                    (r.y - 0.5) * NEW_NODE_SPREAD,
                )
            })
        })
        .collect()
}

/// Vector from `b` to `a` and its (clamped) length.
fn delta(a: Point, b: Point) -> (f64, f64, f64) {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
    (dx, dy, dist)
}

/// Repulsion vector for two nodes closer than `MIN_DISTANCE`, in a direction
/// fixed by their identifiers so coincident nodes always split apart.
fn separation(a: &NodeId, b: &NodeId, rng_seed: u64) -> (f64, f64, f64) {
    let angle = unit_random(rng_seed, &format!("{a}\0{b}"), 2) * std::f64::consts::TAU;
    (
        angle.cos() * MIN_DISTANCE,
        angle.sin() * MIN_DISTANCE,
        MIN_DISTANCE,
    )
}

/// Larger side of the bounding box, or 1.0 for degenerate layouts.
fn span(points: &[Point]) -> f64 {
    let Some(first) = points.first() else {
        return 1.0;
    };
    let (mut min, mut max) = (*first, *first);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let extent = (max.x - min.x).max(max.y - min.y);
    if extent > f64::EPSILON { extent } else { 1.0 }
}
