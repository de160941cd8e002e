//! Drawable description of the current graph.
//!
//! A `Scene` is what a rendering backend needs and nothing more: one entry per
//! node with label, color and size, one entry per edge with color and width,
//! and the tooltip for the hovered node. It is rebuilt from the session state
//! before every draw.
//!
//! Colors follow the selection:
//!
//! | Node | Color |
//! |------|-------|
//! | selected | `orange` |
//! | dependency of selected | `red` |
//! | dependent of selected | `blue` |
//! | other internal | `#1f78b4` |
//! | other external | `#7f007f` |

use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::selection::SelectionState;
use crate::types::{LayoutPositions, NodeId, Point};

/// Smallest node size.
pub const MIN_NODE_SIZE: f64 = 1000.0;

/// Largest node size.
pub const MAX_NODE_SIZE: f64 = 10000.0;

/// Highlight role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    /// Internal node, not related to the selection.
    Internal,
    /// External node, not related to the selection.
    External,
    /// The selected node.
    Selected,
    /// A node the selected node depends on.
    Dependency,
    /// A node that depends on the selected node.
    Dependent,
}

impl NodeRole {
    /// Fill color for this role.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Internal => "#1f78b4",
            Self::External => "#7f007f",
            Self::Selected => "orange",
            Self::Dependency => "red",
            Self::Dependent => "blue",
        }
    }
}

/// Highlight role of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeRole {
    /// Not touching the selection.
    Normal,
    /// Leaves the selected node.
    Outgoing,
    /// Enters the selected node.
    Incoming,
}

impl EdgeRole {
    /// Stroke color for this role.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Normal => "black",
            Self::Outgoing => "red",
            Self::Incoming => "blue",
        }
    }

    /// Stroke width for this role.
    #[must_use]
    pub fn width(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Outgoing | Self::Incoming => 2.0,
        }
    }
}

/// One node to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    /// Full identifier.
    pub id: NodeId,
    /// Shortened label.
    pub label: String,
    /// Layout coordinate.
    pub position: Point,
    /// Pixel coordinate in the viewport the scene was built for.
    pub screen: Point,
    /// Highlight role.
    pub role: NodeRole,
    /// Fill color.
    pub color: &'static str,
    /// Marker size, grows with the label.
    pub size: f64,
    /// Whether the node is outside the project.
    pub is_external: bool,
}

/// One edge to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneEdge {
    /// Dependent end.
    pub from: NodeId,
    /// Dependency end.
    pub to: NodeId,
    /// Highlight role.
    pub role: EdgeRole,
    /// Stroke color.
    pub color: &'static str,
    /// Stroke width.
    pub width: f64,
}

/// Everything a drawing backend needs for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    /// Nodes in identifier order.
    pub nodes: Vec<SceneNode>,
    /// Edges in `(from, to)` order.
    pub edges: Vec<SceneEdge>,
    /// Full identifier of the hovered node.
    pub tooltip: Option<String>,
}

impl Scene {
    /// Build a scene for `viewport`. Nodes without a position are left out.
    #[must_use]
    pub fn build(
        graph: &DependencyGraph,
        positions: &LayoutPositions,
        selection: &SelectionState,
        viewport: &Viewport,
    ) -> Self {
        let transform = viewport.fit(positions);
        let mut selection = selection.clone();
        selection.validate(graph);
        let selected = selection.selected();

        let (dependencies, dependents) = selected.map_or_else(
            || (Vec::new(), Vec::new()),
            |id| (graph.dependencies(id.as_str()), graph.dependents(id.as_str())),
        );

        let nodes = graph
            .nodes()
            .into_iter()
            .filter_map(|node| {
                let position = *positions.get(&node.id)?;
                let role = if Some(&node.id) == selected {
                    NodeRole::Selected
                } else if dependencies.contains(&&node.id) {
                    NodeRole::Dependency
                } else if dependents.contains(&&node.id) {
                    NodeRole::Dependent
                } else if node.is_external {
                    NodeRole::External
                } else {
                    NodeRole::Internal
                };
                let label = node.id.label();
                Some(SceneNode {
                    size: node_size(&node.id.short_form()),
                    id: node.id.clone(),
                    label,
                    position,
                    screen: transform.to_screen(position),
                    role,
                    color: role.color(),
                    is_external: node.is_external,
                })
            })
            .collect();

        let edges = graph
            .edges()
            .into_iter()
            .map(|(from, to)| {
                let role = if Some(from) == selected {
                    EdgeRole::Outgoing
                } else if Some(to) == selected {
                    EdgeRole::Incoming
                } else {
                    EdgeRole::Normal
                };
                SceneEdge {
                    from: from.clone(),
                    to: to.clone(),
                    role,
                    color: role.color(),
                    width: role.width(),
                }
            })
            .collect();

        let tooltip = selection.hovered().map(ToString::to_string);

        Self {
            nodes,
            edges,
            tooltip,
        }
    }

    /// Look up a node by identifier.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }
}

/// Marker size for a shortened identifier: `1000 + 100 * len`, clamped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn node_size(label: &str) -> f64 {
    (MIN_NODE_SIZE + 100.0 * label.chars().count() as f64).clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
}

// ============================================================================
// Screen space
// ============================================================================

/// Pixel area the layout is drawn into. Screen `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Blank border on every side.
    pub margin: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margin: 40.0,
        }
    }
}

/// Affine map from layout space to screen space for one layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    center: Point,
    scale: f64,
    screen_center: Point,
}

impl ScreenTransform {
    /// Screen coordinate of a layout point.
    #[must_use]
    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(
            self.screen_center.x + (p.x - self.center.x) * self.scale,
            self.screen_center.y - (p.y - self.center.y) * self.scale,
        )
    }
}

impl Viewport {
    /// Fit the bounding box of `positions` into the viewport, keeping the
    /// aspect ratio.
    #[must_use]
    pub fn fit(&self, positions: &LayoutPositions) -> ScreenTransform {
        let screen_center = Point::new(self.width / 2.0, self.height / 2.0);
        let Some(first) = positions.values().next().copied() else {
            return ScreenTransform {
                center: Point::origin(),
                scale: 1.0,
                screen_center,
            };
        };

        let (mut min, mut max) = (first, first);
        for p in positions.values() {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        let available_x = (self.width - 2.0 * self.margin).max(1.0);
        let available_y = (self.height - 2.0 * self.margin).max(1.0);
        let extent_x = max.x - min.x;
        let extent_y = max.y - min.y;

        let scale = match (extent_x > f64::EPSILON, extent_y > f64::EPSILON) {
            (true, true) => (available_x / extent_x).min(available_y / extent_y),
            (true, false) => available_x / extent_x,
            (false, true) => available_y / extent_y,
            (false, false) => 1.0,
        };

        ScreenTransform {
            center: Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0),
            scale,
            screen_center,
        }
    }
}

/// The node nearest to screen point `(x, y)` within `radius_px`, if any.
#[must_use]
pub fn hit_test(
    positions: &LayoutPositions,
    viewport: &Viewport,
    x: f64,
    y: f64,
    radius_px: f64,
) -> Option<NodeId> {
    let transform = viewport.fit(positions);
    let cursor = Point::new(x, y);
    let threshold = radius_px * radius_px;

    positions
        .iter()
        .map(|(id, p)| (id, transform.to_screen(*p).distance_sq(cursor)))
        .filter(|(_, d)| *d < threshold)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DependencyGraph, LayoutPositions) {
        let mut graph = DependencyGraph::new();
        for id in ["app", "core", "util", "ext:numpy"] {
            graph.add_node(NodeId::from(id));
        }
        graph.add_edge("app", "core");
        graph.add_edge("core", "util");
        graph.add_edge("core", "ext:numpy");

        let positions = [
            ("app", Point::new(0.0, 1.0)),
            ("core", Point::new(0.0, 0.0)),
            ("util", Point::new(-1.0, -1.0)),
            ("ext:numpy", Point::new(1.0, -1.0)),
        ]
        .into_iter()
        .map(|(id, p)| (NodeId::from(id), p))
        .collect();

        (graph, positions)
    }

    #[test]
    fn colors_follow_selection() {
        let (graph, positions) = sample();
        let mut selection = SelectionState::new();
        selection.select(Some(NodeId::from("core")));

        let scene = Scene::build(&graph, &positions, &selection, &Viewport::default());

        let color = |id: &str| scene.node(id).map(|n| n.color);
        assert_eq!(color("core"), Some("orange"));
        assert_eq!(color("util"), Some("red"));
        assert_eq!(color("ext:numpy"), Some("red"));
        assert_eq!(color("app"), Some("blue"));

        let outgoing = scene
            .edges
            .iter()
            .filter(|e| e.role == EdgeRole::Outgoing)
            .count();
        assert_eq!(outgoing, 2);
        assert!(scene.edges.iter().all(|e| e.role == EdgeRole::Normal || e.width == 2.0));
    }

    #[test]
    fn default_colors_without_selection() {
        let (graph, positions) = sample();

        let scene = Scene::build(&graph, &positions, &SelectionState::new(), &Viewport::default());

        assert_eq!(scene.node("app").map(|n| n.color), Some("#1f78b4"));
        assert_eq!(scene.node("ext:numpy").map(|n| n.color), Some("#7f007f"));
        assert_eq!(scene.node("ext:numpy").map(|n| n.label.as_str()), Some("numpy"));
        assert!(scene.edges.iter().all(|e| e.color == "black" && e.width == 1.0));
    }

    #[test]
    fn tooltip_shows_full_identifier_of_hovered_node() {
        let mut graph = DependencyGraph::new();
        graph.add_node(NodeId::from("a.b.c.d.e"));
        let positions = [(NodeId::from("a.b.c.d.e"), Point::origin())]
            .into_iter()
            .collect();
        let mut selection = SelectionState::new();
        selection.hover(Some(NodeId::from("a.b.c.d.e")));

        let scene = Scene::build(&graph, &positions, &selection, &Viewport::default());

        assert_eq!(scene.tooltip.as_deref(), Some("a.b.c.d.e"));
        assert_eq!(scene.nodes[0].label, "a...d.e");
    }

    #[test]
    fn external_markers_are_sized_by_full_identifier() {
        let (graph, positions) = sample();

        let scene = Scene::build(&graph, &positions, &SelectionState::new(), &Viewport::default());

        assert_eq!(scene.node("ext:numpy").map(|n| n.size), Some(1900.0));
        assert_eq!(scene.node("core").map(|n| n.size), Some(1400.0));
    }

    #[test]
    fn stale_selection_and_hover_are_ignored() {
        let (graph, positions) = sample();
        let mut selection = SelectionState::new();
        selection.select(Some(NodeId::from("gone")));
        selection.hover(Some(NodeId::from("gone")));

        let scene = Scene::build(&graph, &positions, &selection, &Viewport::default());

        assert!(scene.nodes.iter().all(|n| n.role != NodeRole::Selected));
        assert!(scene.edges.iter().all(|e| e.role == EdgeRole::Normal));
        assert_eq!(scene.tooltip, None);
    }

    #[test]
    fn node_size_is_clamped() {
        assert_eq!(node_size(""), 1000.0);
        assert_eq!(node_size("abcd"), 1400.0);
        assert_eq!(node_size(&"x".repeat(200)), 10000.0);
    }

    #[test]
    fn screen_y_grows_downward() {
        let (_, positions) = sample();
        let viewport = Viewport::default();
        let transform = viewport.fit(&positions);

        let top = transform.to_screen(positions[&NodeId::from("app")]);
        let bottom = transform.to_screen(positions[&NodeId::from("util")]);

        assert!(top.y < bottom.y);
        assert!((top.y - viewport.margin).abs() < 1e-9);
    }

    #[test]
    fn hit_test_finds_nearest_node_within_radius() {
        let (_, positions) = sample();
        let viewport = Viewport::default();
        let center = viewport.fit(&positions).to_screen(Point::origin());

        let hit = hit_test(&positions, &viewport, center.x + 10.0, center.y, 30.0);
        let miss = hit_test(&positions, &viewport, center.x + 100.0, center.y, 30.0);

        assert_eq!(hit, Some(NodeId::from("core")));
        assert_eq!(miss, None);
    }
}
