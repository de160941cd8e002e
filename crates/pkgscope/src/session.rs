//! Interactive session state.
//!
//! A `Session` owns everything one open project needs: the ground-truth
//! dependency map from the last load, the current graph and layout, the undo
//! history and the selection. Shells hold a `Session` and forward user actions
//! to it; they keep no graph logic of their own.
//!
//! Every operation either completes or leaves the session exactly as it was.
//! Fallible work (analysis, graph building, layout) happens on copies, and the
//! result is committed only after the last step has succeeded.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::analyzer::{Analyzer, TachAnalyzer};
use crate::builder::build_graph;
use crate::config::Config;
use crate::error::{
    ExplodeError, LayoutError, LoadError, MappingFailure, NotFoundError, NothingToUndo,
};
use crate::graph::DependencyGraph;
use crate::history::History;
use crate::layout::{LayoutEngine, placement_jitter};
use crate::mapper::PathMapper;
use crate::scene::{self, Scene, Viewport};
use crate::selection::{ClickEvent, ClickTracker, MouseButton, SelectionState};
use crate::types::{LayoutPositions, NodeId, Point, RawDependencyMap};

/// Where new children go when the exploded node had no position.
pub const FALLBACK_POSITION: Point = Point::new(0.5, 0.5);

/// Summary of a successful load.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Project root that was analyzed.
    pub root: PathBuf,
    /// Source files in the analyzer output.
    pub files: usize,
    /// Nodes in the new graph.
    pub nodes: usize,
    /// Edges in the new graph.
    pub edges: usize,
    /// External nodes in the new graph.
    pub external: usize,
    /// Files whose paths could not be mapped.
    pub mapping_failures: Vec<MappingFailure>,
}

/// What a resolved click did.
#[derive(Debug)]
pub enum Interaction {
    /// Selection changed; holds the new selection.
    Selected(Option<NodeId>),
    /// A node was deleted.
    Deleted(NodeId),
    /// A node was exploded into the given children.
    Exploded {
        /// The removed node.
        node: NodeId,
        /// Its children, now in the graph.
        children: Vec<NodeId>,
    },
    /// An explode was refused or failed; nothing changed.
    ExplodeFailed {
        /// The node that was double-clicked.
        node: NodeId,
        /// Why it was not exploded.
        error: ExplodeError,
    },
    /// The click hit no node and had no effect.
    Missed,
}

/// Ground truth retained from the last load.
#[derive(Debug, Clone)]
struct GroundTruth {
    mapper: PathMapper,
    raw: RawDependencyMap,
}

/// One open project.
pub struct Session {
    config: Config,
    analyzer: Box<dyn Analyzer>,
    layout: LayoutEngine,
    ground_truth: Option<GroundTruth>,
    graph: DependencyGraph,
    positions: LayoutPositions,
    history: History,
    selection: SelectionState,
    clicks: ClickTracker,
    viewport: Viewport,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("root", &self.root())
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("history", &self.history.len())
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an empty session with a custom analyzer.
    #[must_use]
    pub fn new(config: Config, analyzer: Box<dyn Analyzer>) -> Self {
        Self {
            layout: LayoutEngine::new(config.layout.clone()),
            clicks: ClickTracker::new(&config.interaction),
            config,
            analyzer,
            ground_truth: None,
            graph: DependencyGraph::new(),
            positions: LayoutPositions::new(),
            history: History::new(),
            selection: SelectionState::new(),
            viewport: Viewport::default(),
        }
    }

    /// Create an empty session that analyzes projects with `tach`.
    #[must_use]
    pub fn with_tach(config: Config) -> Self {
        let analyzer = TachAnalyzer::new(config.analyzer.clone());
        Self::new(config, Box::new(analyzer))
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Analyze `root` and replace the session state with the result.
    ///
    /// On failure the previous graph, layout and history are kept.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the root is not a directory, the analyzer fails,
    /// or no layout can be computed.
    pub fn load(&mut self, root: &Path) -> Result<LoadReport, LoadError> {
        if !root.is_dir() {
            return Err(LoadError::InvalidRoot(root.to_path_buf()));
        }
        let raw = self.analyzer.dependency_map(root, &self.config.exclude)?;
        self.load_from_raw(root, raw)
    }

    /// Replace the session state with a graph built from an already obtained
    /// dependency map.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the root is not a directory or no layout can be
    /// computed.
    pub fn load_from_raw(
        &mut self,
        root: &Path,
        raw: RawDependencyMap,
    ) -> Result<LoadReport, LoadError> {
        if !root.is_dir() {
            return Err(LoadError::InvalidRoot(root.to_path_buf()));
        }

        let mapper = PathMapper::new(root);
        let outcome = build_graph(&raw, &mapper, self.config.collapse_to_top_level);
        let positions = self.layout.layout(&outcome.graph, None)?;

        let report = LoadReport {
            root: root.to_path_buf(),
            files: raw.len(),
            nodes: outcome.graph.node_count(),
            edges: outcome.graph.edge_count(),
            external: outcome.graph.nodes().iter().filter(|n| n.is_external).count(),
            mapping_failures: outcome.failures,
        };

        self.ground_truth = Some(GroundTruth { mapper, raw });
        self.graph = outcome.graph;
        self.positions = positions;
        self.reset_interaction();

        info!(
            root = %report.root.display(),
            nodes = report.nodes,
            edges = report.edges,
            skipped_files = report.mapping_failures.len(),
            "Project loaded"
        );
        Ok(report)
    }

    /// Show `graph` with a fresh layout and no ground truth.
    ///
    /// Explode is unavailable until the next load; delete and undo work.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError` if no layout can be computed.
    pub fn replace_graph(&mut self, graph: DependencyGraph) -> Result<(), LayoutError> {
        let positions = self.layout.layout(&graph, None)?;
        self.ground_truth = None;
        self.graph = graph;
        self.positions = positions;
        self.reset_interaction();
        Ok(())
    }

    fn reset_interaction(&mut self) {
        self.history.clear();
        self.selection.clear();
        self.clicks = ClickTracker::new(&self.config.interaction);
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Replace a package node with its immediate sub-packages and modules.
    ///
    /// All edges are re-derived from the file-level ground truth and the
    /// layout is settled around the former positions. Returns the children now
    /// in the graph.
    ///
    /// # Errors
    ///
    /// Returns `ExplodeError` and changes nothing when the node cannot be
    /// exploded or settling the layout fails.
    pub fn explode(&mut self, id: &str) -> Result<Vec<NodeId>, ExplodeError> {
        let Some(truth) = &self.ground_truth else {
            return Err(ExplodeError::MissingGroundTruth);
        };
        let Some(node) = self.graph.node(id).map(|n| n.id.clone()) else {
            return Err(ExplodeError::NotFound(NodeId::from(id)));
        };
        if node.is_external() {
            return Err(ExplodeError::IsExternal(node));
        }
        let Some(dir) = truth.mapper.node_dir(&node) else {
            return Err(ExplodeError::NotExpandable(node));
        };
        let children = truth
            .mapper
            .list_children(&node, &dir)
            .map_err(|source| ExplodeError::Io {
                node: node.clone(),
                source,
            })?;
        if children.is_empty() {
            return Err(ExplodeError::NoChildren(node));
        }

        let former = self.positions.get(&node).copied();
        let mut graph = self.graph.clone();
        let mut positions = self.positions.clone();
        graph.remove_node(id);
        positions.remove(id);

        for child in &children {
            if !graph.add_node(child.clone()) {
                warn!(node = %node, child = %child, "Child already in graph, keeping existing node");
                continue;
            }
            let start = former.map_or(FALLBACK_POSITION, |p| {
                let (dx, dy) = placement_jitter(child);
                p.offset(dx, dy)
            });
            positions.insert(child.clone(), start);
        }

        let edges = rewire(&mut graph, &truth.raw, &truth.mapper);
        positions.retain(|id, _| graph.contains(id.as_str()));
        let positions = self.layout.layout(&graph, Some(&positions))?;

        self.history.checkpoint(&self.graph, &self.positions);
        self.graph = graph;
        self.positions = positions;
        self.selection.clear();

        info!(node = %node, children = children.len(), edges, "Exploded node");
        Ok(children)
    }

    /// Remove a node and its edges. Remaining positions are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError` if the node is not in the graph.
    pub fn delete(&mut self, id: &str) -> Result<(), NotFoundError> {
        if !self.graph.contains(id) {
            return Err(NotFoundError(NodeId::from(id)));
        }

        self.history.checkpoint(&self.graph, &self.positions);
        self.graph.remove_node(id);
        self.positions.remove(id);
        self.selection.forget(id);

        info!(node = id, remaining = self.graph.node_count(), "Deleted node");
        Ok(())
    }

    /// Restore the graph and layout from before the last explode or delete.
    ///
    /// # Errors
    ///
    /// Returns `NothingToUndo` when the history is empty; nothing changes.
    pub fn undo(&mut self) -> Result<(), NothingToUndo> {
        let snapshot = self.history.undo().ok_or(NothingToUndo)?;
        let positions = if self.layout.settings().settle_after_undo {
            match self.layout.layout(&snapshot.graph, Some(&snapshot.positions)) {
                Ok(settled) => settled,
                Err(e) => {
                    warn!(error = %e, "Settling after undo failed, restoring positions as saved");
                    snapshot.positions
                }
            }
        } else {
            snapshot.positions
        };

        self.graph = snapshot.graph;
        self.positions = positions;
        self.selection.clear();

        info!(
            nodes = self.graph.node_count(),
            remaining = self.history.len(),
            "Undo"
        );
        Ok(())
    }

    // ========================================================================
    // Interaction
    // ========================================================================

    /// Select a node, toggling it off if already selected. `None` clears.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError` if the node is not in the graph.
    pub fn select(&mut self, id: Option<&str>) -> Result<(), NotFoundError> {
        match id {
            Some(id) if !self.graph.contains(id) => Err(NotFoundError(NodeId::from(id))),
            id => {
                self.selection.select(id.map(NodeId::from));
                Ok(())
            }
        }
    }

    /// Set the hovered node. Unknown identifiers clear the hover.
    pub fn hover(&mut self, id: Option<&str>) {
        let id = id.filter(|id| self.graph.contains(id)).map(NodeId::from);
        self.selection.hover(id);
    }

    /// Hover whatever node is under the pointer.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        let hit = self.hit_test(x, y);
        self.selection.hover(hit);
    }

    /// Feed a button press at screen `(x, y)`.
    ///
    /// Secondary presses delete the node under the pointer at once; a primary
    /// double press explodes it; a primary single press waits for the
    /// double-click window and is resolved by a later `click` or `tick`.
    pub fn click(&mut self, button: MouseButton, x: f64, y: f64, now: Instant) -> Vec<Interaction> {
        self.clicks
            .press(button, x, y, now)
            .into_iter()
            .map(|event| self.apply_click(event))
            .collect()
    }

    /// Resolve a pending single click whose window has passed.
    pub fn tick(&mut self, now: Instant) -> Option<Interaction> {
        let event = self.clicks.poll(now)?;
        Some(self.apply_click(event))
    }

    fn apply_click(&mut self, event: ClickEvent) -> Interaction {
        match event {
            ClickEvent::Single {
                button: MouseButton::Primary,
                x,
                y,
            } => {
                let hit = self.hit_test(x, y);
                self.selection.select(hit);
                debug!(selected = ?self.selection.selected(), "Selection changed");
                Interaction::Selected(self.selection.selected().cloned())
            }
            ClickEvent::Single {
                button: MouseButton::Secondary,
                x,
                y,
            } => match self.hit_test(x, y) {
                Some(id) => match self.delete(id.as_str()) {
                    Ok(()) => Interaction::Deleted(id),
                    Err(_) => Interaction::Missed,
                },
                None => Interaction::Missed,
            },
            ClickEvent::Double {
                button: MouseButton::Primary,
                x,
                y,
            } => match self.hit_test(x, y) {
                Some(node) => match self.explode(node.as_str()) {
                    Ok(children) => Interaction::Exploded { node, children },
                    Err(error) => Interaction::ExplodeFailed { node, error },
                },
                None => Interaction::Missed,
            },
            _ => Interaction::Missed,
        }
    }

    /// The node within the hit radius of screen point `(x, y)`, if any.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        scene::hit_test(
            &self.positions,
            &self.viewport,
            x,
            y,
            self.config.interaction.hit_radius_px,
        )
    }

    /// Set the screen area used for hit testing.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Drawable form of the current state.
    #[must_use]
    pub fn scene(&self) -> Scene {
        Scene::build(&self.graph, &self.positions, &self.selection, &self.viewport)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The current graph.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The current layout.
    #[must_use]
    pub fn positions(&self) -> &LayoutPositions {
        &self.positions
    }

    /// The current selection and hover.
    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The screen area used for hit testing.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Root of the loaded project, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.ground_truth.as_ref().map(|t| t.mapper.root())
    }

    /// Returns `true` when file-level data from a load is available.
    #[must_use]
    pub fn has_ground_truth(&self) -> bool {
        self.ground_truth.is_some()
    }

    /// Returns `true` when there is something to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Number of undoable operations.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Drop every edge and re-derive them from the file-level map against the
/// graph's current nodes. Returns the number of edges added.
fn rewire(graph: &mut DependencyGraph, raw: &RawDependencyMap, mapper: &PathMapper) -> usize {
    graph.clear_edges();

    let mut resolved: HashMap<&str, Option<NodeId>> = HashMap::new();
    let mut edges: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
    let mut unresolved = 0usize;

    for (source_file, target_files) in raw {
        let Some(source) = resolve(&mut resolved, mapper, graph, source_file) else {
            unresolved += 1;
            continue;
        };
        for target_file in target_files {
            match resolve(&mut resolved, mapper, graph, target_file) {
                Some(target) if target != source => {
                    edges.insert((source.clone(), target));
                }
                Some(_) => {}
                None => unresolved += 1,
            }
        }
    }

    for (from, to) in &edges {
        graph.add_edge(from.as_str(), to.as_str());
    }
    if unresolved > 0 {
        debug!(unresolved, "Skipped file references with no node in the graph");
    }
    edges.len()
}

fn resolve<'a>(
    cache: &mut HashMap<&'a str, Option<NodeId>>,
    mapper: &PathMapper,
    graph: &DependencyGraph,
    path: &'a str,
) -> Option<NodeId> {
    cache
        .entry(path)
        .or_insert_with(|| mapper.resolve_in_graph(path, graph))
        .clone()
}
