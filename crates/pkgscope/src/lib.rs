//! # Pkgscope: Interactive Python Package Dependency Graphs
//!
//! Pkgscope turns the file-level import map of a Python project into a
//! package-level dependency graph and keeps it editable: packages can be
//! exploded into their sub-packages and modules, nodes can be pruned, and every
//! edit can be undone. Layout is kept stable across edits so the drawing does
//! not jump around.
//!
//! ## Design Philosophy
//!
//! - **File-level ground truth** - Edges are always re-derived from the
//!   analyzer's file map, never patched
//! - **Filesystem decides kind** - A dependency is internal only if its file
//!   exists under the project root
//! - **Last known-good state** - A failed operation never leaves a half-edited
//!   graph behind
//! - **Library first, shell second** - The session holds all state; shells
//!   forward events and draw scenes
//!
//! ## Quick Start
//!
//! ```no_run
//! use pkgscope::{Config, Session};
//! use std::path::Path;
//!
//! let root = Path::new("/path/to/project");
//! let mut session = Session::with_tach(Config::load_or_default(root)?);
//!
//! let report = session.load(root)?;
//! println!("{} packages, {} edges", report.nodes, report.edges);
//!
//! session.explode("my_package")?;
//! session.undo()?;
//!
//! let scene = session.scene();
//! println!("{} nodes to draw", scene.nodes.len());
//! # Ok::<(), pkgscope::Error>(())
//! ```

pub mod analyzer;
pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod history;
pub mod layout;
pub mod mapper;
pub mod scene;
pub mod selection;
pub mod session;
pub mod types;

pub use analyzer::{Analyzer, AnalyzerSettings, TachAnalyzer, parse_dependency_map};
pub use builder::{BuildOutcome, build_graph};
pub use config::{CONFIG_FILE_NAME, Config};
pub use error::{
    Error, ExplodeError, FileRole, LayoutError, LoadError, MappingFailure, NotFoundError,
    NothingToUndo, Result,
};
pub use graph::{DependencyGraph, GraphNode};
pub use history::{History, Snapshot};
pub use layout::{Algorithm, LayoutEngine, LayoutSettings};
pub use mapper::{PathMapper, discover_packages};
pub use scene::{Scene, SceneEdge, SceneNode, Viewport};
pub use selection::{ClickEvent, ClickTracker, InteractionSettings, MouseButton, SelectionState};
pub use session::{Interaction, LoadReport, Session};
pub use types::{LayoutPositions, NodeId, Point, RawDependencyMap};
