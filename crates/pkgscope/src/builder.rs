//! Package graph construction from file-level analyzer output.
//!
//! Every `(source file, target file)` pair in the raw map is mapped to
//! identifiers; distinct identifiers become nodes and distinct non-self pairs
//! become edges. With top-level collapsing, internal identifiers are reduced
//! to their first segment before edges are deduplicated, so intra-package
//! imports disappear as self-loops.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::error::{FileRole, MappingFailure};
use crate::graph::DependencyGraph;
use crate::mapper::PathMapper;
use crate::types::{NodeId, RawDependencyMap};

/// Result of building a graph: the graph plus the files that were skipped.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The package-level graph.
    pub graph: DependencyGraph,
    /// Files whose paths could not be mapped, in encounter order.
    pub failures: Vec<MappingFailure>,
}

/// Build a package-level dependency graph.
///
/// Mapping failures are logged and collected in the outcome; they never abort
/// the build.
#[must_use]
pub fn build_graph(
    raw: &RawDependencyMap,
    mapper: &PathMapper,
    collapse_to_top_level: bool,
) -> BuildOutcome {
    let mut failures = Vec::new();
    let mut nodes: BTreeSet<NodeId> = BTreeSet::new();
    let mut edges: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();

    for (source_file, target_files) in raw {
        let Some(source) = map_or_record(mapper, source_file, FileRole::Source, &mut failures)
        else {
            continue;
        };
        nodes.insert(source.clone());

        for target_file in target_files {
            let Some(target) = map_or_record(mapper, target_file, FileRole::Target, &mut failures)
            else {
                continue;
            };
            if source != target {
                edges.insert((source.clone(), target.clone()));
            }
            nodes.insert(target);
        }
    }

    if collapse_to_top_level {
        nodes = nodes.iter().map(NodeId::top_level).collect();
        edges = edges
            .iter()
            .map(|(a, b)| (a.top_level(), b.top_level()))
            .filter(|(a, b)| a != b)
            .collect();
        debug!(nodes = nodes.len(), edges = edges.len(), "Collapsed to top-level packages");
    }

    let mut graph = DependencyGraph::new();
    for node in nodes {
        graph.add_node(node);
    }
    for (from, to) in &edges {
        graph.add_edge(from.as_str(), to.as_str());
    }

    let isolated = graph.isolated_nodes();
    if !isolated.is_empty() {
        warn!(nodes = ?isolated, "Found isolated package nodes");
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        external = graph.nodes().iter().filter(|n| n.is_external).count(),
        skipped_files = failures.len(),
        "Package graph built"
    );

    BuildOutcome { graph, failures }
}

fn map_or_record(
    mapper: &PathMapper,
    path: &str,
    role: FileRole,
    failures: &mut Vec<MappingFailure>,
) -> Option<NodeId> {
    let id = mapper.map_path(path);
    if id.is_none() {
        warn!(path, role = %role, "Could not determine package for file");
        failures.push(MappingFailure::new(
            path,
            role,
            "no path segment to derive an identifier from",
        ));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().expect("should create temp dir");
        for file in files {
            let full = dir.path().join(file);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("should create parent dirs");
            }
            fs::write(&full, "").expect("should write file");
        }
        dir
    }

    fn raw(pairs: &[(&str, &[&str])]) -> RawDependencyMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.iter().map(|s| (*s).to_string()).collect()))
            .collect()
    }

    fn sample_project() -> TempDir {
        project(&[
            "top_module/__init__.py",
            "top_module/data_processor.py",
            "top_module/deep_module/__init__.py",
            "top_module/deep_module/math_utils.py",
        ])
    }

    fn sample_raw() -> RawDependencyMap {
        raw(&[
            (
                "top_module/data_processor.py",
                &["top_module/deep_module/math_utils.py"],
            ),
            ("top_module/deep_module/math_utils.py", &["numpy/core.py"]),
        ])
    }

    #[test]
    fn collapse_merges_into_top_level_packages() {
        let dir = sample_project();
        let mapper = PathMapper::new(dir.path());

        let outcome = build_graph(&sample_raw(), &mapper, true);

        let nodes: Vec<&str> = outcome.graph.node_ids().iter().map(|n| n.as_str()).collect();
        assert_eq!(nodes, vec!["ext:numpy", "top_module"]);
        assert_eq!(outcome.graph.edge_count(), 1);
        assert!(outcome.graph.has_edge("top_module", "ext:numpy"));
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn without_collapse_modules_stay_separate() {
        let dir = sample_project();
        let mapper = PathMapper::new(dir.path());

        let outcome = build_graph(&sample_raw(), &mapper, false);

        assert_eq!(outcome.graph.node_count(), 3);
        assert!(
            outcome
                .graph
                .has_edge("top_module.data_processor", "top_module.deep_module.math_utils")
        );
        assert!(
            outcome
                .graph
                .has_edge("top_module.deep_module.math_utils", "ext:numpy")
        );
    }

    #[test]
    fn unmappable_files_are_recorded_and_skipped() {
        let dir = sample_project();
        let mapper = PathMapper::new(dir.path());
        let data = raw(&[
            ("top_module/data_processor.py", &["", "numpy/core.py"]),
            ("/", &["top_module/data_processor.py"]),
        ]);

        let outcome = build_graph(&data, &mapper, false);

        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.graph.has_edge("top_module.data_processor", "ext:numpy"));
        assert_eq!(outcome.graph.node_count(), 2);
    }

    #[test]
    fn same_package_imports_produce_no_self_loop() {
        let dir = project(&["pkg/__init__.py", "pkg/a.py"]);
        let mapper = PathMapper::new(dir.path());
        let data = raw(&[("pkg/__init__.py", &["pkg/__init__.py", "pkg/a.py"])]);

        let outcome = build_graph(&data, &mapper, true);

        assert_eq!(outcome.graph.node_count(), 1);
        assert_eq!(outcome.graph.edge_count(), 0);
    }

    fn arb_raw() -> impl Strategy<Value = RawDependencyMap> {
        let file = prop::sample::select(vec![
            "pkg/__init__.py",
            "pkg/a.py",
            "pkg/sub/b.py",
            "main.py",
            "numpy/core.py",
            "pandas/frame.py",
            "",
        ]);
        prop::collection::btree_map(
            file.clone().prop_map(str::to_string),
            prop::collection::vec(file.prop_map(str::to_string), 0..6),
            0..6,
        )
    }

    proptest! {
        #[test]
        fn built_graphs_have_no_self_loops_and_consistent_kinds(
            data in arb_raw(),
            collapse in any::<bool>(),
        ) {
            let dir = project(&["pkg/__init__.py", "pkg/a.py", "pkg/sub/b.py", "main.py"]);
            let mapper = PathMapper::new(dir.path());

            let outcome = build_graph(&data, &mapper, collapse);

            for (a, b) in outcome.graph.edges() {
                prop_assert_ne!(a, b);
            }
            for node in outcome.graph.nodes() {
                prop_assert_eq!(node.is_external, node.id.as_str().starts_with("ext:"));
            }
        }
    }
}
