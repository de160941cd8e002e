//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use pkgscope::{Analyzer, Config, LoadError, RawDependencyMap, Session};
use tempfile::TempDir;

/// Files of the sample project. Directories with `__init__.py` are packages;
/// `plain_scripts` is a plain directory.
pub const PROJECT_FILES: &[&str] = &[
    "main.py",
    "top_level_script.py",
    "top_module/__init__.py",
    "top_module/data_processor.py",
    "top_module/deep_module/__init__.py",
    "top_module/deep_module/math_utils.py",
    "top_module/deep_module/deeper/__init__.py",
    "top_module/deep_module/deeper/deepest/__init__.py",
    "top_module/deep_module/deeper/deepest/science_module.py",
    "plain_scripts/importer_script.py",
    "empty_pkg/__init__.py",
];

/// Analyzer returning a fixed map.
pub struct StubAnalyzer(pub RawDependencyMap);

impl Analyzer for StubAnalyzer {
    fn dependency_map(
        &self,
        _root: &Path,
        _exclude: &[String],
    ) -> Result<RawDependencyMap, LoadError> {
        Ok(self.0.clone())
    }
}

/// Analyzer that always fails the way a crashing tool would.
pub struct FailingAnalyzer;

impl Analyzer for FailingAnalyzer {
    fn dependency_map(
        &self,
        _root: &Path,
        _exclude: &[String],
    ) -> Result<RawDependencyMap, LoadError> {
        Err(LoadError::AnalyzerFailed {
            code: Some(2),
            stderr: "tach: missing __init__.py".to_string(),
        })
    }
}

/// Create the sample project on disk.
pub fn sample_project() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for file in PROJECT_FILES {
        let path = dir.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, "").expect("write file");
    }
    dir
}

/// Build a raw map from `(source, [targets])` pairs.
pub fn raw(pairs: &[(&str, &[&str])]) -> RawDependencyMap {
    pairs
        .iter()
        .map(|(source, targets)| {
            (
                (*source).to_string(),
                targets.iter().map(|t| (*t).to_string()).collect(),
            )
        })
        .collect()
}

/// Analyzer output for the sample project.
pub fn sample_raw() -> RawDependencyMap {
    raw(&[
        ("main.py", &["top_module/data_processor.py", "numpy/core.py"]),
        (
            "top_level_script.py",
            &[
                "top_module/deep_module/math_utils.py",
                "plain_scripts/importer_script.py",
            ],
        ),
        (
            "top_module/data_processor.py",
            &["top_module/deep_module/math_utils.py", "pandas/frame.py"],
        ),
        (
            "top_module/deep_module/math_utils.py",
            &[
                "numpy/core.py",
                "top_module/deep_module/deeper/deepest/science_module.py",
            ],
        ),
        ("plain_scripts/importer_script.py", &["main.py"]),
        ("empty_pkg/__init__.py", &[]),
    ])
}

/// Config with top-level collapsing on or off.
pub fn config(collapse: bool) -> Config {
    Config {
        collapse_to_top_level: collapse,
        ..Config::default()
    }
}

/// A session that has loaded the sample project.
pub fn loaded_session(dir: &TempDir, collapse: bool) -> Session {
    let mut session = Session::new(config(collapse), Box::new(StubAnalyzer(sample_raw())));
    session.load(dir.path()).expect("load sample project");
    session
}

/// Sorted node identifiers as strings.
pub fn node_names(session: &Session) -> Vec<String> {
    session
        .graph()
        .node_ids()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// Assert the graph and layout invariants that must hold after any operation.
pub fn assert_consistent(session: &Session) {
    let graph = session.graph();
    for (from, to) in graph.edges() {
        assert_ne!(from, to, "self-loop on {from}");
    }
    for node in graph.nodes() {
        assert_eq!(node.is_external, node.id.as_str().starts_with("ext:"));
    }
    let positioned: Vec<_> = session.positions().keys().collect();
    assert_eq!(positioned, graph.node_ids(), "layout must cover exactly the nodes");
}
