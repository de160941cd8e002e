//! Tests for loading, deleting, undo history and selection through `Session`.

mod common;

use common::{
    FailingAnalyzer, StubAnalyzer, assert_consistent, config, loaded_session, node_names, raw,
    sample_project, sample_raw,
};
use pkgscope::{
    DependencyGraph, ExplodeError, LoadError, NodeId, NothingToUndo, NotFoundError, Session,
};

// === Loading ===

#[test]
fn collapsed_load_merges_into_top_level_packages() {
    let dir = sample_project();
    let session = loaded_session(&dir, true);

    assert_eq!(
        node_names(&session),
        vec![
            "empty_pkg",
            "ext:numpy",
            "ext:pandas",
            "main",
            "plain_scripts",
            "top_level_script",
            "top_module",
        ]
    );
    let graph = session.graph();
    assert!(graph.has_edge("main", "top_module"));
    assert!(graph.has_edge("top_module", "ext:pandas"));
    assert!(graph.has_edge("plain_scripts", "main"));
    assert!(!graph.has_edge("top_module", "top_module"));
    assert_eq!(graph.edge_count(), 7);
    assert_consistent(&session);
}

#[test]
fn collapse_scenario_yields_two_nodes_and_one_edge() {
    let dir = sample_project();
    let data = raw(&[
        (
            "top_module/data_processor.py",
            &["top_module/deep_module/math_utils.py"],
        ),
        ("top_module/deep_module/math_utils.py", &["numpy/core.py"]),
    ]);
    let mut session = Session::new(config(true), Box::new(StubAnalyzer(data)));

    let report = session.load(dir.path()).expect("should load");

    assert_eq!(node_names(&session), vec!["ext:numpy", "top_module"]);
    assert_eq!(report.edges, 1);
    assert_eq!(report.external, 1);
    assert!(session.graph().has_edge("top_module", "ext:numpy"));
}

#[test]
fn uncollapsed_load_keeps_modules() {
    let dir = sample_project();
    let session = loaded_session(&dir, false);

    let graph = session.graph();
    assert!(graph.contains("top_module.deep_module.math_utils"));
    assert!(graph.contains("top_module.deep_module.deeper.deepest.science_module"));
    assert!(graph.contains("plain_scripts.importer_script"));
    assert!(graph.has_edge(
        "top_module.deep_module.math_utils",
        "top_module.deep_module.deeper.deepest.science_module"
    ));
    assert_consistent(&session);
}

#[test]
fn unmappable_paths_are_reported_not_fatal() {
    let dir = sample_project();
    let data = raw(&[("main.py", &["", "numpy/core.py"])]);
    let mut session = Session::new(config(false), Box::new(StubAnalyzer(data)));

    let report = session.load(dir.path()).expect("should load");

    assert_eq!(report.mapping_failures.len(), 1);
    assert!(session.graph().has_edge("main", "ext:numpy"));
}

#[test]
fn failed_reload_preserves_graph_and_history() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, true);
    session.delete("ext:pandas").expect("should delete");
    let graph = session.graph().clone();
    let positions = session.positions().clone();

    let mut failing = Session::new(config(true), Box::new(FailingAnalyzer));
    let err = failing.load(dir.path()).expect_err("should fail");
    assert!(matches!(err, LoadError::AnalyzerFailed { code: Some(2), .. }));
    assert!(failing.graph().is_empty());

    let err = session
        .load(&dir.path().join("does-not-exist"))
        .expect_err("should fail");
    assert!(matches!(err, LoadError::InvalidRoot(_)));
    assert_eq!(session.graph(), &graph);
    assert_eq!(session.positions(), &positions);
    assert_eq!(session.history_len(), 1);
}

#[test]
fn reload_discards_history_and_selection() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, true);
    session.select(Some("main")).expect("should select");
    session.delete("ext:numpy").expect("should delete");

    session.load(dir.path()).expect("should reload");

    assert!(!session.can_undo());
    assert_eq!(session.selection().selected(), None);
    assert!(session.graph().contains("ext:numpy"));
}

// === Delete ===

#[test]
fn delete_removes_node_edges_and_position_only() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, true);
    let before = session.positions().clone();

    session.delete("top_module").expect("should delete");

    assert!(!session.graph().contains("top_module"));
    assert!(!session.graph().has_edge("main", "top_module"));
    for (id, position) in session.positions() {
        assert_eq!(Some(position), before.get(id), "{id} moved on delete");
    }
    assert_consistent(&session);
}

#[test]
fn delete_unknown_node_is_not_found() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, true);

    let err = session.delete("nope").expect_err("should fail");

    assert_eq!(err, NotFoundError(NodeId::from("nope")));
    assert_eq!(session.history_len(), 0);
}

#[test]
fn deleting_selected_node_clears_selection() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, true);
    session.select(Some("main")).expect("should select");

    session.delete("main").expect("should delete");

    assert_eq!(session.selection().selected(), None);
}

#[test]
fn deleting_other_node_keeps_selection() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, true);
    session.select(Some("main")).expect("should select");
    session.hover(Some("ext:numpy"));

    session.delete("ext:pandas").expect("should delete");

    assert_eq!(session.selection().selected(), Some(&NodeId::from("main")));
    assert_eq!(session.selection().hovered(), Some(&NodeId::from("ext:numpy")));
}

// === History ===

#[test]
fn history_depth_tracks_operations_and_undo_walks_back() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, true);
    let mut states = vec![session.graph().clone()];

    session.delete("ext:pandas").expect("should delete");
    states.push(session.graph().clone());
    session.explode("top_module").expect("should explode");
    states.push(session.graph().clone());
    session.delete("main").expect("should delete");
    states.push(session.graph().clone());
    session.explode("top_module.deep_module").expect("should explode");
    states.push(session.graph().clone());

    let k = states.len() - 1;
    assert_eq!(session.history_len(), k);

    for m in 1..=k {
        session.undo().expect("should undo");
        assert_eq!(session.history_len(), k - m);
        assert_eq!(session.graph(), &states[k - m], "after {m} undos");
        assert_consistent(&session);
    }

    assert_eq!(session.undo(), Err(NothingToUndo));
    assert_eq!(session.graph(), &states[0]);
}

#[test]
fn undo_clears_selection() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, true);
    session.delete("ext:pandas").expect("should delete");
    session.select(Some("main")).expect("should select");

    session.undo().expect("should undo");

    assert_eq!(session.selection().selected(), None);
}

// === Without ground truth ===

#[test]
fn explode_before_load_reports_missing_ground_truth() {
    let mut graph = DependencyGraph::new();
    graph.add_node(NodeId::from("top_module"));
    graph.add_node(NodeId::external("numpy"));
    graph.add_edge("top_module", "ext:numpy");
    let mut session = Session::new(config(false), Box::new(StubAnalyzer(sample_raw())));
    session.replace_graph(graph.clone()).expect("should lay out");
    let positions = session.positions().clone();

    let err = session.explode("top_module").expect_err("should fail");

    assert!(matches!(err, ExplodeError::MissingGroundTruth));
    assert_eq!(session.graph(), &graph);
    assert_eq!(session.positions(), &positions);
    assert!(!session.can_undo());
}

#[test]
fn empty_session_explode_reports_missing_ground_truth() {
    let mut session = Session::new(config(false), Box::new(FailingAnalyzer));

    assert!(matches!(
        session.explode("anything"),
        Err(ExplodeError::MissingGroundTruth)
    ));
}

// === Scene ===

#[test]
fn scene_labels_and_highlights_follow_session_state() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, false);
    session.select(Some("top_module.data_processor")).expect("should select");
    session.hover(Some("top_module.deep_module.deeper.deepest.science_module"));

    let scene = session.scene();

    let science = scene
        .node("top_module.deep_module.deeper.deepest.science_module")
        .expect("node in scene");
    assert_eq!(science.label, "top_module...deepest.science_module");
    assert_eq!(
        scene.node("ext:pandas").map(|n| (n.label.as_str(), n.color)),
        Some(("pandas", "red"))
    );
    assert_eq!(scene.node("main").map(|n| n.color), Some("blue"));
    assert_eq!(
        scene.tooltip.as_deref(),
        Some("top_module.deep_module.deeper.deepest.science_module")
    );
    assert_eq!(scene.nodes.len(), session.graph().node_count());
    assert_eq!(scene.edges.len(), session.graph().edge_count());
}

#[test]
fn hit_test_maps_screen_points_to_nodes() {
    let dir = sample_project();
    let session = loaded_session(&dir, true);
    let scene = session.scene();
    let main = scene.node("main").expect("node in scene");

    assert_eq!(
        session.hit_test(main.screen.x + 3.0, main.screen.y - 3.0),
        Some(NodeId::from("main"))
    );
    assert_eq!(session.hit_test(-500.0, -500.0), None);
}

#[test]
fn pointer_movement_drives_hover_and_tooltip() {
    let dir = sample_project();
    let mut session = loaded_session(&dir, true);
    let main = session.scene().node("main").expect("node in scene").screen;

    session.pointer_moved(main.x + 2.0, main.y + 2.0);

    assert_eq!(session.selection().hovered(), Some(&NodeId::from("main")));
    assert_eq!(session.scene().tooltip.as_deref(), Some("main"));

    session.pointer_moved(-500.0, -500.0);

    assert_eq!(session.selection().hovered(), None);
    assert_eq!(session.scene().tooltip, None);
}
