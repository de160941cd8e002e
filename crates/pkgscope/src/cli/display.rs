//! Common display utilities for CLI commands.

use colored::Colorize;
use pkgscope::{DependencyGraph, LoadReport, SelectionState};

const MAX_DISPLAY_ITEMS: usize = 10;

/// Print the summary of a load, with up to `MAX_DISPLAY_ITEMS` skipped files.
pub fn print_load_report(report: &LoadReport) {
    println!(
        "{} {} ({} files): {} packages, {} edges, {} external",
        "Loaded".green().bold(),
        report.root.display(),
        report.files,
        report.nodes,
        report.edges,
        report.external
    );

    if !report.mapping_failures.is_empty() {
        println!(
            "{}: {} files could not be mapped",
            "Skipped".yellow(),
            report.mapping_failures.len()
        );
        for failure in report.mapping_failures.iter().take(MAX_DISPLAY_ITEMS) {
            println!("  {} {failure}", "•".yellow());
        }
        if report.mapping_failures.len() > MAX_DISPLAY_ITEMS {
            println!(
                "  ... and {} more",
                report.mapping_failures.len() - MAX_DISPLAY_ITEMS
            );
        }
    }
}

/// Print every node and edge, marking external nodes and the selection.
pub fn print_graph(graph: &DependencyGraph, selection: &SelectionState) {
    println!();
    println!("{} ({}):", "Nodes".bold(), graph.node_count());
    for node in graph.nodes() {
        let name = if selection.selected() == Some(&node.id) {
            node.id.to_string().on_yellow().black()
        } else if node.is_external {
            node.id.to_string().magenta()
        } else {
            node.id.to_string().blue()
        };
        let label = node.id.label();
        if label == node.id.as_str() {
            println!("  {} {name}", "•".dimmed());
        } else {
            println!("  {} {name} {}", "•".dimmed(), format!("[{label}]").dimmed());
        }
    }

    println!();
    println!("{} ({}):", "Edges".bold(), graph.edge_count());
    if graph.edge_count() == 0 {
        println!("  {}", "none".dimmed());
    }
    for (from, to) in graph.edges() {
        println!("  {from} {} {to}", "→".dimmed());
    }
}
