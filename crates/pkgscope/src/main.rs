//! Pkgscope CLI - Python package dependency graphs from the command line.
//!
//! Runs the analyzer on a project, builds the package graph and lets you
//! explode, prune and undo interactively.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Pkgscope: interactive Python package dependency graphs.
#[derive(Parser)]
#[command(name = "pkgscope")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the project and print its package graph
    Graph {
        #[command(flatten)]
        load: cli::LoadArgs,
    },

    /// Load the project and print the drawable scene as JSON
    Scene {
        #[command(flatten)]
        load: cli::LoadArgs,

        /// Viewport width in pixels
        #[arg(long, default_value = "1200")]
        width: f64,

        /// Viewport height in pixels
        #[arg(long, default_value = "800")]
        height: f64,

        /// Node to highlight
        #[arg(short, long)]
        select: Option<String>,
    },

    /// Write a default pkgscope.yaml into the project root
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// List directories that are Python packages
    Packages,

    /// Interactive session reading commands from stdin
    Shell {
        #[command(flatten)]
        load: cli::LoadArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Determine project root
    let workspace = match cli.workspace {
        Some(w) => w,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}: failed to get current directory: {e}",
                    "error".red().bold()
                );
                return ExitCode::FAILURE;
            }
        },
    };

    let result = match cli.command {
        Commands::Graph { load } => cli::graph::run(&workspace, &load),
        Commands::Scene {
            load,
            width,
            height,
            select,
        } => cli::scene::run(&workspace, &load, width, height, select.as_deref()),
        Commands::Init { force } => cli::init::run(&workspace, force),
        Commands::Packages => cli::packages::run(&workspace),
        Commands::Shell { load } => cli::shell::run(&workspace, &load),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
