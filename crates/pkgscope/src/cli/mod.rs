//! CLI command implementations.

mod display;

pub mod graph;
pub mod init;
pub mod packages;
pub mod scene;
pub mod shell;

use std::path::Path;

use clap::Args;
use pkgscope::{Config, LoadReport, Session};

/// Options shared by every command that loads a project.
#[derive(Debug, Clone, Default, Args)]
pub struct LoadArgs {
    /// Merge modules into their top-level packages
    #[arg(short, long)]
    pub collapse: bool,

    /// Glob pattern to exclude from analysis (repeatable, replaces the configured list)
    #[arg(short, long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Python interpreter used to run `tach`
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,
}

impl LoadArgs {
    /// `pkgscope.yaml` from the project root with these flags applied.
    pub fn config(&self, root: &Path) -> Result<Config, pkgscope::Error> {
        let mut config = Config::load_or_default(root)?;
        if self.collapse {
            config.collapse_to_top_level = true;
        }
        if !self.exclude.is_empty() {
            config.exclude.clone_from(&self.exclude);
        }
        if let Some(python) = &self.python {
            config.analyzer.python.clone_from(python);
        }
        Ok(config)
    }

    /// A session for `root` that has already loaded the project.
    pub fn load(&self, root: &Path) -> Result<(Session, LoadReport), pkgscope::Error> {
        let mut session = Session::with_tach(self.config(root)?);
        let report = session.load(root)?;
        Ok((session, report))
    }
}
