//! `pkgscope graph` command implementation.

use std::path::Path;

use super::{LoadArgs, display};

/// Run the graph command.
pub fn run(root: &Path, args: &LoadArgs) -> Result<(), pkgscope::Error> {
    let (session, report) = args.load(root)?;

    display::print_load_report(&report);
    display::print_graph(session.graph(), session.selection());

    Ok(())
}
