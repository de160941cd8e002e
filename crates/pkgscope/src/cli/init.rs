//! `pkgscope init` command implementation.

use std::path::Path;

use colored::Colorize;
use pkgscope::Config;

/// Run the init command.
pub fn run(root: &Path, force: bool) -> Result<(), pkgscope::Error> {
    if !root.is_dir() {
        return Err(pkgscope::LoadError::InvalidRoot(root.to_path_buf()).into());
    }

    let path = Config::init(root, force)?;
    println!("{} {}", "Wrote".green().bold(), path.display());
    Ok(())
}
