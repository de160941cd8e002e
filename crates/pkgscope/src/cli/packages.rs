//! `pkgscope packages` command implementation.

use std::path::Path;

use colored::Colorize;
use pkgscope::discover_packages;

/// Run the packages command.
pub fn run(root: &Path) -> Result<(), pkgscope::Error> {
    if !root.is_dir() {
        return Err(pkgscope::LoadError::InvalidRoot(root.to_path_buf()).into());
    }

    let packages = discover_packages(root);
    if packages.is_empty() {
        println!("{}", "No Python packages found.".yellow());
        return Ok(());
    }

    println!(
        "Found {} packages under {}:",
        packages.len().to_string().green().bold(),
        root.display()
    );
    for package in &packages {
        println!("  {} {package}", "•".dimmed());
    }
    Ok(())
}
