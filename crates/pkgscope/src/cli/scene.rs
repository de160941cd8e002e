//! `pkgscope scene` command implementation.

use std::path::Path;

use pkgscope::Viewport;

use super::LoadArgs;

/// Run the scene command. Output is JSON on stdout; the load summary goes to
/// the log.
pub fn run(
    root: &Path,
    args: &LoadArgs,
    width: f64,
    height: f64,
    select: Option<&str>,
) -> Result<(), pkgscope::Error> {
    let (mut session, _report) = args.load(root)?;
    session.set_viewport(Viewport {
        width,
        height,
        ..Viewport::default()
    });
    if select.is_some() {
        session.select(select)?;
    }

    let scene = session.scene();
    println!("{}", serde_json::to_string_pretty(&scene)?);
    Ok(())
}
