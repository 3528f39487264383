//! `namespace` command: directories carrying a namespace.

use crate::commands::common::LoadedWorkspace;
use crate::error::CliError;

/// Print every directory whose namespace is `ns`.
pub fn run(
    workspace: &LoadedWorkspace,
    ns: &str,
    include_library_sources: bool,
) -> Result<(), CliError> {
    let directories = workspace
        .index
        .directories_for_namespace(ns, include_library_sources);

    if directories.is_empty() {
        println!("No directories for namespace '{}'", ns);
        return Ok(());
    }
    for dir in directories {
        println!("{}", workspace.display_path(dir));
    }
    Ok(())
}
