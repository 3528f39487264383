//! `iterate` command: walk content without excluded or ignored entries.

use std::path::Path;

use rootindex::vfs::FileId;

use crate::commands::common::LoadedWorkspace;
use crate::error::CliError;

/// Print every content entry, optionally only under `under` and only
/// directories.
pub fn run(
    workspace: &LoadedWorkspace,
    under: Option<&Path>,
    directories_only: bool,
) -> Result<(), CliError> {
    let generation = workspace.index.current();
    let tree = generation.tree();
    let only_dirs = |file: FileId| tree.is_directory(file);
    let filter: Option<&dyn Fn(FileId) -> bool> = if directories_only {
        Some(&only_dirs)
    } else {
        None
    };

    let mut count = 0usize;
    let visitor = |file: FileId| {
        println!("{}", workspace.display_path(file));
        count += 1;
        true
    };

    match under {
        Some(path) => {
            let dir = workspace.resolve_path(path)?;
            generation.iterate_content_under(dir, visitor, filter);
        }
        None => {
            generation.iterate_content(visitor, filter);
        }
    }

    eprintln!("{} entries", count);
    Ok(())
}
