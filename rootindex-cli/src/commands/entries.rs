//! `entries` command: dependency entries through which a path is visible.

use std::path::Path;

use rootindex::model::DependencyKind;

use crate::commands::common::LoadedWorkspace;
use crate::error::CliError;

/// Print the visibility entries of `path`, in index order.
pub fn run(workspace: &LoadedWorkspace, path: &Path) -> Result<(), CliError> {
    let file = workspace.resolve_path(path)?;
    let generation = workspace.index.current();
    let entries = generation.order_entries_for(file);

    if entries.is_empty() {
        println!("{} is not visible through any dependency", workspace.display_path(file));
        return Ok(());
    }

    for entry in entries {
        let owner = generation
            .unit(entry.owner)
            .map(|u| u.name.as_str())
            .unwrap_or("?");
        let target = match entry.kind {
            DependencyKind::Source => "<source>".to_string(),
            DependencyKind::Unit { target, .. } => generation
                .unit(target)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| target.to_string()),
            DependencyKind::Library { library, .. } => generation
                .library(library)
                .map(|l| l.name.clone())
                .unwrap_or_else(|| library.to_string()),
        };
        let exported = if entry.is_exported() { " exported" } else { "" };
        println!(
            "{}[{}] -> {} ({}{})",
            owner,
            entry.position,
            target,
            entry.scope(),
            exported
        );
    }

    Ok(())
}
