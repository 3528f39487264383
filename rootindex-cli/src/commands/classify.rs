//! `classify` command: print what the index knows about paths.

use std::path::PathBuf;

use crate::commands::common::LoadedWorkspace;
use crate::error::CliError;

/// Classify each path and print one block per path.
pub fn run(workspace: &LoadedWorkspace, paths: &[PathBuf]) -> Result<(), CliError> {
    let generation = workspace.index.current();

    for path in paths {
        let file = workspace.resolve_path(path)?;
        let info = generation.classify(file);

        println!("{}", workspace.display_path(file));
        println!("  kind:      {}", info.kind());
        if let Some(unit) = info.owning_unit().and_then(|id| generation.unit(id)) {
            println!("  unit:      {} ({})", unit.name, unit.id);
        }
        if let Some(root) = info.nearest_content_root() {
            println!("  content:   {}", workspace.display_path(root));
        }
        if let Some(root) = info.nearest_source_root() {
            println!("  source:    {}", workspace.display_path(root));
        }
        if let Some(kind) = info.source_kind() {
            println!("  folder:    {}", kind);
        }
        if let Some(root) = info.library_class_root() {
            println!("  classes:   {}", workspace.display_path(root));
        }
        if info.is_in_library_source() {
            println!("  library source: yes");
        }
        if let Some(ns) = generation.namespace_of(file) {
            println!("  namespace: {}", if ns.is_empty() { "(default)" } else { ns.as_str() });
        }
    }

    Ok(())
}
