//! `roots` command: dump the root catalog and index statistics.

use crate::commands::common::LoadedWorkspace;
use crate::error::CliError;

/// Print every catalog root with its tags.
pub fn run(workspace: &LoadedWorkspace) -> Result<(), CliError> {
    let generation = workspace.index.current();
    let catalog = generation.catalog();

    println!("Generation {}", generation.id());
    println!("  units:     {}", generation.units().len());
    println!("  roots:     {}", catalog.all_roots().len());
    println!(
        "  parallel:  {}",
        if generation.is_parallel() { "yes" } else { "no" }
    );
    println!();

    for &root in catalog.all_roots() {
        println!("{}", workspace.display_path(root));
        for tag in catalog.tags(root) {
            println!("  {:?}", tag);
        }
    }

    let excluded = generation.workspace_excluded_roots();
    if !excluded.is_empty() {
        println!();
        println!("Excluded outside any content root:");
        for &root in excluded {
            println!("  {}", workspace.display_path(root));
        }
    }

    generation.check_consistency()?;
    println!();
    println!("{}", workspace.index.stats());
    Ok(())
}
