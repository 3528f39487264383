//! Root hierarchy: the known roots on the path from a root up to the
//! filesystem root, nearest first.
//!
//! An ignored ancestor cuts the walk short unless a content root has already
//! been passed: content roots re-include what lies beneath them.

use crate::vfs::{FileId, FileTree, IgnorePolicy};

use super::catalog::RootCatalog;

/// Abort a walk that followed more parent links than any real tree has.
pub(crate) fn possible_loop(tree: &dyn FileTree, start: FileId, depth: usize) -> ! {
    panic!(
        "Possible loop in tree: more than {} ancestors above {} ({})",
        depth,
        start,
        tree.name(start)
    );
}

/// Known roots enclosing `start`, nearest first.
///
/// Returns `None` when an ignored directory is met before any content root.
pub(crate) fn walk(
    tree: &dyn FileTree,
    ignore: &dyn IgnorePolicy,
    catalog: &RootCatalog,
    start: FileId,
    max_depth: usize,
) -> Option<Vec<FileId>> {
    let mut hierarchy = Vec::new();
    let mut has_content_root = false;
    let mut current = Some(start);
    let mut depth = 0usize;

    while let Some(dir) = current {
        depth += 1;
        if depth > max_depth {
            possible_loop(tree, start, max_depth);
        }

        has_content_root |= catalog.is_content_root(dir);
        if !has_content_root && ignore.is_ignored(tree, dir) {
            return None;
        }
        if catalog.is_root(dir) {
            hierarchy.push(dir);
        }
        current = tree.parent(dir);
    }

    Some(hierarchy)
}
