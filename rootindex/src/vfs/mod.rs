//! File tree abstraction used by the root index.
//!
//! The index never owns filesystem entries. It stores [`FileId`] handles and
//! asks a [`FileTree`] for parents, children and names. This keeps hierarchy
//! walks and caching testable against a fully synthetic tree.
//!
//! # Overview
//!
//! ```text
//! ┌───────────────┐   scan_into()   ┌──────────────────┐
//! │ disk directory │ ─────────────► │    MemoryTree    │ ◄── tests build directly
//! └───────────────┘                 │  (arena, FileId) │
//!                                   └────────┬─────────┘
//!                                            │ impl FileTree
//!                                            ▼
//!                                   ┌──────────────────┐
//!                                   │    RootIndex     │
//!                                   └──────────────────┘
//! ```

mod ignore;
mod scan;
mod tree;

pub use ignore::{IgnorePatterns, IgnorePolicy, DEFAULT_IGNORED_PATTERNS};
pub use scan::{path_key, scan_into};
pub use tree::MemoryTree;

use std::fmt;

/// Upper bound on parent links followed when rendering a path.
const MAX_PATH_DEPTH: usize = 1000;

/// Opaque handle to an entry of a [`FileTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) u32);

impl FileId {
    /// Raw arena index of this handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only view of a directory tree.
///
/// Implementations must be safe to share between threads: a generation of
/// the index is queried concurrently without locking.
pub trait FileTree: Send + Sync {
    /// Parent directory, or `None` at the filesystem root.
    fn parent(&self, file: FileId) -> Option<FileId>;

    /// Direct children of a directory, in a stable order.
    fn children(&self, dir: FileId) -> &[FileId];

    /// Child of `dir` with the given name.
    fn find_child(&self, dir: FileId, name: &str) -> Option<FileId>;

    /// Name of the entry (empty for the filesystem root).
    fn name(&self, file: FileId) -> &str;

    /// Whether the entry is a directory.
    fn is_directory(&self, file: FileId) -> bool;

    /// Whether the handle still refers to a live entry.
    fn is_valid(&self, file: FileId) -> bool;

    /// Absolute `/`-separated path of the entry.
    fn path_of(&self, file: FileId) -> String {
        let mut names = Vec::new();
        let mut current = Some(file);
        while let Some(id) = current {
            if names.len() > MAX_PATH_DEPTH {
                break;
            }
            names.push(self.name(id));
            current = self.parent(id);
        }
        names.reverse();
        let joined = names
            .into_iter()
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        format!("/{}", joined)
    }
}
