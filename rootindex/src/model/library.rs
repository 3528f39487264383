//! External dependency areas.

use std::fmt;

use crate::vfs::FileId;

/// Identity of a [`Library`], independent of the units referencing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryId(pub u32);

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "library#{}", self.0)
    }
}

/// A library contributing binary and/or source roots.
///
/// Excluded roots suppress classification for this library only; another
/// library declaring the same root is unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub id: LibraryId,
    pub name: String,
    pub binary_roots: Vec<FileId>,
    pub source_roots: Vec<FileId>,
    pub excluded_roots: Vec<FileId>,
}

impl Library {
    pub fn new(id: LibraryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            binary_roots: Vec::new(),
            source_roots: Vec::new(),
            excluded_roots: Vec::new(),
        }
    }

    pub fn with_binary_root(mut self, root: FileId) -> Self {
        self.binary_roots.push(root);
        self
    }

    pub fn with_source_root(mut self, root: FileId) -> Self {
        self.source_roots.push(root);
        self
    }

    pub fn with_excluded_root(mut self, root: FileId) -> Self {
        self.excluded_roots.push(root);
        self
    }
}
