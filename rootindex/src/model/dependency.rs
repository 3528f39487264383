//! Dependency edges between units and libraries.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::library::LibraryId;
use super::unit::UnitId;

/// Where a dependency is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Compile,
    Test,
    Runtime,
    Provided,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Compile => write!(f, "compile"),
            Scope::Test => write!(f, "test"),
            Scope::Runtime => write!(f, "runtime"),
            Scope::Provided => write!(f, "provided"),
        }
    }
}

/// What a dependency entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// The owning unit's own sources.
    Source,
    /// Another unit.
    Unit {
        target: UnitId,
        exported: bool,
        scope: Scope,
    },
    /// A library.
    Library {
        library: LibraryId,
        exported: bool,
        scope: Scope,
    },
}

/// One entry of a unit's ordered dependency list.
///
/// Identity is `(owner, position)`: two entries are the same edge exactly
/// when they come from the same slot of the same unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyEntry {
    /// Unit declaring the entry.
    pub owner: UnitId,
    /// Index in the owner's dependency list.
    pub position: u32,
    /// Target of the edge.
    pub kind: DependencyKind,
}

impl DependencyEntry {
    /// Whether dependents of the owner see through this entry.
    pub fn is_exported(&self) -> bool {
        match self.kind {
            DependencyKind::Source => false,
            DependencyKind::Unit { exported, .. } | DependencyKind::Library { exported, .. } => {
                exported
            }
        }
    }

    /// Scope of the entry; the source entry is always compile scope.
    pub fn scope(&self) -> Scope {
        match self.kind {
            DependencyKind::Source => Scope::Compile,
            DependencyKind::Unit { scope, .. } | DependencyKind::Library { scope, .. } => scope,
        }
    }

    /// Library referenced by this entry, if any.
    pub fn library(&self) -> Option<LibraryId> {
        match self.kind {
            DependencyKind::Library { library, .. } => Some(library),
            _ => None,
        }
    }

    /// Unit referenced by this entry, if any.
    pub fn target_unit(&self) -> Option<UnitId> {
        match self.kind {
            DependencyKind::Unit { target, .. } => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for DependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DependencyKind::Source => write!(f, "{}[{}] <source>", self.owner, self.position),
            DependencyKind::Unit { target, scope, .. } => {
                write!(f, "{}[{}] -> {} ({})", self.owner, self.position, target, scope)
            }
            DependencyKind::Library { library, scope, .. } => {
                write!(f, "{}[{}] -> {} ({})", self.owner, self.position, library, scope)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_accessors() {
        let entry = DependencyEntry {
            owner: UnitId(1),
            position: 2,
            kind: DependencyKind::Library {
                library: LibraryId(3),
                exported: true,
                scope: Scope::Runtime,
            },
        };
        assert!(entry.is_exported());
        assert_eq!(entry.scope(), Scope::Runtime);
        assert_eq!(entry.library(), Some(LibraryId(3)));
        assert_eq!(entry.target_unit(), None);
    }

    #[test]
    fn test_source_entry_is_not_exported() {
        let entry = DependencyEntry {
            owner: UnitId(1),
            position: 0,
            kind: DependencyKind::Source,
        };
        assert!(!entry.is_exported());
        assert_eq!(entry.scope(), Scope::Compile);
        assert_eq!(entry.to_string(), "unit#1[0] <source>");
    }
}
