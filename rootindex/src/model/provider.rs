//! Declaration providers consumed when building a generation.
//!
//! The index pulls the current units, libraries and workspace-wide
//! exclusions from these traits every time a generation is built. A provider
//! failing aborts the build and the previous generation keeps serving.

use parking_lot::RwLock;
use thiserror::Error;

use super::library::{Library, LibraryId};
use super::unit::{Unit, UnitId};
use crate::vfs::FileId;

/// Errors raised by declaration providers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Units could not be enumerated.
    #[error("Unit provider failed: {0}")]
    Units(String),

    /// Libraries could not be enumerated.
    #[error("Library provider failed: {0}")]
    Libraries(String),

    /// An exclude policy could not produce its roots.
    #[error("Exclude policy failed: {0}")]
    Excludes(String),
}

/// Enumerates the current build units.
pub trait UnitProvider: Send + Sync {
    fn units(&self) -> Result<Vec<Unit>, ProviderError>;
}

/// Enumerates the libraries units may reference.
pub trait LibraryProvider: Send + Sync {
    fn libraries(&self) -> Result<Vec<Library>, ProviderError>;
}

/// Contributes workspace-wide excluded roots.
pub trait ExcludePolicy: Send + Sync {
    fn excluded_roots(&self) -> Result<Vec<FileId>, ProviderError>;
}

/// Exclude policy backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticExcludes(pub Vec<FileId>);

impl ExcludePolicy for StaticExcludes {
    fn excluded_roots(&self) -> Result<Vec<FileId>, ProviderError> {
        Ok(self.0.clone())
    }
}

/// In-memory unit and library declarations.
///
/// Mutations take effect on the next generation build; call
/// [`RootIndex::rebuild`](crate::index::RootIndex::rebuild) after editing.
#[derive(Debug, Default)]
pub struct WorkspaceModel {
    units: RwLock<Vec<Unit>>,
    libraries: RwLock<Vec<Library>>,
}

impl WorkspaceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from existing declarations.
    pub fn with_declarations(units: Vec<Unit>, libraries: Vec<Library>) -> Self {
        Self {
            units: RwLock::new(units),
            libraries: RwLock::new(libraries),
        }
    }

    /// Add or replace a unit by id.
    pub fn put_unit(&self, unit: Unit) {
        let mut units = self.units.write();
        match units.iter_mut().find(|u| u.id == unit.id) {
            Some(existing) => *existing = unit,
            None => units.push(unit),
        }
    }

    /// Remove a unit. Returns whether it existed.
    pub fn remove_unit(&self, id: UnitId) -> bool {
        let mut units = self.units.write();
        let before = units.len();
        units.retain(|u| u.id != id);
        units.len() != before
    }

    /// Add or replace a library by id.
    pub fn put_library(&self, library: Library) {
        let mut libraries = self.libraries.write();
        match libraries.iter_mut().find(|l| l.id == library.id) {
            Some(existing) => *existing = library,
            None => libraries.push(library),
        }
    }

    /// Remove a library. Returns whether it existed.
    pub fn remove_library(&self, id: LibraryId) -> bool {
        let mut libraries = self.libraries.write();
        let before = libraries.len();
        libraries.retain(|l| l.id != id);
        libraries.len() != before
    }

    pub fn unit_count(&self) -> usize {
        self.units.read().len()
    }

    pub fn library_count(&self) -> usize {
        self.libraries.read().len()
    }
}

impl UnitProvider for WorkspaceModel {
    fn units(&self) -> Result<Vec<Unit>, ProviderError> {
        Ok(self.units.read().clone())
    }
}

impl LibraryProvider for WorkspaceModel {
    fn libraries(&self) -> Result<Vec<Library>, ProviderError> {
        Ok(self.libraries.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_unit_replaces_by_id() {
        let model = WorkspaceModel::new();
        model.put_unit(Unit::new(UnitId(1), "a"));
        model.put_unit(Unit::new(UnitId(1), "renamed"));
        model.put_unit(Unit::new(UnitId(2), "b"));

        let units = model.units().unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].name, "renamed");
    }

    #[test]
    fn test_remove_library() {
        let model = WorkspaceModel::new();
        model.put_library(Library::new(LibraryId(1), "junit"));
        assert!(model.remove_library(LibraryId(1)));
        assert!(!model.remove_library(LibraryId(1)));
        assert_eq!(model.library_count(), 0);
    }

    #[test]
    fn test_static_excludes() {
        let policy = StaticExcludes(vec![FileId(3)]);
        assert_eq!(policy.excluded_roots().unwrap(), vec![FileId(3)]);
    }
}
