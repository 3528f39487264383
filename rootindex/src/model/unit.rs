//! Build units and their content layout.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::dependency::{DependencyEntry, DependencyKind, Scope};
use super::library::LibraryId;
use crate::vfs::FileId;

/// Identity of a [`Unit`] within a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Kind of a source-like content folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Production sources.
    Production,
    /// Test sources.
    Test,
    /// Production resources.
    Resource,
    /// Test resources.
    TestResource,
}

impl SourceKind {
    /// Whether this folder holds test code or test resources.
    pub fn is_test(&self) -> bool {
        matches!(self, SourceKind::Test | SourceKind::TestResource)
    }

    /// Whether this folder holds resources rather than code.
    pub fn is_resource(&self) -> bool {
        matches!(self, SourceKind::Resource | SourceKind::TestResource)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Production => write!(f, "production"),
            SourceKind::Test => write!(f, "test"),
            SourceKind::Resource => write!(f, "resource"),
            SourceKind::TestResource => write!(f, "test-resource"),
        }
    }
}

/// A source, test or resource folder declared inside a content entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentFolder {
    /// Folder root.
    pub file: FileId,
    /// What the folder contains.
    pub kind: SourceKind,
    /// Namespace of the folder root itself; descendants append their names.
    pub namespace_prefix: String,
}

impl ContentFolder {
    /// Folder with an empty namespace prefix.
    pub fn new(file: FileId, kind: SourceKind) -> Self {
        Self {
            file,
            kind,
            namespace_prefix: String::new(),
        }
    }

    /// Set the namespace prefix of the folder root.
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }
}

/// One content root of a unit with the folders declared under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    /// The content root.
    pub root: FileId,
    /// Source-like folders.
    pub folders: Vec<ContentFolder>,
    /// Folders excluded from the unit.
    pub excluded: Vec<FileId>,
}

impl ContentEntry {
    /// Content entry with no folders.
    pub fn new(root: FileId) -> Self {
        Self {
            root,
            folders: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Declare a source-like folder.
    pub fn with_folder(mut self, folder: ContentFolder) -> Self {
        self.folders.push(folder);
        self
    }

    /// Declare a source-like folder with an empty namespace prefix.
    pub fn with_source(self, file: FileId, kind: SourceKind) -> Self {
        self.with_folder(ContentFolder::new(file, kind))
    }

    /// Declare an excluded folder.
    pub fn with_excluded(mut self, file: FileId) -> Self {
        self.excluded.push(file);
        self
    }
}

/// A build/content module.
///
/// The dependency list always starts with the unit's own
/// [`DependencyKind::Source`] entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Identity.
    pub id: UnitId,
    /// Display name; dependency entries are ordered by owner name.
    pub name: String,
    /// Content roots with their folders.
    pub content_entries: Vec<ContentEntry>,
    /// Compiler output roots, visible to dependents as binary roots.
    pub output_roots: Vec<FileId>,
    /// Register output roots as excluded from this unit.
    pub exclude_output: bool,
    dependencies: Vec<DependencyEntry>,
}

impl Unit {
    /// Create a unit with only its own source entry.
    pub fn new(id: UnitId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            content_entries: Vec::new(),
            output_roots: Vec::new(),
            exclude_output: true,
            dependencies: vec![DependencyEntry {
                owner: id,
                position: 0,
                kind: DependencyKind::Source,
            }],
        }
    }

    /// Add a content entry.
    pub fn with_content(mut self, entry: ContentEntry) -> Self {
        self.content_entries.push(entry);
        self
    }

    /// Add a compiler output root.
    pub fn with_output(mut self, root: FileId) -> Self {
        self.output_roots.push(root);
        self
    }

    /// Control whether output roots are excluded from the unit's content.
    pub fn with_exclude_output(mut self, exclude: bool) -> Self {
        self.exclude_output = exclude;
        self
    }

    /// Depend on another unit.
    pub fn with_unit_dependency(self, target: UnitId, exported: bool, scope: Scope) -> Self {
        self.push_dependency(DependencyKind::Unit {
            target,
            exported,
            scope,
        })
    }

    /// Depend on a library.
    pub fn with_library_dependency(self, library: LibraryId, exported: bool, scope: Scope) -> Self {
        self.push_dependency(DependencyKind::Library {
            library,
            exported,
            scope,
        })
    }

    fn push_dependency(mut self, kind: DependencyKind) -> Self {
        let position = self.dependencies.len() as u32;
        self.dependencies.push(DependencyEntry {
            owner: self.id,
            position,
            kind,
        });
        self
    }

    /// Ordered dependency entries, starting with the source entry.
    pub fn dependencies(&self) -> &[DependencyEntry] {
        &self.dependencies
    }

    /// The unit's own source entry.
    pub fn source_entry(&self) -> Option<&DependencyEntry> {
        self.dependencies
            .iter()
            .find(|e| matches!(e.kind, DependencyKind::Source))
    }

    /// All declared content roots.
    pub fn content_roots(&self) -> impl Iterator<Item = FileId> + '_ {
        self.content_entries.iter().map(|e| e.root)
    }

    /// All declared source-like folders.
    pub fn folders(&self) -> impl Iterator<Item = &ContentFolder> + '_ {
        self.content_entries.iter().flat_map(|e| e.folders.iter())
    }

    /// All declared excluded folders, without output roots.
    pub fn excluded_roots(&self) -> impl Iterator<Item = FileId> + '_ {
        self.content_entries
            .iter()
            .flat_map(|e| e.excluded.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_unit_has_source_entry() {
        let unit = Unit::new(UnitId(1), "core");
        assert_eq!(unit.dependencies().len(), 1);
        let source = unit.source_entry().expect("source entry");
        assert_eq!(source.owner, UnitId(1));
        assert_eq!(source.position, 0);
        assert!(unit.exclude_output);
    }

    #[test]
    fn test_dependency_positions_follow_declaration_order() {
        let unit = Unit::new(UnitId(1), "app")
            .with_unit_dependency(UnitId(2), true, Scope::Compile)
            .with_library_dependency(LibraryId(7), false, Scope::Test);

        let positions: Vec<_> = unit.dependencies().iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert!(matches!(
            unit.dependencies()[2].kind,
            DependencyKind::Library {
                library: LibraryId(7),
                exported: false,
                scope: Scope::Test
            }
        ));
    }

    #[test]
    fn test_source_kind_flags() {
        assert!(SourceKind::Test.is_test());
        assert!(SourceKind::TestResource.is_test());
        assert!(SourceKind::TestResource.is_resource());
        assert!(!SourceKind::Production.is_test());
        assert_eq!(SourceKind::TestResource.to_string(), "test-resource");
    }

    #[test]
    fn test_content_entry_builder() {
        let entry = ContentEntry::new(FileId(1))
            .with_source(FileId(2), SourceKind::Production)
            .with_folder(
                ContentFolder::new(FileId(3), SourceKind::Test).with_namespace_prefix("com.acme"),
            )
            .with_excluded(FileId(4));

        assert_eq!(entry.folders.len(), 2);
        assert_eq!(entry.folders[1].namespace_prefix, "com.acme");
        assert_eq!(entry.excluded, vec![FileId(4)]);
    }
}
