//! Classification record for a directory.

use std::fmt;

use crate::model::{ContentFolder, SourceKind, UnitId};
use crate::vfs::FileId;

/// Overall status of a classified directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoKind {
    /// Belongs to a unit's content, a library, or both.
    InProject,
    /// Under an exclusion that no nearer content root overrides.
    Excluded,
    /// Name matches the ignore policy, or an ancestor's does.
    Ignored,
    /// Not under any known root.
    NotUnderProject,
}

impl fmt::Display for InfoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoKind::InProject => write!(f, "in-project"),
            InfoKind::Excluded => write!(f, "excluded"),
            InfoKind::Ignored => write!(f, "ignored"),
            InfoKind::NotUnderProject => write!(f, "not-under-project"),
        }
    }
}

/// Everything the index knows about one directory.
///
/// Records are immutable and shared (`Arc`) between every directory below the
/// same nearest root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryInfo {
    pub(crate) kind: InfoKind,
    pub(crate) root: Option<FileId>,
    pub(crate) owning_unit: Option<UnitId>,
    pub(crate) nearest_content_root: Option<FileId>,
    pub(crate) nearest_source_root: Option<FileId>,
    pub(crate) content_folder: Option<ContentFolder>,
    pub(crate) library_class_root: Option<FileId>,
    pub(crate) in_module_source: bool,
    pub(crate) in_library_source: bool,
}

impl DirectoryInfo {
    fn sentinel(kind: InfoKind) -> Self {
        Self {
            kind,
            root: None,
            owning_unit: None,
            nearest_content_root: None,
            nearest_source_root: None,
            content_folder: None,
            library_class_root: None,
            in_module_source: false,
            in_library_source: false,
        }
    }

    /// Record for ignored directories.
    pub fn ignored() -> Self {
        Self::sentinel(InfoKind::Ignored)
    }

    /// Record for directories outside every root.
    pub fn not_under_project() -> Self {
        Self::sentinel(InfoKind::NotUnderProject)
    }

    /// Record for excluded directories with no enclosing content root.
    pub fn excluded() -> Self {
        Self::sentinel(InfoKind::Excluded)
    }

    /// Excluded record that still remembers its enclosing content root.
    pub(crate) fn excluded_in_content(root: FileId, content_root: FileId) -> Self {
        Self {
            root: Some(root),
            nearest_content_root: Some(content_root),
            ..Self::sentinel(InfoKind::Excluded)
        }
    }

    pub fn kind(&self) -> InfoKind {
        self.kind
    }

    /// The root this record was computed for; `None` for shared sentinels.
    pub fn root(&self) -> Option<FileId> {
        self.root
    }

    /// Unit whose content contains the directory.
    pub fn owning_unit(&self) -> Option<UnitId> {
        self.owning_unit
    }

    pub fn nearest_content_root(&self) -> Option<FileId> {
        self.nearest_content_root
    }

    /// Nearest unit source root or library source root.
    pub fn nearest_source_root(&self) -> Option<FileId> {
        self.nearest_source_root
    }

    pub fn content_folder(&self) -> Option<&ContentFolder> {
        self.content_folder.as_ref()
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        self.content_folder.as_ref().map(|f| f.kind)
    }

    pub fn library_class_root(&self) -> Option<FileId> {
        self.library_class_root
    }

    pub fn has_library_class_root(&self) -> bool {
        self.library_class_root.is_some()
    }

    /// Inside a source-like folder of a unit.
    pub fn is_in_module_source(&self) -> bool {
        self.in_module_source
    }

    /// Inside a library source root.
    pub fn is_in_library_source(&self) -> bool {
        self.in_library_source
    }

    pub fn is_in_project(&self) -> bool {
        self.kind == InfoKind::InProject
    }

    pub fn is_excluded(&self) -> bool {
        self.kind == InfoKind::Excluded
    }

    pub fn is_ignored(&self) -> bool {
        self.kind == InfoKind::Ignored
    }

    pub fn is_not_under_project(&self) -> bool {
        self.kind == InfoKind::NotUnderProject
    }

    /// In a unit's test sources or test resources.
    pub fn is_in_test_source(&self) -> bool {
        self.in_module_source && self.source_kind().is_some_and(|k| k.is_test())
    }
}

impl fmt::Display for DirectoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(unit) = self.owning_unit {
            write!(f, " unit={}", unit)?;
        }
        if let Some(root) = self.nearest_content_root {
            write!(f, " content={}", root)?;
        }
        if let Some(root) = self.nearest_source_root {
            write!(f, " source={}", root)?;
        }
        if let Some(kind) = self.source_kind() {
            write!(f, " kind={}", kind)?;
        }
        if let Some(root) = self.library_class_root {
            write!(f, " classes={}", root)?;
        }
        if self.in_library_source {
            write!(f, " library-source")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert!(DirectoryInfo::ignored().is_ignored());
        assert!(DirectoryInfo::not_under_project().is_not_under_project());

        let excluded = DirectoryInfo::excluded();
        assert!(excluded.is_excluded());
        assert!(!excluded.is_in_project());
        assert_eq!(excluded.owning_unit(), None);
        assert_eq!(excluded.nearest_content_root(), None);
    }

    #[test]
    fn test_excluded_in_content_keeps_content_root() {
        let info = DirectoryInfo::excluded_in_content(FileId(5), FileId(2));
        assert!(info.is_excluded());
        assert_eq!(info.owning_unit(), None);
        assert_eq!(info.nearest_content_root(), Some(FileId(2)));
        assert_eq!(info.root(), Some(FileId(5)));
    }

    #[test]
    fn test_test_source_flag() {
        let info = DirectoryInfo {
            kind: InfoKind::InProject,
            content_folder: Some(ContentFolder::new(FileId(3), SourceKind::TestResource)),
            in_module_source: true,
            ..DirectoryInfo::not_under_project()
        };
        assert!(info.is_in_test_source());
        assert_eq!(info.source_kind(), Some(SourceKind::TestResource));
        assert_eq!(info.to_string(), "in-project kind=test-resource");
    }
}
