//! Workspace declarations: units, libraries and dependency entries.
//!
//! These are plain values handed to the index by providers. The index never
//! mutates them; a change in declarations means building a new generation.

mod dependency;
mod library;
mod manifest;
mod provider;
mod unit;

pub use dependency::{DependencyEntry, DependencyKind, Scope};
pub use library::{Library, LibraryId};
pub use manifest::{
    ContentManifest, DependencyManifest, FolderManifest, LibraryManifest, ManifestError,
    ResolvedWorkspace, UnitManifest, WorkspaceManifest,
};
pub use provider::{
    ExcludePolicy, LibraryProvider, ProviderError, StaticExcludes, UnitProvider, WorkspaceModel,
};
pub use unit::{ContentEntry, ContentFolder, SourceKind, Unit, UnitId};
