//! JSON workspace manifest.
//!
//! A manifest declares units, libraries and workspace-wide exclusions by
//! absolute path. [`WorkspaceManifest::resolve`] maps those paths onto a
//! [`MemoryTree`]; roots that do not exist in the tree are dropped with a
//! warning, the same way a missing directory never becomes a root.
//!
//! # Example
//!
//! ```
//! use rootindex::model::WorkspaceManifest;
//!
//! let manifest = WorkspaceManifest::from_json_str(r#"{
//!     "units": [{
//!         "name": "app",
//!         "content": [{
//!             "root": "/proj/app",
//!             "sources": [{ "path": "/proj/app/src", "kind": "production" }],
//!             "excluded": ["/proj/app/build"]
//!         }],
//!         "dependencies": [{ "library": "junit", "scope": "test" }]
//!     }],
//!     "libraries": [{ "name": "junit", "binary_roots": ["/repo/junit.jar"] }]
//! }"#).unwrap();
//!
//! assert_eq!(manifest.units.len(), 1);
//! assert_eq!(manifest.libraries[0].name, "junit");
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::dependency::Scope;
use super::library::{Library, LibraryId};
use super::unit::{ContentEntry, ContentFolder, SourceKind, Unit, UnitId};
use crate::vfs::{FileId, MemoryTree};

/// Errors that can occur while loading or resolving a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest is not valid JSON for this schema.
    #[error("Failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// A dependency names a unit that is not declared.
    #[error("Unit '{owner}' depends on unknown unit '{target}'")]
    UnknownUnit { owner: String, target: String },

    /// A dependency names a library that is not declared.
    #[error("Unit '{owner}' depends on unknown library '{target}'")]
    UnknownLibrary { owner: String, target: String },

    /// Two units share a name.
    #[error("Duplicate unit name '{0}'")]
    DuplicateUnit(String),
}

/// Root of the manifest document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    #[serde(default)]
    pub units: Vec<UnitManifest>,
    #[serde(default)]
    pub libraries: Vec<LibraryManifest>,
    /// Workspace-wide excluded roots.
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// A unit declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitManifest {
    pub name: String,
    #[serde(default)]
    pub content: Vec<ContentManifest>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default = "default_true")]
    pub exclude_output: bool,
    #[serde(default)]
    pub dependencies: Vec<DependencyManifest>,
}

/// A content root with its folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentManifest {
    pub root: String,
    #[serde(default)]
    pub sources: Vec<FolderManifest>,
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// A source-like folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderManifest {
    pub path: String,
    #[serde(default = "default_kind")]
    pub kind: SourceKind,
    #[serde(default)]
    pub namespace_prefix: String,
}

/// A dependency declaration, on either a unit or a library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyManifest {
    Unit {
        unit: String,
        #[serde(default)]
        exported: bool,
        #[serde(default)]
        scope: Scope,
    },
    Library {
        library: String,
        #[serde(default)]
        exported: bool,
        #[serde(default)]
        scope: Scope,
    },
}

/// A library declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryManifest {
    pub name: String,
    #[serde(default)]
    pub binary_roots: Vec<String>,
    #[serde(default)]
    pub source_roots: Vec<String>,
    #[serde(default)]
    pub excluded_roots: Vec<String>,
}

/// Declarations resolved against a tree.
#[derive(Debug, Clone, Default)]
pub struct ResolvedWorkspace {
    pub units: Vec<Unit>,
    pub libraries: Vec<Library>,
    pub excluded: Vec<FileId>,
}

fn default_true() -> bool {
    true
}

fn default_kind() -> SourceKind {
    SourceKind::Production
}

impl WorkspaceManifest {
    /// Load a manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parse a manifest from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every path the manifest mentions, outermost first, with paths nested
    /// under an earlier entry removed.
    ///
    /// Scanning these into a tree covers every declared root exactly once.
    pub fn scan_roots(&self) -> Vec<PathBuf> {
        let mut all = BTreeSet::new();
        for unit in &self.units {
            for content in &unit.content {
                all.insert(content.root.clone());
                all.extend(content.sources.iter().map(|s| s.path.clone()));
                all.extend(content.excluded.iter().cloned());
            }
            all.extend(unit.outputs.iter().cloned());
        }
        for library in &self.libraries {
            all.extend(library.binary_roots.iter().cloned());
            all.extend(library.source_roots.iter().cloned());
            all.extend(library.excluded_roots.iter().cloned());
        }
        all.extend(self.excluded.iter().cloned());

        let mut result: Vec<String> = Vec::new();
        for path in all {
            let path = path.trim_end_matches('/').to_string();
            let nested = result
                .iter()
                .any(|outer| path == *outer || path.starts_with(&format!("{}/", outer)));
            if !nested {
                result.push(path);
            }
        }
        result.into_iter().map(PathBuf::from).collect()
    }

    /// Map every declared path onto `tree`.
    ///
    /// Unit ids follow declaration order, and so do library ids.
    pub fn resolve(&self, tree: &MemoryTree) -> Result<ResolvedWorkspace, ManifestError> {
        let mut unit_ids = HashMap::new();
        for (i, unit) in self.units.iter().enumerate() {
            if unit_ids.insert(unit.name.clone(), UnitId(i as u32)).is_some() {
                return Err(ManifestError::DuplicateUnit(unit.name.clone()));
            }
        }
        let library_ids: HashMap<_, _> = self
            .libraries
            .iter()
            .enumerate()
            .map(|(i, l)| (l.name.clone(), LibraryId(i as u32)))
            .collect();

        let lookup = |path: &str| -> Option<FileId> {
            let found = tree.lookup(path);
            if found.is_none() {
                warn!(path, "Declared root does not exist, skipping");
            }
            found
        };

        let mut units = Vec::with_capacity(self.units.len());
        for unit_manifest in &self.units {
            let mut unit = Unit::new(unit_ids[&unit_manifest.name], &unit_manifest.name)
                .with_exclude_output(unit_manifest.exclude_output);

            for content in &unit_manifest.content {
                let Some(root) = lookup(&content.root) else {
                    continue;
                };
                let mut entry = ContentEntry::new(root);
                for folder in &content.sources {
                    if let Some(file) = lookup(&folder.path) {
                        entry = entry.with_folder(
                            ContentFolder::new(file, folder.kind)
                                .with_namespace_prefix(&folder.namespace_prefix),
                        );
                    }
                }
                for excluded in &content.excluded {
                    if let Some(file) = lookup(excluded) {
                        entry = entry.with_excluded(file);
                    }
                }
                unit = unit.with_content(entry);
            }

            for output in &unit_manifest.outputs {
                if let Some(file) = lookup(output) {
                    unit = unit.with_output(file);
                }
            }

            for dependency in &unit_manifest.dependencies {
                unit = match dependency {
                    DependencyManifest::Unit {
                        unit: target,
                        exported,
                        scope,
                    } => {
                        let id = unit_ids.get(target).copied().ok_or_else(|| {
                            ManifestError::UnknownUnit {
                                owner: unit_manifest.name.clone(),
                                target: target.clone(),
                            }
                        })?;
                        unit.with_unit_dependency(id, *exported, *scope)
                    }
                    DependencyManifest::Library {
                        library,
                        exported,
                        scope,
                    } => {
                        let id = library_ids.get(library).copied().ok_or_else(|| {
                            ManifestError::UnknownLibrary {
                                owner: unit_manifest.name.clone(),
                                target: library.clone(),
                            }
                        })?;
                        unit.with_library_dependency(id, *exported, *scope)
                    }
                };
            }
            units.push(unit);
        }

        let libraries = self
            .libraries
            .iter()
            .map(|l| {
                let mut library = Library::new(library_ids[&l.name], &l.name);
                library.binary_roots = l.binary_roots.iter().filter_map(|p| lookup(p)).collect();
                library.source_roots = l.source_roots.iter().filter_map(|p| lookup(p)).collect();
                library.excluded_roots =
                    l.excluded_roots.iter().filter_map(|p| lookup(p)).collect();
                library
            })
            .collect();

        let excluded = self.excluded.iter().filter_map(|p| lookup(p)).collect();

        Ok(ResolvedWorkspace {
            units,
            libraries,
            excluded,
        })
    }
}
