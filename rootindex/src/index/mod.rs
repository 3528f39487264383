//! The root index engine.
//!
//! Classifies every path of a [`FileTree`](crate::vfs::FileTree) against the
//! roots declared by units and libraries, answers reverse namespace lookups,
//! and reports which dependency entries make a path visible.
//!
//! # Architecture
//!
//! ```text
//!  UnitProvider ─┐
//!  LibraryProvider ─┼──► RootCatalog ──► hierarchy walk ──► Classifier
//!  ExcludePolicy ─┘      (collect)        per root            │
//!                                                             ▼
//!                                 ┌───────────── Generation ─────────────┐
//!                                 │ InfoCache (seeded roots + DashMap)    │
//!                                 │ NamespaceIndex (DashMap + negatives)  │
//!                                 │ dependency map (OnceLock, lazy)       │
//!                                 └───────────────────┬──────────────────┘
//!                                                     │ Arc swap
//!                                                     ▼
//!                                                 RootIndex
//! ```
//!
//! A [`Generation`] is immutable once built. [`RootIndex::rebuild`] builds the
//! next one from the providers and swaps it in under a write lock; readers
//! that already hold an `Arc<Generation>` keep a consistent view.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rootindex::config::IndexConfig;
//! use rootindex::index::{IndexSources, RootIndex};
//! use rootindex::model::{ContentEntry, SourceKind, Unit, UnitId, WorkspaceModel};
//! use rootindex::vfs::MemoryTree;
//!
//! let mut tree = MemoryTree::new();
//! let m = tree.mkdirs("/proj/m");
//! let src = tree.mkdirs("/proj/m/src");
//! let pkg = tree.mkdirs("/proj/m/src/pkg");
//!
//! let unit = Unit::new(UnitId(0), "m")
//!     .with_content(ContentEntry::new(m).with_source(src, SourceKind::Production));
//! let model = Arc::new(WorkspaceModel::with_declarations(vec![unit], vec![]));
//! let sources = IndexSources::new(Arc::new(tree), model.clone(), model);
//! let index = RootIndex::new(sources, IndexConfig::default()).unwrap();
//!
//! let info = index.classify(pkg);
//! assert_eq!(info.owning_unit(), Some(UnitId(0)));
//! assert_eq!(index.namespace_of(pkg).as_deref(), Some("pkg"));
//! ```

mod cache;
mod catalog;
mod classifier;
mod generation;
mod hierarchy;
mod info;
mod namespace;
mod query;
mod root_index;
mod visibility;

pub use catalog::{RootCatalog, RootTag};
pub use generation::Generation;
pub use info::{DirectoryInfo, InfoKind};
pub use root_index::{needs_rebuild, FsEvent, FsEventKind, IndexSources, RootIndex};
