//! RootIndex - path classification for multi-unit workspaces
//!
//! This library classifies every directory of a workspace against the roots
//! declared by its build units and libraries: which unit owns a path, which
//! source or library root encloses it, whether it is excluded or ignored, what
//! namespace it carries, and which dependency entries make it visible to
//! other units.
//!
//! Start with [`index::RootIndex`]; feed it a [`vfs::FileTree`] and the
//! providers from [`model`].

pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod model;
pub mod telemetry;
pub mod vfs;

pub use error::IndexError;
pub use index::{DirectoryInfo, Generation, RootIndex};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
