//! CLI error type.

use rootindex::config::ConfigError;
use rootindex::model::ManifestError;
use rootindex::IndexError;
use thiserror::Error;

/// Everything a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded, parsed or saved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The workspace manifest is unreadable or inconsistent.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// The index could not be built.
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// A path argument is not part of the scanned workspace.
    #[error("Path '{0}' is not part of the scanned workspace")]
    UnknownPath(String),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
