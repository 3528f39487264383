//! Index configuration stored as an INI file.
//!
//! ```ini
//! [index]
//! max_ancestor_depth = 1000
//! parallel_catalog = true
//!
//! [ignore]
//! patterns = CVS;.git;.svn;*~
//!
//! [logging]
//! level = info
//! file = /var/log/rootindex.log
//! ```
//!
//! Missing keys fall back to defaults. [`ConfigKey`] addresses individual
//! settings as `section.key` for command-line get/set.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::vfs::{IgnorePatterns, DEFAULT_IGNORED_PATTERNS};

/// Default bound on parent links followed by a single lookup.
pub const DEFAULT_MAX_ANCESTOR_DEPTH: usize = 1000;

/// Default log level filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors that can occur while loading or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid INI.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// No such `section.key`.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// A value does not parse for its key.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Runtime configuration of the root index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Parent links a lookup may follow before the tree is declared cyclic.
    pub max_ancestor_depth: usize,
    /// Collect catalog roots from units in parallel.
    pub parallel_catalog: bool,
    /// Glob patterns for ignored entry names.
    pub ignored_patterns: Vec<String>,
    /// Tracing filter directive.
    pub log_level: String,
    /// Optional log file; logs go to stderr when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
            parallel_catalog: true,
            ignored_patterns: DEFAULT_IGNORED_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
        }
    }
}

impl IndexConfig {
    /// Load from the default location, or defaults when the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ini_str(&contents)
    }

    /// Parse INI text.
    pub fn from_ini_str(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        for key in ConfigKey::all() {
            if let Some(value) = ini.section(Some(key.section())).and_then(|s| s.get(key.key_name()))
            {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Render as INI text.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Save to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }

    /// Compile the ignore patterns.
    pub fn ignore_patterns(&self) -> IgnorePatterns {
        IgnorePatterns::new(&self.ignored_patterns)
    }
}

/// Default configuration file path: `<config dir>/rootindex/config.ini`.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rootindex")
        .join("config.ini")
}

/// A single addressable configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    MaxAncestorDepth,
    ParallelCatalog,
    IgnorePatterns,
    LogLevel,
    LogFile,
}

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::MaxAncestorDepth,
            ConfigKey::ParallelCatalog,
            ConfigKey::IgnorePatterns,
            ConfigKey::LogLevel,
            ConfigKey::LogFile,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::MaxAncestorDepth | ConfigKey::ParallelCatalog => "index",
            ConfigKey::IgnorePatterns => "ignore",
            ConfigKey::LogLevel | ConfigKey::LogFile => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::MaxAncestorDepth => "max_ancestor_depth",
            ConfigKey::ParallelCatalog => "parallel_catalog",
            ConfigKey::IgnorePatterns => "patterns",
            ConfigKey::LogLevel => "level",
            ConfigKey::LogFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as text; empty when unset.
    pub fn get(&self, config: &IndexConfig) -> String {
        match self {
            ConfigKey::MaxAncestorDepth => config.max_ancestor_depth.to_string(),
            ConfigKey::ParallelCatalog => config.parallel_catalog.to_string(),
            ConfigKey::IgnorePatterns => config.ignored_patterns.join(";"),
            ConfigKey::LogLevel => config.log_level.clone(),
            ConfigKey::LogFile => config
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it.
    pub fn set(&self, config: &mut IndexConfig, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::MaxAncestorDepth => {
                let depth: usize = value.parse().map_err(|_| invalid("expected an integer"))?;
                if depth == 0 {
                    return Err(invalid("must be at least 1"));
                }
                config.max_ancestor_depth = depth;
            }
            ConfigKey::ParallelCatalog => {
                config.parallel_catalog = match value.to_lowercase().as_str() {
                    "true" | "yes" | "1" | "on" => true,
                    "false" | "no" | "0" | "off" => false,
                    _ => return Err(invalid("expected true or false")),
                };
            }
            ConfigKey::IgnorePatterns => {
                config.ignored_patterns = value
                    .split(';')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect();
            }
            ConfigKey::LogLevel => {
                if value.is_empty() {
                    return Err(invalid("must not be empty"));
                }
                config.log_level = value.to_string();
            }
            ConfigKey::LogFile => {
                config.log_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
