//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path`
//! over the index settings file.

use std::path::Path;

use clap::Subcommand;
use rootindex::config::{config_file_path, ConfigKey, IndexConfig};

use crate::commands::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., index.max_ancestor_depth)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., logging.level)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against `path`, or the default file.
pub fn run(command: ConfigCommands, path: Option<&Path>) -> Result<(), CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);

    match command {
        ConfigCommands::Get { key } => run_get(&path, &key),
        ConfigCommands::Set { key, value } => run_set(&path, &key, &value),
        ConfigCommands::List => run_list(&path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'rootindex config list' to see available keys.",
            key
        ))
    })
}

fn run_get(path: &Path, key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = load_config(Some(path))?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(path: &Path, key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let mut config = load_config(Some(path))?;
    config_key.set(&mut config, value)?;
    config.save_to(path)?;

    println!("Set {} = {}", config_key.name(), value);
    Ok(())
}

fn run_list(path: &Path) -> Result<(), CliError> {
    let config = load_config(Some(path))?;
    print!("{}", render_list(&config));
    Ok(())
}

/// Settings grouped by section, as printed by `config list`.
fn render_list(config: &IndexConfig) -> String {
    let mut out = String::from("Configuration Settings\n======================\n\n");
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            if !current_section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section));
            current_section = section;
        }

        let value = key.get(config);
        if value.is_empty() {
            out.push_str(&format!("  {} = (not set)\n", key.key_name()));
        } else {
            out.push_str(&format!("  {} = {}\n", key.key_name(), value));
        }
    }
    out
}
