//! RootIndex CLI - query workspace root classification.
//!
//! Every query command scans the paths a workspace manifest declares, builds
//! one index generation and answers from it.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rootindex::logging::init_logging;
use tracing::error;

use commands::common::{load_config, load_workspace};
use commands::config::ConfigCommands;
use error::CliError;

/// Classify workspace paths against unit and library roots.
#[derive(Debug, Parser)]
#[command(name = "rootindex", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace manifest (JSON)
    #[arg(short, long, global = true, default_value = "rootindex.json")]
    manifest: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    #[command(flatten)]
    Query(QueryCommands),
}

/// Commands answered from a freshly built index.
#[derive(Debug, Subcommand)]
enum QueryCommands {
    /// Show how paths are classified
    Classify {
        /// Paths to classify
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show the dependency entries through which a path is visible
    Entries {
        /// File or directory
        path: PathBuf,
    },

    /// List directories carrying a namespace
    Namespace {
        /// Dotted namespace; empty for the default namespace
        name: String,

        /// Include library source roots
        #[arg(long)]
        with_library_sources: bool,
    },

    /// Walk content, skipping excluded and ignored entries
    Iterate {
        /// Only walk under this directory
        #[arg(long)]
        under: Option<PathBuf>,

        /// Only print directories
        #[arg(long)]
        directories: bool,
    },

    /// Dump the root catalog
    Roots,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let query = match cli.command {
        Commands::Config { command } => {
            return commands::config::run(command, cli.config.as_deref())
        }
        Commands::Query(query) => query,
    };

    let config = load_config(cli.config.as_deref())?;
    let _logging = init_logging(&config.log_level, config.log_file.as_deref());
    let workspace = load_workspace(&cli.manifest, &config)?;

    match query {
        QueryCommands::Classify { paths } => commands::classify::run(&workspace, &paths),
        QueryCommands::Entries { path } => commands::entries::run(&workspace, &path),
        QueryCommands::Namespace {
            name,
            with_library_sources,
        } => commands::namespace::run(&workspace, &name, with_library_sources),
        QueryCommands::Iterate { under, directories } => {
            commands::iterate::run(&workspace, under.as_deref(), directories)
        }
        QueryCommands::Roots => commands::roots::run(&workspace),
    }
}
