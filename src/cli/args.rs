//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// relay - run commands implemented by registry packages
///
/// Each command is served by a separately published package that relay
/// installs into a local cache and runs in its own process.
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run the command from this local package directory instead of the cache.
    /// Place it before the command name; for plugin commands everything after
    /// the name is handed to the plugin.
    #[arg(long, global = true, env = "RELAY_TARGET_PATH")]
    pub target_path: Option<PathBuf>,

    /// relay home directory (defaults to ~/.relay-cli)
    #[arg(long, global = true, env = "RELAY_HOME")]
    pub home: Option<PathBuf>,

    /// Skip the check for a newer relay release
    #[arg(long, global = true)]
    pub no_update_check: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project
    Init(InitArgs),

    /// Inspect the package cache
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: Shell,
    },

    /// Any other command from the [commands] table
    #[command(external_subcommand)]
    External(Vec<String>),
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Name of the project to create
    pub project_name: Option<String>,

    /// Initialize even if the current directory is not empty
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List installed packages
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the cache store directory
    Path,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Config action (defaults to show)
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
