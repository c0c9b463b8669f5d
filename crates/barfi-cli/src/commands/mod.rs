//! CLI command definitions and handlers.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Load configuration with graceful fallback to defaults.
///
/// If the config file doesn't exist or can't be parsed, it falls back to defaults.
pub fn load_config() -> barfi_core::config::Config {
    barfi_core::config::Config::load().unwrap_or_default()
}

pub mod completions;
pub mod config;
pub mod upload;

/// Barfi - Upload a file to a file-hosting service
#[derive(Parser, Debug)]
#[command(name = "barfi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logs
    #[arg(long, global = true)]
    pub debug: bool,

    /// Do not print progress or logs, only the link and errors
    #[arg(short, long, global = true)]
    pub silent: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a file and print its link
    Upload(UploadArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the upload command
#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// File to upload
    pub file: PathBuf,

    /// Auth token of your account
    #[arg(short, long, env = "BARFI_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Id of the directory the file is uploaded to (requires a token)
    #[arg(short, long = "dir", value_name = "ID")]
    pub directory_id: Option<String>,

    /// Override the service endpoint
    #[arg(long, env = "BARFI_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Override the part size in bytes
    #[arg(long, hide = true)]
    pub chunk_size: Option<u64>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value (empty value clears it)
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,
    },

    /// Show all configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Reset to defaults
    Reset,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,
}

/// Supported shells
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell
    Elvish,
}
