use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "doc-tidy")]
#[command(about = "Pattern-based markdown document organizer with AI fallback")]
#[command(version)]
pub struct Cli {
    /// Target directory to analyze (default: current directory)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Execute suggested moves instead of only reporting them
    #[arg(long)]
    pub apply: bool,

    /// Preview moves without renaming anything (use with --apply)
    #[arg(long, requires = "apply")]
    pub dry_run: bool,

    /// Ask Claude CLI to classify low-confidence documents
    #[arg(long, global = true)]
    pub ai: bool,

    /// Print the structured report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: <DIR>/doc-tidy.toml, then ~/.doc-tidy/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check documentation health (score, naming, stale, orphaned docs)
    Health {
        /// Target directory (default: current directory)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value by dot-notation key
    Get { key: String },

    /// Set a config value in the global config file
    Set { key: String, value: String },

    /// List all config keys with their current values
    List,

    /// Print the global config file path
    Path,

    /// Create the global config file with a commented template
    Init,
}
