//! CLI parse: clap types for Itinera. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Itinera CLI - Structured travel generation
#[derive(Parser)]
#[command(name = "itinera")]
#[command(about = "Generate validated activities, itineraries and chat replies from a language model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/ is read from here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Output format for results and failures
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Retry backend failures this many times (malformed or invalid output is never retried)
    #[arg(long, default_value = "0")]
    pub retries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Suggest activities for a city
    Activities {
        /// City name
        city: String,
    },
    /// Build an itinerary from a trip request JSON file
    Itinerary {
        /// Path to a trip request (name, description, start_date, end_date, activities)
        #[arg(long)]
        request: PathBuf,
    },
    /// Reply to a conversation; interactive when no conversation file is given
    Chat {
        /// Path to a conversation JSON file ({"conversation": [{"role", "text"}]})
        #[arg(long)]
        conversation: Option<PathBuf>,
        /// Append this user message to the conversation before replying
        #[arg(long, requires = "conversation")]
        message: Option<String>,
    },
    /// Inspect the loaded configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the effective configuration and provider settings
    Validate,
}
