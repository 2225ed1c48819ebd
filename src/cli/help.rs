//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::{Commands, ConfigCommands};

/// Command name string for log spans (e.g. "itinerary", "config.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Activities { .. } => "activities".to_string(),
        Commands::Itinerary { .. } => "itinerary".to_string(),
        Commands::Chat { .. } => "chat".to_string(),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show => "show",
        ConfigCommands::Validate => "validate",
    }
}
