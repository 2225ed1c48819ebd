//! CLI route: single route table and run context. Dispatches to the pipeline and presentation.

use crate::cli::help::command_name;
use crate::cli::output::{map_error, CommandError};
use crate::cli::parse::{Commands, ConfigCommands, OutputFormat};
use crate::cli::presentation::{
    format_activities_text, format_chat_reply_text, format_config_validation,
    format_itinerary_text, format_json,
};
use crate::cli::retry::RetryPolicy;
use crate::config::{ConfigLoader, ItineraConfig};
use crate::pipeline::Pipeline;
use crate::types::{ChatExchange, ChatTurn, TripRequest};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span, Instrument};

/// Runtime context for CLI execution: loaded configuration, output format and retry policy.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    config: ItineraConfig,
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    retry: RetryPolicy,
}

impl RunContext {
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        format: OutputFormat,
        retries: u32,
    ) -> Result<Self, CommandError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(
            config,
            workspace_root,
            config_path,
            format,
            RetryPolicy::with_retries(retries),
        ))
    }

    pub fn with_config(
        config: ItineraConfig,
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        format: OutputFormat,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            config,
            workspace_root,
            config_path,
            format,
            retry,
        }
    }

    pub fn config(&self) -> &ItineraConfig {
        &self.config
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, CommandError> {
        let name = command_name(command);
        let started = Instant::now();
        let result = self
            .execute_inner(command)
            .instrument(info_span!("command", name = %name))
            .await;
        info!(
            command = %name,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, CommandError> {
        match command {
            Commands::Activities { city } => {
                let pipeline = self.pipeline()?;
                let response = self
                    .retry
                    .run(|| pipeline.generate_activities(city))
                    .await?;
                match self.format {
                    OutputFormat::Json => format_json(&response),
                    OutputFormat::Text => Ok(format_activities_text(city, &response)),
                }
            }
            Commands::Itinerary { request } => {
                let trip: TripRequest = read_json(request)?;
                let pipeline = self.pipeline()?;
                let response = self
                    .retry
                    .run(|| pipeline.generate_itinerary(&trip))
                    .await?;
                match self.format {
                    OutputFormat::Json => format_json(&response),
                    OutputFormat::Text => Ok(format_itinerary_text(&response)),
                }
            }
            Commands::Chat {
                conversation: Some(path),
                message,
            } => {
                let mut exchange: ChatExchange = read_json(path)?;
                if let Some(text) = message {
                    exchange.push(ChatTurn::user(text.clone()));
                }
                if exchange.is_empty() {
                    return Err(CommandError::Input(format!(
                        "Conversation {} has no turns",
                        path.display()
                    )));
                }
                let pipeline = self.pipeline()?;
                let reply = self
                    .retry
                    .run(|| pipeline.generate_chat_reply(&exchange))
                    .await?;
                match self.format {
                    OutputFormat::Json => format_json(&reply),
                    OutputFormat::Text => Ok(format_chat_reply_text(&reply)),
                }
            }
            Commands::Chat {
                conversation: None,
                ..
            } => self.chat_interactive().await,
            Commands::Config { command } => self.handle_config_command(command),
        }
    }

    /// Build the process-wide backend. Config commands never need one.
    fn pipeline(&self) -> Result<Pipeline, CommandError> {
        self.config.ensure_valid()?;
        Ok(Pipeline::from_config(&self.config)?)
    }

    fn handle_config_command(&self, command: &ConfigCommands) -> Result<String, CommandError> {
        match command {
            ConfigCommands::Show => {
                let source = match &self.config_path {
                    Some(path) => path.display().to_string(),
                    None => format!("layered from {}", self.workspace_root.display()),
                };
                match self.format {
                    OutputFormat::Json => format_json(&self.config),
                    OutputFormat::Text => Ok(format!("# {}\n{}", source, self.config.to_toml()?)),
                }
            }
            ConfigCommands::Validate => {
                let errors = self.config.validate().err().unwrap_or_default();
                let provider = self.config.provider.diagnose();
                let rendered =
                    format_config_validation(&errors, &provider, self.format == OutputFormat::Json);
                if errors.is_empty() && provider.is_valid() {
                    Ok(rendered)
                } else {
                    Err(CommandError::Input(rendered))
                }
            }
        }
    }

    /// Read-eval loop over one growing exchange. Turns are only ever appended.
    async fn chat_interactive(&self) -> Result<String, CommandError> {
        use dialoguer::Input;

        let pipeline = self.pipeline()?;
        let mut exchange = ChatExchange::new();
        println!(
            "Chatting with {} ({}). Empty line or 'exit' to quit.",
            pipeline.provider_name(),
            pipeline.model_name()
        );
        loop {
            let line: String = Input::new()
                .with_prompt("you")
                .allow_empty(true)
                .interact_text()
                .map_err(|e| CommandError::Input(format!("Failed to get user input: {}", e)))?;
            let line = line.trim();
            if line.is_empty() || line == "exit" || line == "quit" {
                break;
            }
            exchange.push(ChatTurn::user(line));

            match self
                .retry
                .run(|| pipeline.generate_chat_reply(&exchange))
                .await
            {
                Ok(reply) => {
                    println!("{}", format_chat_reply_text(&reply));
                    exchange.push(ChatTurn::assistant(reply.reply));
                }
                Err(e) => eprintln!("{}", map_error(&CommandError::Generation(e), self.format)),
            }
        }
        Ok(format!("{} turn(s) exchanged", exchange.turns().len()))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CommandError::Input(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| CommandError::Input(format!("Failed to parse {}: {}", path.display(), e)))
}
