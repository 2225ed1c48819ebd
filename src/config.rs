//! Configuration System
//!
//! Layered configuration for the generation pipeline: built-in defaults, the
//! global config file, workspace config files and `ITINERA__*` environment
//! variables, in increasing order of precedence. The loaded configuration is
//! read once at startup and never mutated afterwards.

use crate::error::ApiError;
use crate::generation::DEFAULT_SYSTEM_PROMPT;
use crate::logging::LoggingConfig;
use crate::schema::MAX_ACTIVITIES;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::provider::{ProviderConfig, ProviderType};

mod merge;
mod sources;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraConfig {
    /// Backend the pipeline talks to
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Prompt and contract settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// System message sent with every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Maximum activities requested per city (1..=12)
    #[serde(default = "default_activity_cap")]
    pub activity_cap: usize,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_activity_cap() -> usize {
    MAX_ACTIVITIES
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            activity_cap: default_activity_cap(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.system_prompt.trim().is_empty() {
            return Err("System prompt cannot be empty".to_string());
        }
        if self.activity_cap == 0 || self.activity_cap > MAX_ACTIVITIES {
            return Err(format!(
                "activity_cap must be between 1 and {}, got {}",
                MAX_ACTIVITIES, self.activity_cap
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Provider(String),
    Generation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ItineraConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.generation.validate() {
            errors.push(ValidationError::Generation(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every error into one `ApiError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    pub fn to_toml(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))
    }
}

/// Loads `ItineraConfig` from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, `config/config.toml`,
    /// `config/{ITINERA_ENV}.toml`, `ITINERA__SECTION__KEY` environment variables.
    pub fn load(workspace_root: &Path) -> Result<ItineraConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder.add_source(env_source()).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load a single file over the defaults, skipping the global and workspace files.
    pub fn load_from_file(path: &Path) -> Result<ItineraConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge::merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(env_source())
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Defaults only.
    pub fn default() -> ItineraConfig {
        merge::merge_policy::builder_with_defaults()
            .and_then(|builder| builder.build())
            .and_then(|config| config.try_deserialize())
            .unwrap_or_default()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("ITINERA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
