//! Provider profile: the configured backend and how it turns into a client.

use crate::error::ApiError;
use crate::provider::{CompletionOptions, ModelProvider};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
    #[serde(rename = "local")]
    LocalCustom,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Ollama => "ollama",
            ProviderType::LocalCustom => "local",
        }
    }

    /// Conventional environment variable holding the API key, if the provider needs one.
    pub fn standard_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderType::Ollama | ProviderType::LocalCustom => None,
        }
    }
}

/// Backend selection as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub model: String,
    /// Inline API key. Prefer `api_key_env` outside of local testing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Name of an environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub default_options: CompletionOptions,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::OpenAI,
            model: "gpt-4o".to_string(),
            api_key: None,
            api_key_env: None,
            endpoint: None,
            default_options: CompletionOptions::default(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !is_http_url(endpoint) {
                return Err(format!(
                    "Endpoint must be an http(s) URL, got '{}'",
                    endpoint
                ));
            }
        }
        if self.provider_type == ProviderType::LocalCustom && self.endpoint.is_none() {
            return Err("Local provider requires an endpoint".to_string());
        }
        if let Some(temperature) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "Temperature must be between 0.0 and 2.0, got {}",
                    temperature
                ));
            }
        }
        Ok(())
    }

    /// Resolve the API key: inline value, then `api_key_env`, then the provider's standard variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }
        self.api_key_env
            .as_deref()
            .or_else(|| self.provider_type.standard_api_key_env())
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.is_empty())
    }

    pub fn to_model_provider(&self) -> Result<ModelProvider, ApiError> {
        self.validate().map_err(ApiError::ConfigError)?;
        let require_key = || {
            self.resolve_api_key().ok_or_else(|| {
                let hint = self
                    .api_key_env
                    .as_deref()
                    .or_else(|| self.provider_type.standard_api_key_env())
                    .unwrap_or("api_key");
                ApiError::ProviderNotConfigured(format!(
                    "{} provider requires an API key (set {})",
                    self.provider_type.as_str(),
                    hint
                ))
            })
        };

        match self.provider_type {
            ProviderType::OpenAI => Ok(ModelProvider::OpenAI {
                model: self.model.clone(),
                api_key: require_key()?,
                base_url: self.endpoint.clone(),
            }),
            ProviderType::Anthropic => Ok(ModelProvider::Anthropic {
                model: self.model.clone(),
                api_key: require_key()?,
            }),
            ProviderType::Ollama => Ok(ModelProvider::Ollama {
                model: self.model.clone(),
                base_url: self.endpoint.clone(),
            }),
            ProviderType::LocalCustom => Ok(ModelProvider::LocalCustom {
                model: self.model.clone(),
                endpoint: self.endpoint.clone().unwrap_or_default(),
                api_key: self.resolve_api_key(),
            }),
        }
    }

    /// Run every check and collect the outcome for display.
    pub fn diagnose(&self) -> ValidationResult {
        let mut result = ValidationResult::new(self.provider_type.as_str().to_string());
        result.add_check("Model name is set", !self.model.trim().is_empty());
        match &self.endpoint {
            Some(endpoint) => result.add_check("Endpoint URL is valid", is_http_url(endpoint)),
            None if self.provider_type == ProviderType::LocalCustom => {
                result.add_check("Endpoint URL is set", false)
            }
            None => {}
        }
        if self.provider_type.standard_api_key_env().is_some() {
            let has_key = self.resolve_api_key().is_some();
            result.add_check("API key is available", has_key);
            if !has_key {
                result.add_error("No API key found in config or environment".to_string());
            }
        } else if self.api_key.is_some() {
            result.add_warning("API key is set for a provider that normally needs none".to_string());
        }
        if let Err(e) = self.validate() {
            result.add_error(e);
        }
        result
    }
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty())
}

/// Outcome of checking a provider profile.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub provider_name: String,
    pub checks: Vec<(String, bool)>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new(provider_name: String) -> Self {
        Self {
            provider_name,
            checks: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_check(&mut self, description: &str, passed: bool) {
        self.checks.push((description.to_string(), passed));
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }

    pub fn passed_checks(&self) -> usize {
        self.checks.iter().filter(|(_, passed)| *passed).count()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.passed_checks() == self.total_checks()
    }
}
