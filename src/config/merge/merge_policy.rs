//! Merge rules: built-in defaults every other source overrides.

use crate::generation::DEFAULT_SYSTEM_PROMPT;
use crate::schema::MAX_ACTIVITIES;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("provider.provider_type", "openai")?
        .set_default("provider.model", "gpt-4o")?
        .set_default("generation.system_prompt", DEFAULT_SYSTEM_PROMPT)?
        .set_default("generation.activity_cap", MAX_ACTIVITIES as u64)
}
