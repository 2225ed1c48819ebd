//! Generation client: one structured-output call to the configured backend.

use crate::error::{GenerationError, GenerationOutcome};
use crate::prompt::RenderedPrompt;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use crate::schema::ResponseSchema;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful travel planning assistant.";

/// Wraps the process-wide backend. Cloning shares the backend read-only.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn ModelProviderClient>,
    system_prompt: String,
    options: CompletionOptions,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn ModelProviderClient>) -> Self {
        Self {
            backend,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.backend.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Perform exactly one backend request and return the raw output text.
    #[instrument(
        skip(self, prompt, schema),
        fields(
            provider = %self.backend.provider_name(),
            model = %self.backend.model_name(),
            contract = schema.name,
            prompt_digest = %prompt.digest,
        )
    )]
    pub async fn generate(
        &self,
        prompt: &RenderedPrompt,
        schema: &ResponseSchema,
    ) -> GenerationOutcome<String> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(prompt.text.clone()),
        ];
        debug!(prompt_chars = prompt.text.len(), "Sending structured completion request");

        let started = Instant::now();
        match self
            .backend
            .complete(messages, schema, self.options.clone())
            .await
        {
            Ok(response) => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    prompt_tokens = response.usage.prompt_tokens,
                    completion_tokens = response.usage.completion_tokens,
                    finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
                    "Backend completion received"
                );
                Ok(response.content)
            }
            Err(e) => {
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Backend completion failed"
                );
                Err(GenerationError::Backend(e))
            }
        }
    }
}
