//! Pipeline orchestration: render, generate, validate, resolve.
//!
//! Every operation is a single attempt. A `BackendError` may be retried by the
//! caller with a fresh invocation; malformed or contract-violating output is
//! returned as-is.

use crate::config::{GenerationConfig, ItineraConfig};
use crate::error::{ApiError, GenerationOutcome};
use crate::generation::GenerationClient;
use crate::prompt::{PromptRenderer, RenderedPrompt};
use crate::provider::{CompletionOptions, ModelProviderClient, ProviderFactory};
use crate::resolve::resolve_itinerary;
use crate::schema::{ActivitiesResponse, ChatReply, ItineraryDraft, ResponseSchema, SchemaContract};
use crate::types::{ChatExchange, ItineraryResponse, TripRequest};
use crate::validate::ResponseValidator;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Stateless orchestrator. Clones share the backend read-only, so any number
/// of invocations may run concurrently.
#[derive(Clone)]
pub struct Pipeline {
    client: GenerationClient,
    renderer: PromptRenderer,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn ModelProviderClient>,
        generation: &GenerationConfig,
        options: CompletionOptions,
    ) -> Self {
        Self {
            client: GenerationClient::new(backend)
                .with_system_prompt(generation.system_prompt.clone())
                .with_options(options),
            renderer: PromptRenderer::new(generation.activity_cap),
        }
    }

    /// Build the process-wide backend described by `config`.
    pub fn from_config(config: &ItineraConfig) -> Result<Self, ApiError> {
        let provider = config.provider.to_model_provider()?;
        let backend: Arc<dyn ModelProviderClient> = ProviderFactory::create_client(&provider)?.into();
        info!(
            provider = backend.provider_name(),
            model = backend.model_name(),
            "Generation backend initialized"
        );
        Ok(Self::new(
            backend,
            &config.generation,
            config.provider.default_options.clone(),
        ))
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn activity_cap(&self) -> usize {
        self.renderer.activity_cap()
    }

    /// Propose up to `activity_cap` activities for a city. The drafts carry no
    /// identity; assigning `id` and `cityId` is left to whoever stores them.
    #[instrument(skip(self))]
    pub async fn generate_activities(&self, city_name: &str) -> GenerationOutcome<ActivitiesResponse> {
        let schema = ResponseSchema::of::<ActivitiesResponse>()
            .limit_items("activities", self.renderer.activity_cap());
        let prompt = self.renderer.render_activities(city_name, &schema);
        let response: ActivitiesResponse = self.run(&prompt, &schema).await?;
        info!(activities = response.activities.len(), "Activities generated");
        Ok(response)
    }

    /// Plan a trip over the request's catalog and resolve the model's index
    /// references back onto it. The request is only read.
    #[instrument(
        skip(self, request),
        fields(trip = %request.name, catalog_len = request.activities.len())
    )]
    pub async fn generate_itinerary(&self, request: &TripRequest) -> GenerationOutcome<ItineraryResponse> {
        let schema = ResponseSchema::of::<ItineraryDraft>();
        let prompt = self.renderer.render_itinerary(request, &schema);
        let draft: ItineraryDraft = self.run(&prompt, &schema).await?;

        let referenced: usize = draft.sections.iter().map(|s| s.activity_refs.len()).sum();
        let response = resolve_itinerary(draft, &request.activities);
        let resolved: usize = response.sections.iter().map(|s| s.activities.len()).sum();
        info!(
            sections = response.sections.len(),
            referenced,
            resolved,
            "Itinerary generated"
        );
        Ok(response)
    }

    #[instrument(skip(self, exchange), fields(turns = exchange.turns().len()))]
    pub async fn generate_chat_reply(&self, exchange: &ChatExchange) -> GenerationOutcome<ChatReply> {
        let schema = ResponseSchema::of::<ChatReply>();
        let prompt = self.renderer.render_chat(exchange, &schema);
        self.run(&prompt, &schema).await
    }

    async fn run<T: SchemaContract>(
        &self,
        prompt: &RenderedPrompt,
        schema: &ResponseSchema,
    ) -> GenerationOutcome<T> {
        debug!(
            contract = schema.name,
            prompt_chars = prompt.text.len(),
            prompt_digest = %prompt.digest,
            "Prompt rendered"
        );
        let raw = self.client.generate(prompt, schema).await?;
        ResponseValidator::validate::<T>(&raw, schema).map_err(|e| {
            warn!(
                contract = schema.name,
                kind = %e.kind(),
                diagnostics = e.diagnostics().len(),
                "Model output rejected"
            );
            e
        })
    }
}
