//! Prompt rendering.
//!
//! Pure functions from a request to prompt text. Every prompt embeds the output
//! contract as JSON Schema and, when a catalog is offered, lists each entry
//! under the index the model must use to refer to it. Identical inputs render
//! byte-identical prompts.

use crate::schema::{ResponseSchema, MAX_ACTIVITIES};
use crate::types::{ActivityRecord, ChatExchange, TripRequest};
use std::fmt::Write;

/// Rendered prompt plus a digest for log correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub text: String,
    pub digest: String,
}

impl RenderedPrompt {
    fn new(text: String) -> Self {
        let digest = blake3::hash(text.as_bytes()).to_hex()[..16].to_string();
        Self { text, digest }
    }
}

#[derive(Debug, Clone)]
pub struct PromptRenderer {
    activity_cap: usize,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new(MAX_ACTIVITIES)
    }
}

impl PromptRenderer {
    /// `activity_cap` is clamped to `1..=MAX_ACTIVITIES`.
    pub fn new(activity_cap: usize) -> Self {
        Self {
            activity_cap: activity_cap.clamp(1, MAX_ACTIVITIES),
        }
    }

    pub fn activity_cap(&self) -> usize {
        self.activity_cap
    }

    pub fn render_activities(&self, city_name: &str, schema: &ResponseSchema) -> RenderedPrompt {
        let mut text = String::new();
        let _ = writeln!(
            text,
            "Suggest up to {} distinct activities a visitor can do in {}.",
            self.activity_cap,
            city_name.trim()
        );
        text.push('\n');
        text.push_str("Rules:\n");
        let _ = writeln!(
            text,
            "- Return at most {} activities; fewer is fine if the city does not warrant more.",
            self.activity_cap
        );
        text.push_str(
            "- Do not include identifiers of any kind (no id, no cityId); \
             the activity store assigns them.\n",
        );
        text.push_str("- Each category must be one of: sightseeing, food, adventure, culture, other.\n");
        text.push_str("- cost is an approximate price per person; duration is in hours.\n");
        push_output_contract(&mut text, schema);
        RenderedPrompt::new(text)
    }

    pub fn render_itinerary(&self, request: &TripRequest, schema: &ResponseSchema) -> RenderedPrompt {
        let mut text = String::new();
        text.push_str("Create a structured itinerary for the trip below.\n\n");
        if let Some(trip_id) = &request.trip_id {
            let _ = writeln!(text, "Trip ID: {}", trip_id);
        }
        let _ = writeln!(text, "Trip Name: {}", request.name);
        let _ = writeln!(text, "Description: {}", request.description);
        let _ = writeln!(text, "Start Date: {}", request.start_date);
        let _ = writeln!(text, "End Date: {}", request.end_date);
        text.push('\n');

        push_catalog(&mut text, &request.activities);

        text.push_str("Rules:\n");
        text.push_str(
            "- Refer to activities only through activityRefs entries whose activityIndex \
             is the number shown in brackets above.\n",
        );
        text.push_str("- Never invent activities, identifiers, or indices that are not listed.\n");
        text.push_str(
            "- Leave activityRefs empty for a section when no listed activity fits; \
             an activity may appear in more than one section.\n",
        );
        let _ = writeln!(
            text,
            "- Distribute activities logically across sections between {} and {}; \
             section dates must fall in that range.",
            request.start_date, request.end_date
        );
        text.push_str("- Give each section an approximate budget estimate.\n");
        match &request.trip_id {
            Some(trip_id) => {
                let _ = writeln!(text, "- Set tripId to \"{}\" in every section.", trip_id);
            }
            None => {
                text.push_str("- Set tripId to an empty string in every section.\n");
            }
        }
        push_output_contract(&mut text, schema);
        RenderedPrompt::new(text)
    }

    pub fn render_chat(&self, exchange: &ChatExchange, schema: &ResponseSchema) -> RenderedPrompt {
        let mut text = String::new();
        text.push_str("You are a helpful travel planning assistant chatbot.\n");
        text.push_str("Conversation history:\n");
        for turn in exchange.turns() {
            let _ = writeln!(text, "{}: {}", turn.role.as_str(), turn.text);
        }
        text.push('\n');
        text.push_str("Respond with a single concise message to the latest user turn.\n");
        push_output_contract(&mut text, schema);
        RenderedPrompt::new(text)
    }
}

fn push_catalog(text: &mut String, catalog: &[ActivityRecord]) {
    if catalog.is_empty() {
        text.push_str("Available activities: none. Every section must have empty activityRefs.\n\n");
        return;
    }
    text.push_str("Available activities (index: details):\n");
    for (index, activity) in catalog.iter().enumerate() {
        let _ = write!(text, "[{}] {}", index, activity.name);
        if let Some(category) = activity.category {
            let _ = write!(text, " ({})", category.as_str());
        }
        if let Some(description) = &activity.description {
            let _ = write!(text, " - {}", description);
        }
        if let Some(cost) = activity.cost {
            let _ = write!(text, "; cost {}", cost);
        }
        if let Some(duration) = activity.duration {
            let _ = write!(text, "; {} h", duration);
        }
        text.push('\n');
    }
    text.push('\n');
}

fn push_output_contract(text: &mut String, schema: &ResponseSchema) {
    text.push('\n');
    text.push_str(
        "Output only syntactically valid JSON that conforms exactly to the schema below. \
         Do not add fields that are not in the schema. \
         Do not write any text before or after the JSON.\n",
    );
    let _ = writeln!(text, "Schema ({}):", schema.name);
    text.push_str(&schema.to_pretty_json());
    text.push('\n');
}
