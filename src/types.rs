//! Domain types shared by callers and the pipeline.
//!
//! Everything here is created per request and owned by the caller. The
//! pipeline reads catalogs and trip requests but never mutates them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed set of activity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Sightseeing,
    Food,
    Adventure,
    Culture,
    Other,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 5] = [
        ActivityCategory::Sightseeing,
        ActivityCategory::Food,
        ActivityCategory::Adventure,
        ActivityCategory::Culture,
        ActivityCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Sightseeing => "sightseeing",
            ActivityCategory::Food => "food",
            ActivityCategory::Adventure => "adventure",
            ActivityCategory::Culture => "culture",
            ActivityCategory::Other => "other",
        }
    }
}

/// An activity as known to the caller's store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Store-assigned identifier; absent for activities not yet persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "cityId")]
    pub city_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ActivityCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Duration in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ActivityRecord {
    pub fn new(name: impl Into<String>, city_id: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            city_id: city_id.into(),
            category: None,
            cost: None,
            duration: None,
            images: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: ActivityCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Input to itinerary generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    /// Identifier of the trip in the caller's store, copied into each section.
    #[serde(rename = "tripId", default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    /// Catalog the model may pick from; position is the reference index.
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
}

/// A section after its activity references were resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItinerarySection {
    #[serde(rename = "tripId")]
    pub trip_id: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    pub activities: Vec<ActivityRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub sections: Vec<ItinerarySection>,
}

impl ItineraryResponse {
    pub fn total_budget(&self) -> Option<f64> {
        let budgets: Vec<f64> = self.sections.iter().filter_map(|s| s.budget).collect();
        if budgets.is_empty() {
            None
        } else {
            Some(budgets.iter().sum())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "bot")]
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// Conversation so far, oldest turn first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExchange {
    pub conversation: Vec<ChatTurn>,
}

impl ChatExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.conversation.push(turn);
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.conversation
    }

    pub fn is_empty(&self) -> bool {
        self.conversation.is_empty()
    }
}
