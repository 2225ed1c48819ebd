//! Output contracts the model must satisfy.
//!
//! Each shape is a closed serde/schemars type: unknown fields are rejected by
//! deserialization and rendered as `additionalProperties: false` in the JSON
//! Schema handed to the backend. The same schema value drives the validator.

use crate::error::FieldDiagnostic;
use crate::types::ActivityCategory;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Upper bound on activities requested per city.
pub const MAX_ACTIVITIES: usize = 12;

/// A closed output shape the model is asked to produce.
pub trait SchemaContract: DeserializeOwned + JsonSchema {
    /// Contract name sent to the backend and used in diagnostics.
    const NAME: &'static str;

    /// Checks a JSON Schema cannot express. Runs only on structurally valid output.
    fn semantic_diagnostics(&self) -> Vec<FieldDiagnostic> {
        Vec::new()
    }

    /// Adjust the generated schema where derive attributes fall short.
    fn refine_schema(schema: ResponseSchema) -> ResponseSchema {
        schema
    }
}

/// Machine-checkable description of one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub schema: Value,
}

impl ResponseSchema {
    pub fn of<T: SchemaContract>() -> Self {
        let generator = SchemaSettings::draft07()
            .with(|settings| {
                settings.inline_subschemas = true;
                settings.meta_schema = None;
            })
            .into_generator();
        let root = generator.into_root_schema_for::<T>();
        // RootSchema always serializes; Null would fail every validation anyway.
        let mut schema = serde_json::to_value(root).unwrap_or_default();
        admit_null_in_nullable_enums(&mut schema);
        T::refine_schema(Self {
            name: T::NAME,
            schema,
        })
    }

    /// Tighten `maxItems` of a top-level array property.
    pub fn limit_items(mut self, property: &str, max: usize) -> Self {
        if let Some(prop) = self
            .schema
            .get_mut("properties")
            .and_then(|props| props.get_mut(property))
            .and_then(Value::as_object_mut)
        {
            prop.insert("maxItems".to_string(), Value::from(max));
        }
        self
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.schema).unwrap_or_else(|_| self.schema.to_string())
    }
}

/// `Option<Enum>` gains a `null` type but keeps a closed `enum` list; add
/// `null` to the list so an explicit null is accepted.
fn admit_null_in_nullable_enums(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            let nullable = map
                .get("type")
                .and_then(Value::as_array)
                .is_some_and(|types| types.iter().any(|t| t == "null"));
            if nullable {
                if let Some(Value::Array(values)) = map.get_mut("enum") {
                    if !values.contains(&Value::Null) {
                        values.push(Value::Null);
                    }
                }
            }
            for value in map.values_mut() {
                admit_null_in_nullable_enums(value);
            }
        }
        Value::Array(items) => {
            for item in items {
                admit_null_in_nullable_enums(item);
            }
        }
        _ => {}
    }
}

/// An activity proposed by the model for a city; the store assigns identity later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ActivityDraft {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<ActivityCategory>,
    pub cost: Option<f64>,
    /// Duration in hours.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityDraft>,
}

impl SchemaContract for ActivitiesResponse {
    const NAME: &'static str = "activities";

    fn refine_schema(schema: ResponseSchema) -> ResponseSchema {
        schema.limit_items("activities", MAX_ACTIVITIES)
    }
}

/// Reference from a section to a catalog entry by position.
///
/// The index is kept as the number the model wrote. Anything that is not a
/// non-negative integer, such as `-1`, `2.0` or a value past `u64::MAX`, is
/// still structurally valid and simply never names a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ActivityRef {
    #[serde(rename = "activityIndex")]
    #[schemars(with = "i64")]
    pub activity_index: Number,
    /// Echo of the activity name; informational only.
    pub name: Option<String>,
}

impl ActivityRef {
    pub fn new(activity_index: impl Into<Number>) -> Self {
        Self {
            activity_index: activity_index.into(),
            name: None,
        }
    }

    /// Catalog position this reference names, if it is a usable index at all.
    pub fn position(&self) -> Option<usize> {
        self.activity_index
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SectionDraft {
    #[serde(rename = "tripId")]
    pub trip_id: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub budget: Option<f64>,
    #[serde(rename = "activityRefs")]
    pub activity_refs: Vec<ActivityRef>,
}

/// Itinerary as emitted by the model, before reference resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ItineraryDraft {
    pub sections: Vec<SectionDraft>,
}

impl SchemaContract for ItineraryDraft {
    const NAME: &'static str = "itinerary";

    fn semantic_diagnostics(&self) -> Vec<FieldDiagnostic> {
        let mut diagnostics = Vec::new();
        for (i, section) in self.sections.iter().enumerate() {
            check_date(&mut diagnostics, i, "start_date", &section.start_date);
            check_date(&mut diagnostics, i, "end_date", &section.end_date);
        }
        diagnostics
    }
}

/// Dates must parse; their order is the model's business.
fn check_date(diagnostics: &mut Vec<FieldDiagnostic>, section: usize, field: &str, value: &str) {
    if parse_date_like(value).is_none() {
        diagnostics.push(FieldDiagnostic::new(
            format!("/sections/{}/{}", section, field),
            format!("{:?} is not an RFC 3339 datetime or YYYY-MM-DD date", value),
        ));
    }
}

/// Parse an RFC 3339 datetime, a naive `YYYY-MM-DDTHH:MM:SS`, or a bare date.
pub fn parse_date_like(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ChatReply {
    pub reply: String,
}

impl SchemaContract for ChatReply {
    const NAME: &'static str = "chat_reply";

    fn semantic_diagnostics(&self) -> Vec<FieldDiagnostic> {
        if self.reply.trim().is_empty() {
            vec![FieldDiagnostic::new("/reply", "reply must not be empty")]
        } else {
            Vec::new()
        }
    }
}
