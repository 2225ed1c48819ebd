//! Generation presentation: activities, itinerary and chat reply text/json.

use crate::cli::output::CommandError;
use crate::schema::{ActivitiesResponse, ChatReply};
use crate::types::{ActivityRecord, ItineraryResponse};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_json<T: Serialize>(value: &T) -> Result<String, CommandError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CommandError::Input(format!("Failed to serialize result: {}", e)))
}

pub fn format_activities_text(city: &str, response: &ActivitiesResponse) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("Activities in {}", city))
    );
    if response.activities.is_empty() {
        out.push_str("No activities suggested.");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Name", "Category", "Cost", "Hours", "Description"]);
    for (i, activity) in response.activities.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            activity.name.clone(),
            activity
                .category
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| "-".to_string()),
            optional_number(activity.cost),
            optional_number(activity.duration),
            activity.description.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    out.push_str(&table.to_string());
    out.push_str(&format!("\n\nTotal: {} activit(ies)", response.activities.len()));
    out
}

pub fn format_itinerary_text(response: &ItineraryResponse) -> String {
    let mut out = format!("{}\n", format_section_heading("Itinerary"));
    if response.sections.is_empty() {
        out.push_str("\nNo sections planned.");
        return out;
    }
    for section in &response.sections {
        out.push_str(&format!(
            "\n{}  {} → {}\n",
            section.name.bold(),
            section.start_date,
            section.end_date
        ));
        if !section.description.is_empty() {
            out.push_str(&format!("{}\n", section.description));
        }
        if let Some(budget) = section.budget {
            out.push_str(&format!("Budget: {}\n", budget));
        }
        out.push_str(&activities_table(&section.activities));
        out.push('\n');
    }
    if let Some(total) = response.total_budget() {
        out.push_str(&format!("\nTotal budget: {}", total));
    }
    out
}

fn activities_table(activities: &[ActivityRecord]) -> String {
    if activities.is_empty() {
        return "  (no activities)".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Activity", "ID", "Category", "Cost", "Hours"]);
    for activity in activities {
        table.add_row(vec![
            activity.name.clone(),
            activity.id.clone().unwrap_or_else(|| "-".to_string()),
            activity
                .category
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| "-".to_string()),
            optional_number(activity.cost),
            optional_number(activity.duration),
        ]);
    }
    table.to_string()
}

pub fn format_chat_reply_text(reply: &ChatReply) -> String {
    format!("{} {}", "assistant:".cyan().bold(), reply.reply)
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
