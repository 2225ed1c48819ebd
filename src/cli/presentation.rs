//! CLI presentation: text and json formatters per command family.

mod config;
mod generation;

pub use config::format_config_validation;
pub use generation::{
    format_activities_text, format_chat_reply_text, format_itinerary_text, format_json,
};
