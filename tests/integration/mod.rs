//! Integration tests for the itinera generation pipeline

mod config_integration;
mod model_providers;
mod pipeline_end_to_end;
pub mod test_utils;
