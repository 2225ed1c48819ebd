//! Itinera: Structured Travel Generation
//!
//! Turns trip requests into validated, schema-conforming itineraries by
//! rendering a prompt, calling a generative backend once, validating the raw
//! output against a closed contract and resolving catalog references back onto
//! the caller's activity records.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod resolve;
pub mod schema;
pub mod types;
pub mod validate;

pub use error::{FailureKind, GenerationError, GenerationOutcome};
pub use pipeline::Pipeline;
