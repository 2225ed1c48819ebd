//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::cli::parse::OutputFormat;
use crate::error::{ApiError, FailureKind, GenerationError};
use owo_colors::OwoColorize;
use serde_json::json;
use thiserror::Error;

/// Everything a command can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Invalid input: {0}")]
    Input(String),
}

/// Process exit code per failure category.
pub fn exit_code(e: &CommandError) -> i32 {
    match e {
        CommandError::Api(_) => 1,
        CommandError::Input(_) => 2,
        CommandError::Generation(g) => match g.kind() {
            FailureKind::BackendError => 3,
            FailureKind::MalformedOutput => 4,
            FailureKind::SchemaViolation => 5,
        },
    }
}

/// Map a command error to the string printed for the user.
pub fn map_error(e: &CommandError, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => map_error_json(e),
        OutputFormat::Text => map_error_text(e),
    }
}

fn map_error_text(e: &CommandError) -> String {
    match e {
        CommandError::Generation(g) => {
            let mut out = format!("{} {}", g.kind().to_string().red().bold(), failure_detail(g));
            let diagnostics = g.diagnostics();
            if !diagnostics.is_empty() {
                out.push_str(&format!("\n\nDiagnostics ({}):", diagnostics.len()));
                for d in diagnostics {
                    out.push_str(&format!("\n  - {}", d));
                }
            }
            if g.is_retryable() {
                out.push_str(&format!("\n\n{}", "Retry with --retries N".dimmed()));
            }
            out
        }
        other => format!("{} {}", "Error:".red().bold(), other),
    }
}

fn map_error_json(e: &CommandError) -> String {
    let out = match e {
        CommandError::Generation(g) => json!({
            "error": {
                "kind": g.kind(),
                "message": failure_detail(g),
                "retryable": g.is_retryable(),
                "diagnostics": g.diagnostics(),
            }
        }),
        CommandError::Api(_) => json!({ "error": { "kind": "ConfigError", "message": e.to_string() } }),
        CommandError::Input(_) => json!({ "error": { "kind": "InvalidInput", "message": e.to_string() } }),
    };
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| e.to_string())
}

fn failure_detail(g: &GenerationError) -> String {
    match g {
        GenerationError::Backend(backend) => backend.to_string(),
        GenerationError::MalformedOutput { detail, snippet } => {
            if snippet.is_empty() {
                detail.clone()
            } else {
                format!("{} (output began with {:?})", detail, snippet)
            }
        }
        GenerationError::SchemaViolation { contract, .. } => {
            format!("model output does not satisfy the {} contract", contract)
        }
    }
}
