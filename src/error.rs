//! Error types for the itinera generation pipeline.
//!
//! `ApiError` covers the ambient layers (configuration, logging, provider
//! construction). `GenerationError` is the typed failure every pipeline
//! operation reports; nothing the model sends back can escape as a panic.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised outside the generation path.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Failure of a single call to the generative backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Provider authentication failed: {0}")]
    AuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Provider model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

/// Coarse classification of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    BackendError,
    MalformedOutput,
    SchemaViolation,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::BackendError => "BackendError",
            FailureKind::MalformedOutput => "MalformedOutput",
            FailureKind::SchemaViolation => "SchemaViolation",
        };
        f.write_str(name)
    }
}

/// One field-level finding from contract validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiagnostic {
    /// JSON pointer into the model output (empty for the document root).
    pub path: String,
    pub message: String,
}

impl FieldDiagnostic {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Typed failure of a pipeline invocation.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Malformed output: {detail} (output began with {snippet:?})")]
    MalformedOutput { detail: String, snippet: String },

    #[error("Schema violation in {contract}: {}", join_diagnostics(.diagnostics))]
    SchemaViolation {
        contract: &'static str,
        diagnostics: Vec<FieldDiagnostic>,
    },
}

impl GenerationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GenerationError::Backend(_) => FailureKind::BackendError,
            GenerationError::MalformedOutput { .. } => FailureKind::MalformedOutput,
            GenerationError::SchemaViolation { .. } => FailureKind::SchemaViolation,
        }
    }

    /// Only backend failures are worth a fresh invocation; bad output is a
    /// contract breach the caller needs to see.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Backend(_))
    }

    pub fn diagnostics(&self) -> &[FieldDiagnostic] {
        match self {
            GenerationError::SchemaViolation { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

fn join_diagnostics(diagnostics: &[FieldDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of one pipeline operation.
pub type GenerationOutcome<T> = Result<T, GenerationError>;
