//! Response validation: the trust boundary between model output and typed values.
//!
//! Raw text is parsed as JSON, checked against the contract's JSON Schema,
//! deserialized into the contract type and finally run through the contract's
//! semantic checks. Nothing is repaired along the way.

use crate::error::{FieldDiagnostic, GenerationError, GenerationOutcome};
use crate::schema::{ResponseSchema, SchemaContract};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::debug;

const SNIPPET_CHARS: usize = 160;
const MAX_DIAGNOSTICS: usize = 25;

pub struct ResponseValidator;

impl ResponseValidator {
    pub fn validate<T: SchemaContract>(raw: &str, schema: &ResponseSchema) -> GenerationOutcome<T> {
        let value = Self::parse(raw)?;

        let diagnostics = Self::structural_diagnostics(&value, schema);
        if !diagnostics.is_empty() {
            return Err(violation(schema.name, diagnostics));
        }

        let typed: T = deserialize_typed(&value).map_err(|d| violation(schema.name, vec![d]))?;

        let diagnostics = typed.semantic_diagnostics();
        if !diagnostics.is_empty() {
            return Err(violation(schema.name, diagnostics));
        }

        Ok(typed)
    }

    fn parse(raw: &str) -> GenerationOutcome<Value> {
        if raw.trim().is_empty() {
            return Err(GenerationError::MalformedOutput {
                detail: "backend returned an empty response".to_string(),
                snippet: String::new(),
            });
        }
        serde_json::from_str(raw).map_err(|e| GenerationError::MalformedOutput {
            detail: e.to_string(),
            snippet: snippet(raw),
        })
    }

    fn structural_diagnostics(value: &Value, schema: &ResponseSchema) -> Vec<FieldDiagnostic> {
        let compiled = match JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema.schema)
        {
            Ok(compiled) => compiled,
            Err(e) => {
                return vec![FieldDiagnostic::new(
                    "",
                    format!("contract {} does not compile: {}", schema.name, e),
                )]
            }
        };

        let diagnostics = match compiled.validate(value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .take(MAX_DIAGNOSTICS)
                .map(|error| {
                    FieldDiagnostic::new(error.instance_path.to_string(), error.to_string())
                })
                .collect(),
        };
        diagnostics
    }
}

/// Deserialize through the pretty-printed text so a serde error carries a
/// line, which maps back to the JSON pointer of the offending value.
fn deserialize_typed<T: SchemaContract>(value: &Value) -> Result<T, FieldDiagnostic> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| FieldDiagnostic::new("", e.to_string()))?;
    serde_json::from_str(&text)
        .map_err(|e| FieldDiagnostic::new(pointer_at_line(value, e.line()), e.to_string()))
}

/// JSON pointer of the value printed on `line` (1-based) of
/// `serde_json::to_string_pretty(value)`.
fn pointer_at_line(value: &Value, line: usize) -> String {
    let mut lines = Vec::new();
    pretty_layout(value, String::new(), &mut lines);
    line.checked_sub(1)
        .and_then(|i| lines.get(i).cloned())
        .unwrap_or_default()
}

/// One entry per pretty-printed line. Non-empty containers open on the line
/// of their key and close on a line of their own; everything else fits on one.
fn pretty_layout(value: &Value, pointer: String, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            lines.push(pointer.clone());
            for (key, child) in map {
                let escaped = key.replace('~', "~0").replace('/', "~1");
                pretty_layout(child, format!("{}/{}", pointer, escaped), lines);
            }
            lines.push(pointer);
        }
        Value::Array(items) if !items.is_empty() => {
            lines.push(pointer.clone());
            for (i, child) in items.iter().enumerate() {
                pretty_layout(child, format!("{}/{}", pointer, i), lines);
            }
            lines.push(pointer);
        }
        _ => lines.push(pointer),
    }
}

fn violation(contract: &'static str, diagnostics: Vec<FieldDiagnostic>) -> GenerationError {
    debug!(
        contract,
        diagnostics = diagnostics.len(),
        "Model output violates contract"
    );
    GenerationError::SchemaViolation {
        contract,
        diagnostics,
    }
}

fn snippet(raw: &str) -> String {
    raw.trim().chars().take(SNIPPET_CHARS).collect()
}
