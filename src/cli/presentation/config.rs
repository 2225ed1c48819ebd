//! Config command presentation: validation results and provider checks.

use crate::config::ValidationError;
use crate::provider::ValidationResult;
use serde_json::json;

pub fn format_provider_diagnosis(result: &ValidationResult) -> String {
    let mut output = format!("Validating provider: {}\n\n", result.provider_name);
    for (description, passed) in &result.checks {
        if *passed {
            output.push_str(&format!("✓ {}\n", description));
        } else {
            output.push_str(&format!("✗ {}\n", description));
        }
    }
    if !result.errors.is_empty() {
        output.push_str("\nErrors:\n");
        for error in &result.errors {
            output.push_str(&format!("✗ {}\n", error));
        }
    }
    if !result.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &result.warnings {
            output.push_str(&format!("⚠ {}\n", warning));
        }
    }
    output.push_str(&format!(
        "\nValidation {}: {}/{} checks passed, {} errors found\n",
        if result.is_valid() { "passed" } else { "failed" },
        result.passed_checks(),
        result.total_checks(),
        result.errors.len()
    ));
    output
}

/// Combined view of config validation and the provider checks.
pub fn format_config_validation(
    errors: &[ValidationError],
    provider: &ValidationResult,
    json_output: bool,
) -> String {
    if json_output {
        let out = json!({
            "valid": errors.is_empty() && provider.is_valid(),
            "errors": errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            "provider": {
                "name": provider.provider_name,
                "checks": provider
                    .checks
                    .iter()
                    .map(|(description, passed)| json!({ "check": description, "passed": passed }))
                    .collect::<Vec<_>>(),
                "errors": provider.errors,
                "warnings": provider.warnings,
            },
        });
        return serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string());
    }

    let mut output = if errors.is_empty() {
        "Configuration is valid\n\n".to_string()
    } else {
        let mut s = format!("Configuration errors ({}):\n", errors.len());
        for e in errors {
            s.push_str(&format!("  - {}\n", e));
        }
        s.push('\n');
        s
    };
    output.push_str(&format_provider_diagnosis(provider));
    output
}
