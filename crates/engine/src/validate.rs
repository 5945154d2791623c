//! Request validation ahead of any orchestration.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use stacksmith_types::ValidationReport;

/// Check `raw` against a schemars-derived JSON schema, collecting every
/// violation instead of stopping at the first. Only structural facts the
/// schema states directly are enforced here; enum membership and the like
/// are caught by deserialization afterwards.
pub fn check_against_schema(schema: &Value, raw: &Value) -> Vec<String> {
    let Value::Object(input) = raw else {
        return vec!["parameters must be a JSON object".to_string()];
    };

    let mut errors = Vec::new();
    let properties = schema.get("properties").and_then(Value::as_object);

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !input.contains_key(field) {
                errors.push(format!("missing required field '{field}'"));
            }
        }
    }

    for (field, value) in input {
        let Some(field_schema) = properties.and_then(|props| props.get(field)) else {
            if additional_properties_forbidden(schema) {
                errors.push(format!("unknown field '{field}'"));
            }
            continue;
        };
        if let Some(expected) = field_schema.get("type").and_then(Value::as_str)
            && !value_matches_type(value, expected)
        {
            errors.push(format!("field '{field}' must be of type {expected}"));
        }
    }

    errors
}

fn additional_properties_forbidden(schema: &Value) -> bool {
    matches!(schema.get("additionalProperties"), Some(Value::Bool(false)))
}

fn value_matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

/// Resolve the target path, creating it when absent. Path problems are
/// validation failures so the most common failure mode surfaces before any
/// external process is spawned; a non-empty directory is only a warning.
pub fn prepare_target(raw: &str) -> (PathBuf, ValidationReport) {
    let mut report = ValidationReport::default();
    let path = PathBuf::from(raw);

    if raw.trim().is_empty() {
        report.errors.push("target_dir must not be empty".to_string());
        return (path, report);
    }
    if let Err(error) = std::fs::create_dir_all(&path) {
        report
            .errors
            .push(format!("target '{}' is not creatable: {error}", path.display()));
        return (path, report);
    }
    match std::fs::metadata(&path) {
        Ok(metadata) if metadata.permissions().readonly() => {
            report
                .errors
                .push(format!("target '{}' is not writable", path.display()));
            return (path, report);
        }
        Ok(_) => {}
        Err(error) => {
            report
                .errors
                .push(format!("target '{}' is not accessible: {error}", path.display()));
            return (path, report);
        }
    }
    match std::fs::read_dir(&path) {
        Ok(mut entries) => {
            if entries.next().is_some() {
                report
                    .warnings
                    .push(format!("target directory '{}' is not empty", path.display()));
            }
        }
        Err(error) => report
            .errors
            .push(format!("target '{}' is not readable: {error}", path.display())),
    }
    debug!(target = %path.display(), valid = report.is_valid(), "target prepared");
    (path, report)
}

/// True when `target` looks like something this tool scaffolded, used by the
/// offline cleanup command before deleting anything.
pub fn looks_scaffolded(target: &Path) -> bool {
    target.join(crate::detect::MANIFEST_FILE).exists()
        || target.join("next.config.ts").exists()
        || target.join("next.config.js").exists()
}
