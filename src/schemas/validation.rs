//! Strict validation of the model's final answer against the
//! [`AgentResponse`] contract. Shape mismatches fail with a typed error
//! retaining the raw text; nothing is silently coerced.

use std::sync::OnceLock;

use jsonschema::{Draft, JSONSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::types::AgentResponse;

const MAX_SCHEMA_ERRORS: usize = 3;

/// JSON Schema for the final-answer contract, derived once from the
/// response types.
pub fn agent_response_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        serde_json::to_value(schemars::schema_for!(AgentResponse))
            .expect("AgentResponse schema serializes")
    })
}

/// Parse and schema-check the model's final text into an [`AgentResponse`].
pub fn validate_agent_response(raw: &str) -> Result<AgentResponse> {
    let stripped = strip_code_fences(raw);

    let payload: Value = serde_json::from_str(stripped).map_err(|err| AgentError::Validation {
        message: format!("final answer is not valid JSON: {err}"),
        raw: raw.to_string(),
    })?;

    check_against_schema(&payload, raw)?;

    serde_path_to_error::deserialize(payload).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() {
            "<root>".to_string()
        } else {
            path
        };
        AgentError::Validation {
            message: format!("failed to deserialize agent response at {location}: {err}"),
            raw: raw.to_string(),
        }
    })
}

fn check_against_schema(payload: &Value, raw: &str) -> Result<()> {
    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(agent_response_schema())
        .map_err(|err| AgentError::Validation {
            message: format!("failed to prepare agent response schema: {err}"),
            raw: raw.to_string(),
        })?;

    if let Err(errors) = validator.validate(payload) {
        let mut details = Vec::new();
        let mut truncated = false;

        for (idx, error) in errors.enumerate() {
            if idx < MAX_SCHEMA_ERRORS {
                let mut path = error.instance_path.to_string();
                if path.is_empty() {
                    path = "<root>".to_string();
                }
                details.push(format!("{}: {}", path, error));
            } else {
                truncated = true;
                break;
            }
        }

        let mut detail_str = if details.is_empty() {
            "payload failed schema validation".to_string()
        } else {
            details.join("; ")
        };

        if truncated {
            detail_str.push_str("; additional errors truncated");
        }

        return Err(AgentError::Validation {
            message: format!("agent response does not match contract: {detail_str}"),
            raw: raw.to_string(),
        });
    }

    Ok(())
}

/// Models without a native JSON mode often wrap the payload in markdown
/// fences despite instructions; tolerate that one deviation.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

/// Validate and deserialize tool parameters, reporting the JSON path of the
/// first mismatch.
pub fn deserialize_params<T: DeserializeOwned>(tool_name: &str, params: Value) -> Result<T> {
    serde_path_to_error::deserialize(params).map_err(|err| {
        AgentError::invalid_tool_call(
            tool_name,
            format!("parameter validation failed at {}: {}", err.path(), err),
        )
    })
}
