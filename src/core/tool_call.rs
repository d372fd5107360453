use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents a tool call request from the LLM.
///
/// Produced by the model, consumed exactly once by the tool executor, and
/// matched back to its result turn by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to execute
    pub name: String,
    /// Arguments to pass to the tool
    pub arguments: Value,
    /// Set when the model's argument string was not valid JSON; the executor
    /// reports it back as an invalid-arguments error carrying the cause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_error: Option<String>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            argument_error: None,
        }
    }

    /// Parse a tool call from the OpenAI response format
    pub fn from_openai_format(tool_call: &Value) -> Option<Self> {
        let id = tool_call.get("id")?.as_str()?.to_string();
        let function = tool_call.get("function")?;
        let name = function.get("name")?.as_str()?.to_string();

        // Arguments arrive as a JSON-encoded string. Absent or blank means
        // "no arguments"; an unparseable string is still a valid tool call —
        // the parse cause is kept so the executor can feed it back to the
        // model instead of silently skipping the call.
        let (arguments, argument_error) = match function
            .get("arguments")
            .and_then(Value::as_str)
            .map(str::trim)
        {
            None | Some("") => (Value::Object(serde_json::Map::new()), None),
            Some(raw) => match serde_json::from_str(raw) {
                Ok(value) => (value, None),
                Err(err) => (
                    Value::Null,
                    Some(format!("arguments are not valid JSON: {err}")),
                ),
            },
        };

        Some(Self {
            id,
            name,
            arguments,
            argument_error,
        })
    }

    /// Convert to the OpenAI tool call format
    pub fn to_openai_format(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "type": "function",
            "function": {
                "name": self.name,
                "arguments": serde_json::to_string(&self.arguments).unwrap_or_default()
            }
        })
    }

    /// Get a human-readable description
    pub fn describe(&self) -> String {
        format!("{}({})", self.name, self.arguments)
    }
}
