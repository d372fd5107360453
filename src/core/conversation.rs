use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool_call::ToolCall;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One turn in the model's context window.
///
/// The sequence is append-only within a single orchestration run and owned
/// exclusively by the orchestrator for the duration of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    /// Tool calls requested by an assistant turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool turns, the id of the call this result answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Assistant turn recording the tool calls the model requested.
    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Tool-result turn, matched back to its request by call id.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Convert the turn to the OpenAI chat message format.
    pub fn to_message(&self) -> Value {
        match self.role {
            Role::System => serde_json::json!({
                "role": "system",
                "content": self.content
            }),
            Role::User => serde_json::json!({
                "role": "user",
                "content": self.content
            }),
            Role::Assistant => {
                if self.tool_calls.is_empty() {
                    serde_json::json!({
                        "role": "assistant",
                        "content": self.content
                    })
                } else {
                    let calls: Vec<Value> = self
                        .tool_calls
                        .iter()
                        .map(ToolCall::to_openai_format)
                        .collect();
                    serde_json::json!({
                        "role": "assistant",
                        "content": self.content,
                        "tool_calls": calls
                    })
                }
            }
            Role::Tool => serde_json::json!({
                "role": "tool",
                "tool_call_id": self.tool_call_id.clone().unwrap_or_default(),
                "content": self.content
            }),
        }
    }
}

/// Ordered, append-only sequence of turns forming the model's context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        tracing::debug!(target: "trip_agent::turns", role = ?turn.role, "{}", turn.content);
        self.turns.push(turn);
    }

    pub fn extend(&mut self, additional: impl IntoIterator<Item = ConversationTurn>) {
        for turn in additional {
            self.push(turn);
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the whole conversation in the OpenAI message format.
    pub fn as_messages(&self) -> Vec<Value> {
        self.turns.iter().map(ConversationTurn::to_message).collect()
    }

    pub fn into_turns(self) -> Vec<ConversationTurn> {
        self.turns
    }
}
