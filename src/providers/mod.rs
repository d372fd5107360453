//! Collaborator interfaces the core depends on, plus their HTTP
//! implementations. The orchestrator only sees the traits; tests swap in
//! scripted mocks.

pub mod openai;
pub mod places;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::ToolCall;
use crate::error::Result;
use crate::types::CandidatePlace;

/// One chat-completion request to the language model.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Conversation rendered in OpenAI message format
    pub messages: Vec<Value>,
    /// Tool definitions attached to this request
    pub tools: Vec<Value>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// The model's reply: free text, requested tool calls, or both.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    /// Trimmed non-empty text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Language-model chat-completion provider.
///
/// The provider may not support forced JSON output; the orchestrator
/// instructs the shape through the prompt and validates afterwards rather
/// than trusting it.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// External places database.
///
/// Implementations must surface "not found" and "provider error" as the
/// distinct [`crate::error::LookupErrorKind`] variants.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Places of the given categories within `radius_m` meters of a point.
    async fn nearby_search(
        &self,
        lat: f64,
        lng: f64,
        radius_m: u32,
        categories: &[String],
    ) -> Result<Vec<CandidatePlace>>;

    /// Best match for a free-text place query.
    async fn text_search(&self, query: &str) -> Result<CandidatePlace>;

    /// Full details for a known place ID.
    async fn place_details(&self, place_id: &str) -> Result<CandidatePlace>;
}
