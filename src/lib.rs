//! trip-agent-rs: a travel-planning recommendation agent
//!
//! This library turns a free-text travel request into a ranked set of real
//! places plus natural-language advice. It drives a bounded tool-calling
//! conversation with a language model, executes place searches against an
//! external provider (memoized per session), scores candidates with a
//! deterministic composite function, and validates/enriches the model's
//! structured answer before returning it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trip_agent_rs::{
//!     Agent, GooglePlacesClient, Location, OpenAiClient, RequestContext,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = Arc::new(OpenAiClient::new(std::env::var("OPENAI_API_KEY")?));
//!     let places = Arc::new(GooglePlacesClient::new(std::env::var("PLACES_API_KEY")?));
//!
//!     let agent = Agent::new(model, places);
//!     let ctx = RequestContext::new(Location::new(48.8584, 2.2945));
//!
//!     let response = agent
//!         .run("Suggest attractions near the Eiffel Tower", &ctx)
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod core;
pub mod enrich;
pub mod error;
pub mod providers;
pub mod schemas;
pub mod scoring;
pub mod tools;
pub mod types;

pub use cache::{CacheKey, CandidateCache};
pub use crate::core::{
    Agent, Conversation, ConversationTurn, RequestContext, Role, RunReport, ToolCall,
};
pub use enrich::enrich_response;
pub use error::{AgentError, LookupErrorKind, Result};
pub use providers::openai::OpenAiClient;
pub use providers::places::GooglePlacesClient;
pub use providers::{ChatModel, ChatRequest, ChatResponse, PlacesProvider};
pub use schemas::validate_agent_response;
pub use scoring::{CandidateScore, ScoreBreakdown, HIGH_SCORE_THRESHOLD, MIN_REVIEW_COUNT};
pub use tools::{ToolExecutor, ToolKind};
pub use types::{
    AgentResponse, CandidatePlace, Location, Persona, PlaceSuggestion, Priority, Suggestion,
};

#[cfg(feature = "cli")]
pub mod cli;
