use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::cache::CandidateCache;
use crate::enrich::enrich_response;
use crate::error::{AgentError, Result};
use crate::providers::{ChatModel, ChatRequest, ChatResponse, PlacesProvider};
use crate::schemas::validate_agent_response;
use crate::tools::{ToolExecutor, ToolKind};
use crate::types::AgentResponse;

use super::context::RequestContext;
use super::conversation::{Conversation, ConversationTurn};
use super::prompt::generate_system_prompt;

/// Hard cap on tool-calling rounds per run. Bounds cost and latency and
/// guards against a model stuck requesting tools forever.
const MAX_TOOL_ROUNDS: usize = 5;

/// How many tool calls (and enrichment lookups) run at once. Parallelizes
/// network-bound lookups without overwhelming the places provider.
pub(crate) const FANOUT_CONCURRENCY: usize = 3;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Outcome of one orchestration run, including the full transcript for
/// debugging and replay.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub response: AgentResponse,
    /// Every turn of the conversation as sent to and received from the model
    pub transcript: Vec<ConversationTurn>,
    /// Number of tool-calling rounds executed
    pub tool_rounds: usize,
}

/// Drives the bounded tool-calling loop with the language model, then
/// validates and enriches the final answer.
///
/// One `Agent` holds one session-scoped candidate cache; create a new agent
/// per session to discard memoized provider results.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    executor: ToolExecutor,
    max_tool_rounds: usize,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl Agent {
    pub fn new(model: Arc<dyn ChatModel>, places: Arc<dyn PlacesProvider>) -> Self {
        let cache = Arc::new(CandidateCache::new());
        Self {
            model,
            executor: ToolExecutor::new(places, cache),
            max_tool_rounds: MAX_TOOL_ROUNDS,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        }
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Run one request and return the enriched response.
    pub async fn run(&self, user_message: &str, ctx: &RequestContext) -> Result<AgentResponse> {
        self.run_with_report(user_message, ctx)
            .await
            .map(|report| report.response)
    }

    /// Run one request, returning the response together with the transcript
    /// and round count.
    pub async fn run_with_report(
        &self,
        user_message: &str,
        ctx: &RequestContext,
    ) -> Result<RunReport> {
        let mut conversation = Conversation::new();
        conversation.push(ConversationTurn::system(generate_system_prompt(ctx)));
        conversation.extend(ctx.history.iter().cloned());
        conversation.push(ConversationTurn::user(user_message));

        let (final_text, tool_rounds) = self.drive_tool_loop(&mut conversation, ctx).await?;

        let validated = validate_agent_response(&final_text)?;
        let response = enrich_response(
            validated,
            self.executor.places(),
            self.executor.cache(),
        )
        .await;

        info!(
            target: "trip_agent::run",
            tool_rounds,
            suggestions = response.suggestions.len(),
            "orchestration run complete"
        );

        Ok(RunReport {
            response,
            transcript: conversation.into_turns(),
            tool_rounds,
        })
    }

    /// The bounded tool-calling loop. Returns the model's final text and
    /// the number of tool rounds executed.
    async fn drive_tool_loop(
        &self,
        conversation: &mut Conversation,
        ctx: &RequestContext,
    ) -> Result<(String, usize)> {
        let mut rounds = 0;
        let mut last_content: Option<String> = None;

        loop {
            let response = self
                .model
                .complete(ChatRequest {
                    messages: conversation.as_messages(),
                    tools: ToolKind::definitions(),
                    temperature: self.temperature,
                    max_tokens: self.max_tokens,
                })
                .await?;

            if response.tool_calls.is_empty() {
                return match response.text() {
                    Some(text) => Ok((text.to_string(), rounds)),
                    None => Err(AgentError::ModelResponse(
                        "model returned neither tool calls nor content".to_string(),
                    )),
                };
            }

            if rounds >= self.max_tool_rounds {
                // Cap reached while the model still wants tools: fall back to
                // the best text we have instead of looping forever.
                warn!(
                    target: "trip_agent::run",
                    rounds,
                    "tool-round cap reached with tool calls still pending"
                );
                let fallback = response
                    .text()
                    .map(str::to_string)
                    .or(last_content);
                return match fallback {
                    Some(text) => Ok((text, rounds)),
                    None => Err(AgentError::ModelResponse(format!(
                        "model exceeded {} tool rounds without producing content",
                        self.max_tool_rounds
                    ))),
                };
            }

            rounds += 1;
            if let Some(text) = response.text() {
                last_content = Some(text.to_string());
            }

            self.execute_tool_round(conversation, ctx, &response).await;
        }
    }

    /// Execute all tool calls of one round with bounded concurrency,
    /// appending results in call-issue order regardless of completion
    /// order, so the transcript stays reproducible.
    async fn execute_tool_round(
        &self,
        conversation: &mut Conversation,
        ctx: &RequestContext,
        response: &ChatResponse,
    ) {
        conversation.push(ConversationTurn::assistant_tool_calls(
            response.content.clone().unwrap_or_default(),
            response.tool_calls.clone(),
        ));

        debug!(
            target: "trip_agent::run",
            calls = response.tool_calls.len(),
            "executing tool round"
        );

        // `buffered` (not `buffer_unordered`) yields in stream order, which
        // restores call-issue order before anything is appended.
        let results: Vec<(String, String)> = stream::iter(response.tool_calls.iter())
            .map(|call| async move {
                let content = match self.executor.execute(call, ctx).await {
                    Ok(text) => text,
                    // Per-call error capture: a failed call feeds its error
                    // payload back as tool-result content instead of
                    // aborting the round.
                    Err(err) => {
                        warn!(
                            target: "trip_agent::tools",
                            tool = %call.name,
                            error = %err,
                            "tool call failed"
                        );
                        err.to_error_payload().to_string()
                    }
                };
                (call.id.clone(), content)
            })
            .buffered(FANOUT_CONCURRENCY)
            .collect()
            .await;

        for (tool_call_id, content) in results {
            conversation.push(ConversationTurn::tool_result(tool_call_id, content));
        }
    }
}
