use thiserror::Error;

/// Which way a place lookup failed. Not-found and provider errors are
/// distinct kinds so callers can tell "no such place" from "provider down".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupErrorKind {
    NotFound,
    Provider,
}

impl std::fmt::Display for LookupErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupErrorKind::NotFound => write!(f, "not found"),
            LookupErrorKind::Provider => write!(f, "provider error"),
        }
    }
}

/// Main error type for the agent system
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unknown tool name or malformed arguments. Local to one tool
    /// execution; fed back to the model as tool-result content.
    #[error("Invalid tool call `{name}`: {message}")]
    InvalidToolCall { name: String, message: String },

    /// The model produced no usable final content. Terminal for the run.
    #[error("Model response error: {0}")]
    ModelResponse(String),

    /// Final model output failed schema validation. Terminal for the run;
    /// `raw` retains the offending text for diagnostics and must never be
    /// shown to the end user.
    #[error("Validation error: {message}")]
    Validation { message: String, raw: String },

    /// A place lookup failed. Local to one enrichment or tool lookup;
    /// recovered by dropping the affected suggestion.
    #[error("Place lookup failed for `{query}`: {kind}")]
    Lookup { query: String, kind: LookupErrorKind },

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    pub fn invalid_tool_call(name: impl Into<String>, message: impl Into<String>) -> Self {
        AgentError::InvalidToolCall {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn lookup_not_found(query: impl Into<String>) -> Self {
        AgentError::Lookup {
            query: query.into(),
            kind: LookupErrorKind::NotFound,
        }
    }

    pub fn lookup_provider(query: impl Into<String>) -> Self {
        AgentError::Lookup {
            query: query.into(),
            kind: LookupErrorKind::Provider,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Transport(err) => err.is_timeout() || err.is_connect(),
            AgentError::RateLimit { .. } => true,
            AgentError::Timeout(_) => true,
            AgentError::Lookup { kind, .. } => *kind == LookupErrorKind::Provider,
            _ => false,
        }
    }

    /// Local failures are recovered in place (error payload as tool-result
    /// content, or a dropped suggestion); everything else is terminal for
    /// the orchestration run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgentError::InvalidToolCall { .. } | AgentError::Lookup { .. }
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "CONFIG_ERROR",
            AgentError::Transport(_) => "TRANSPORT_ERROR",
            AgentError::Serialization(_) => "SERIALIZATION_ERROR",
            AgentError::InvalidToolCall { .. } => "INVALID_TOOL_CALL",
            AgentError::ModelResponse(_) => "MODEL_RESPONSE_ERROR",
            AgentError::Validation { .. } => "VALIDATION_ERROR",
            AgentError::Lookup { kind, .. } => match kind {
                LookupErrorKind::NotFound => "PLACE_NOT_FOUND",
                LookupErrorKind::Provider => "PLACES_PROVIDER_ERROR",
            },
            AgentError::Timeout(_) => "TIMEOUT_ERROR",
            AgentError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            AgentError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Convert to a structured error payload suitable for feeding back to
    /// the model as tool-result content.
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}
