pub mod context;
pub mod conversation;
pub mod orchestrator;
pub mod prompt;
pub mod tool_call;

pub use context::RequestContext;
pub use conversation::{Conversation, ConversationTurn, Role};
pub use orchestrator::{Agent, RunReport};
pub use tool_call::ToolCall;
