pub mod types;

pub use types::{
    Conversation, ConversationTurn, MessageRole, RunOutcome, RunResult, ToolCallRecord,
    ToolCallRequest, ToolOutcome,
};
