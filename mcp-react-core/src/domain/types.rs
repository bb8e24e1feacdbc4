use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One entry of the conversation; each role carries exactly the fields it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ConversationTurn {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self::Assistant {
            content,
            tool_calls,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            Self::System { .. } => MessageRole::System,
            Self::User { .. } => MessageRole::User,
            Self::Assistant { .. } => MessageRole::Assistant,
            Self::Tool { .. } => MessageRole::Tool,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::User { content } | Self::Tool { content, .. } => {
                Some(content.as_str())
            }
            Self::Assistant { content, .. } => content.as_deref(),
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }
}

/// Append-only transcript of one run.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
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

    /// Text of the most recent assistant turn that had any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.turns.iter().rev().find_map(|turn| match turn {
            ConversationTurn::Assistant {
                content: Some(text),
                ..
            } if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        })
    }

    /// The tool turn answering `call_id`, if one was appended.
    pub fn tool_result(&self, call_id: &str) -> Option<&ConversationTurn> {
        self.turns.iter().find(|turn| {
            matches!(turn, ConversationTurn::Tool { tool_call_id, .. } if tool_call_id == call_id)
        })
    }
}

/// Result of one tool invocation as recorded in the run log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolOutcome {
    Success { payload: Value },
    Failure { reason: String },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    pub id: String,
    pub tool: String,
    pub arguments: Value,
    pub outcome: ToolOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    IterationLimit,
}

/// Immutable summary of a finished reasoning loop run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub final_text: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub iterations: usize,
    pub outcome: RunOutcome,
    pub message_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_results_pair_with_their_call_ids() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationTurn::user("task"));
        conversation.push(ConversationTurn::assistant(
            None,
            vec![
                ToolCallRequest::new("call-a", "search", json!({})),
                ToolCallRequest::new("call-b", "fetch", json!({})),
            ],
        ));
        conversation.push(ConversationTurn::tool("call-a", "first"));
        conversation.push(ConversationTurn::tool("call-b", "second"));

        assert_eq!(
            conversation.tool_result("call-a").and_then(ConversationTurn::content),
            Some("first")
        );
        assert_eq!(
            conversation.tool_result("call-b").and_then(ConversationTurn::content),
            Some("second")
        );
        assert!(conversation.tool_result("call-c").is_none());
    }

    #[test]
    fn last_assistant_text_skips_tool_only_turns() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationTurn::assistant(Some("thinking".into()), vec![]));
        conversation.push(ConversationTurn::assistant(
            None,
            vec![ToolCallRequest::new("1", "x", json!({}))],
        ));
        assert_eq!(conversation.last_assistant_text(), Some("thinking"));
    }

    #[test]
    fn turns_serialize_with_role_tag() {
        let value = serde_json::to_value(ConversationTurn::tool("abc", "done")).expect("json");
        assert_eq!(
            value,
            json!({ "role": "tool", "tool_call_id": "abc", "content": "done" })
        );
    }
}
