//! Message adapters - convert conversation turns to the chat-completions wire format

use crate::application::tooling::ToolDescriptor;
use crate::domain::types::{ConversationTurn, ToolCallRequest};
use serde_json::{Value, json};

/// Adapter for converting turns and tools to OpenAI-style JSON
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert turns to `[{"role": ..., "content": ...}]`, keeping tool-call linkage
    pub fn to_openai_format(turns: &[ConversationTurn]) -> Vec<Value> {
        turns.iter().map(Self::turn_to_openai).collect()
    }

    fn turn_to_openai(turn: &ConversationTurn) -> Value {
        let mut message = json!({ "role": turn.role().as_str(), "content": turn.content() });
        match turn {
            ConversationTurn::Assistant { tool_calls, .. } if !tool_calls.is_empty() => {
                message["tool_calls"] =
                    Value::Array(tool_calls.iter().map(Self::tool_call_to_openai).collect());
            }
            ConversationTurn::Tool { tool_call_id, .. } => {
                message["tool_call_id"] = json!(tool_call_id);
            }
            _ => {}
        }
        message
    }

    fn tool_call_to_openai(call: &ToolCallRequest) -> Value {
        // arguments travel as JSON text on the wire
        let arguments = match &call.arguments {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        };
        json!({
            "id": call.id,
            "type": "function",
            "function": { "name": call.name, "arguments": arguments }
        })
    }

    /// Convert tool descriptors to `function` tool declarations
    pub fn tools_to_openai(tools: &[ToolDescriptor]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description.clone().unwrap_or_default(),
                        "parameters": tool.input_schema
                    }
                })
            })
            .collect()
    }

    /// Parse the `arguments` text of a tool call; unparseable text is kept as a string
    pub fn parse_arguments(raw: &str) -> Value {
        if raw.trim().is_empty() {
            return json!({});
        }
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    }
}
