use crate::domain::types::{RunOutcome, RunResult, ToolCallRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

const TOKENS_PER_MESSAGE: usize = 100;
const PROMPT_TOKENS_PER_MESSAGE: usize = 60;
const COMPLETION_TOKENS_PER_MESSAGE: usize = 40;
const COST_PER_TOKEN: f64 = 0.00002;

/// Approximate token counts derived from the conversation length.
///
/// This is a flat per-message heuristic, not a tokenizer count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub total: usize,
    pub prompt: usize,
    pub completion: usize,
}

impl TokenUsage {
    pub fn estimate(message_count: usize) -> Self {
        Self {
            total: message_count * TOKENS_PER_MESSAGE,
            prompt: message_count * PROMPT_TOKENS_PER_MESSAGE,
            completion: message_count * COMPLETION_TOKENS_PER_MESSAGE,
        }
    }

    pub fn cost(&self) -> f64 {
        self.total as f64 * COST_PER_TOKEN
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub iterations: usize,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Wall-clock duration of the loop run in milliseconds
    pub execution_time: u64,
    pub mcp_servers_connected: usize,
    pub outcome: RunOutcome,
    pub started_at: DateTime<Utc>,
}

/// Result of one `call_api`; `output` is `null` exactly when `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl ProviderResponse {
    pub fn from_run(
        result: RunResult,
        execution_time: u64,
        mcp_servers_connected: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        let usage = TokenUsage::estimate(result.message_count);
        Self {
            output: Some(render_output(&result.final_text, &result.tool_calls)),
            error: None,
            token_usage: Some(usage),
            cost: Some(usage.cost()),
            cached: Some(false),
            metadata: Some(ResponseMetadata {
                iterations: result.iterations,
                tool_calls: result.tool_calls,
                execution_time,
                mcp_servers_connected,
                outcome: result.outcome,
                started_at,
            }),
        }
    }

    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            output: None,
            error: Some(format!("Error calling OpenAI agent: {message}")),
            token_usage: None,
            cost: None,
            cached: None,
            metadata: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Final answer followed by a human-readable log of the tool calls.
pub fn render_output(final_text: &str, records: &[ToolCallRecord]) -> String {
    let calls = records
        .iter()
        .map(|record| {
            let args = serde_json::to_string_pretty(&record.arguments)
                .unwrap_or_else(|_| record.arguments.to_string());
            format!("Tool called {} with args \n{args}", record.tool)
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{final_text}\n\n Called Tools: {calls}")
}
