use super::errors::AgentError;
use super::models::{LoopOptions, LoopState};
use crate::application::tooling::{ToolError, ToolRegistry};
use crate::domain::types::{
    Conversation, ConversationTurn, RunOutcome, RunResult, ToolCallRecord, ToolCallRequest,
    ToolOutcome,
};
use crate::infrastructure::model::{ModelProvider, ModelRequest};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A single run of the reason/act loop.
///
/// The loop borrows the registry mutably because a failing call can change a
/// connection's state; it never adds or removes servers. `run` consumes the
/// loop, so each instance executes at most once.
pub struct ReasoningLoop<'a> {
    model: &'a dyn ModelProvider,
    registry: &'a mut ToolRegistry,
    options: LoopOptions,
    conversation: Conversation,
    records: Vec<ToolCallRecord>,
    iterations: usize,
    run_id: Uuid,
}

impl<'a> ReasoningLoop<'a> {
    pub fn new(
        model: &'a dyn ModelProvider,
        registry: &'a mut ToolRegistry,
        options: LoopOptions,
    ) -> Self {
        Self {
            model,
            registry,
            options,
            conversation: Conversation::new(),
            records: Vec::new(),
            iterations: 0,
            run_id: Uuid::new_v4(),
        }
    }

    pub async fn run(mut self, task: impl Into<String>) -> Result<RunResult, AgentError> {
        let task = task.into();
        info!(
            run_id = %self.run_id,
            model = self.options.model.as_str(),
            max_iterations = self.options.max_iterations,
            "Reasoning loop started"
        );

        let mut state = LoopState::Idle;
        loop {
            state = match state {
                LoopState::Idle => {
                    self.conversation
                        .push(ConversationTurn::system(self.options.system_prompt.clone()));
                    self.conversation.push(ConversationTurn::user(task.clone()));
                    LoopState::Reasoning
                }
                LoopState::Reasoning => self.reason().await?,
                LoopState::ExecutingTools(calls) => {
                    for call in &calls {
                        let record = self.execute_tool(call).await;
                        self.conversation
                            .push(ConversationTurn::tool(call.id.clone(), tool_turn_text(&record)));
                        self.records.push(record);
                    }
                    LoopState::Reasoning
                }
                LoopState::Done(text) => return Ok(self.finish(text, RunOutcome::Completed)),
                LoopState::Aborted => {
                    warn!(
                        run_id = %self.run_id,
                        iterations = self.iterations,
                        "Iteration limit reached before a final answer"
                    );
                    let text = self
                        .conversation
                        .last_assistant_text()
                        .map(str::to_string)
                        .unwrap_or_else(|| {
                            format!(
                                "Iteration limit reached ({}) without a final answer.",
                                self.options.max_iterations
                            )
                        });
                    return Ok(self.finish(text, RunOutcome::IterationLimit));
                }
            };
        }
    }

    async fn reason(&mut self) -> Result<LoopState, AgentError> {
        if self.iterations >= self.options.max_iterations {
            return Ok(LoopState::Aborted);
        }
        self.iterations += 1;

        let request = ModelRequest {
            model: self.options.model.clone(),
            messages: self.conversation.turns().to_vec(),
            tools: self.registry.available_tools(),
        };
        debug!(
            run_id = %self.run_id,
            iteration = self.iterations,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Submitting conversation to model"
        );

        let response = self.model.chat(request).await?;
        let calls = response.tool_calls.clone();
        let content = response.content.clone();
        self.conversation.push(response.into_turn());

        if calls.is_empty() {
            Ok(LoopState::Done(content.unwrap_or_default()))
        } else {
            info!(
                run_id = %self.run_id,
                iteration = self.iterations,
                calls = calls.len(),
                "Model requested tool calls"
            );
            Ok(LoopState::ExecutingTools(calls))
        }
    }

    /// Execute one requested call through the registry. Never fails: any tool
    /// error becomes a failure outcome.
    pub async fn execute_tool(&mut self, request: &ToolCallRequest) -> ToolCallRecord {
        let outcome = match &request.arguments {
            Value::Object(_) | Value::Null => {
                match self
                    .registry
                    .invoke(&request.name, request.arguments.clone())
                    .await
                {
                    Ok(payload) => ToolOutcome::Success { payload },
                    Err(err) => failure(err),
                }
            }
            _ => failure(ToolError::InvalidArguments {
                tool: request.name.clone(),
            }),
        };

        match &outcome {
            ToolOutcome::Success { .. } => {
                debug!(run_id = %self.run_id, tool = request.name.as_str(), "Tool call succeeded")
            }
            ToolOutcome::Failure { reason } => {
                warn!(run_id = %self.run_id, tool = request.name.as_str(), reason = reason.as_str(), "Tool call failed")
            }
        }

        ToolCallRecord {
            id: request.id.clone(),
            tool: request.name.clone(),
            arguments: request.arguments.clone(),
            outcome,
        }
    }

    fn finish(self, final_text: String, outcome: RunOutcome) -> RunResult {
        info!(
            run_id = %self.run_id,
            iterations = self.iterations,
            tool_calls = self.records.len(),
            ?outcome,
            "Reasoning loop finished"
        );
        RunResult {
            final_text,
            tool_calls: self.records,
            iterations: self.iterations,
            outcome,
            message_count: self.conversation.len(),
        }
    }
}

fn failure(err: ToolError) -> ToolOutcome {
    ToolOutcome::Failure {
        reason: err.to_string(),
    }
}

fn tool_turn_text(record: &ToolCallRecord) -> String {
    match &record.outcome {
        ToolOutcome::Success { payload } => render_tool_content(payload),
        ToolOutcome::Failure { reason } => reason.clone(),
    }
}

/// Text fed back to the model for a successful call: the joined `text`
/// blocks when every content block is textual, otherwise compact JSON.
pub fn render_tool_content(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        Value::Array(blocks) if !blocks.is_empty() => {
            let texts: Option<Vec<&str>> = blocks
                .iter()
                .map(|block| match block.get("type").and_then(Value::as_str) {
                    Some("text") => block.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect();
            match texts {
                Some(texts) => texts.join("\n"),
                None => payload.to_string(),
            }
        }
        other => other.to_string(),
    }
}
