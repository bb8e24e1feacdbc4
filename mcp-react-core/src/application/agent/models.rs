use crate::config::ProviderConfig;
use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
use crate::domain::types::ToolCallRequest;

/// Per-run settings of the reasoning loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOptions {
    pub model: String,
    pub system_prompt: String,
    pub max_iterations: usize,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl LoopOptions {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            model: config.model().to_string(),
            system_prompt: config.system_prompt().to_string(),
            max_iterations: config.max_iterations(),
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LoopState {
    Idle,
    Reasoning,
    ExecutingTools(Vec<ToolCallRequest>),
    Done(String),
    Aborted,
}
