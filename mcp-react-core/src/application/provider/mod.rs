//! Harness-facing provider: prompt templating, lifecycle and the run report.

mod facade;
mod report;
mod template;

pub use facade::{AgentProvider, InitializationState, ProviderError};
pub use report::{ProviderResponse, ResponseMetadata, TokenUsage, render_output};
pub use template::{CallContext, PromptInput, substitute};
