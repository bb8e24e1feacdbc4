//! Tool-augmented reasoning over MCP tool servers.
//!
//! An [`AgentProvider`] connects to a set of MCP servers (local processes,
//! scripts or HTTP endpoints), then drives an OpenAI-compatible chat model
//! through a reason/act loop: the model requests tool calls, the
//! [`ToolRegistry`] routes them to the owning server, and results are fed
//! back until the model answers or the iteration budget runs out.

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, provider, tooling};
pub use config::{AppConfig, ConfigError, ProviderConfig, ProviderOptions, ServerDescriptor};
pub use domain::types;
pub use infrastructure::model;

pub use agent::{AgentError, LoopOptions, ReasoningLoop};
pub use provider::{AgentProvider, CallContext, PromptInput, ProviderError, ProviderResponse};
pub use tooling::{ToolError, ToolRegistry, ToolServerConnection};
