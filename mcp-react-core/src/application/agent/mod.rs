//! # Agent Module
//!
//! The tool-augmented reasoning loop.
//!
//! ## Key Types
//!
//! - [`ReasoningLoop`] - One single-use run over a borrowed tool registry
//! - [`LoopOptions`] - Model, system prompt and iteration budget
//! - [`AgentError`] - Errors that end a run
//!
//! ## Agent Loop
//!
//! 1. Seed the conversation with the system prompt and the task
//! 2. Send the conversation and the available tools to the model
//! 3. Execute every requested tool call in order and append its result
//! 4. Repeat until the model answers without tool calls or the budget runs out

mod errors;
mod models;
mod runner;


pub use errors::AgentError;
pub use models::LoopOptions;
pub use runner::{ReasoningLoop, render_tool_content};
