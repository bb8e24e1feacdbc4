//! Model traits

use super::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;

/// Trait for chat-completion backends
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send one completion request and return the assistant turn
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}
