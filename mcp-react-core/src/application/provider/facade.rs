use super::report::ProviderResponse;
use super::template::{CallContext, PromptInput, substitute};
use crate::application::agent::{AgentError, LoopOptions, ReasoningLoop};
use crate::application::tooling::ToolRegistry;
use crate::config::{ConfigError, ProviderConfig, ProviderOptions};
use crate::infrastructure::model::{ModelProvider, OpenAIClient};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializationState {
    NotInitialized,
    Initialized,
}

/// Adapts one harness call into one reasoning loop run.
///
/// Initialization is lazy and memoized per instance: the first `call_api`
/// connects to the configured tool servers, later calls reuse them until
/// `cleanup`.
pub struct AgentProvider {
    id: String,
    config: ProviderConfig,
    injected_model: Option<Arc<dyn ModelProvider>>,
    model: Option<Arc<dyn ModelProvider>>,
    registry: ToolRegistry,
    state: InitializationState,
}

impl AgentProvider {
    pub fn new(options: ProviderOptions) -> Self {
        Self {
            id: options.id().to_string(),
            config: options.config,
            injected_model: None,
            model: None,
            registry: ToolRegistry::new(),
            state: InitializationState::NotInitialized,
        }
    }

    /// Use `model` instead of building an OpenAI client from the config.
    pub fn with_model(mut self, model: Arc<dyn ModelProvider>) -> Self {
        self.injected_model = Some(model);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    pub fn api_base_url(&self) -> &str {
        self.config.api_base_url()
    }

    pub fn initialization_state(&self) -> InitializationState {
        self.state
    }

    pub fn connected_servers(&self) -> usize {
        self.registry.connected_count()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn initialize(&mut self) -> Result<(), ProviderError> {
        if self.state == InitializationState::Initialized {
            return Ok(());
        }

        let model = match &self.injected_model {
            Some(model) => Arc::clone(model),
            None => {
                let api_key = self
                    .config
                    .resolve_api_key()
                    .ok_or(ConfigError::MissingApiKey)?;
                let client = OpenAIClient::new(
                    self.id.clone(),
                    self.config.api_base_url(),
                    api_key,
                    self.request_timeout(),
                )
                .map_err(|source| ConfigError::HttpClient { source })?;
                Arc::new(client) as Arc<dyn ModelProvider>
            }
        };

        self.registry
            .populate(&self.config.mcp_servers, self.request_timeout())
            .await;
        self.model = Some(model);
        self.state = InitializationState::Initialized;
        info!(
            provider = self.id.as_str(),
            model = self.config.model(),
            servers = self.registry.len(),
            connected = self.registry.connected_count(),
            "Agent provider initialized"
        );
        Ok(())
    }

    /// Run one task. Never fails: errors are reported in the response's
    /// `error` field with `output` set to `null`.
    pub async fn call_api(
        &mut self,
        prompt: impl Into<PromptInput>,
        context: &CallContext,
    ) -> ProviderResponse {
        let prompt = prompt.into();
        match self.run(&prompt, context).await {
            Ok(response) => response,
            Err(err) => {
                warn!(provider = self.id.as_str(), %err, "Agent call failed");
                ProviderResponse::failure(err)
            }
        }
    }

    async fn run(
        &mut self,
        prompt: &PromptInput,
        context: &CallContext,
    ) -> Result<ProviderResponse, ProviderError> {
        self.initialize().await?;
        let model = match &self.model {
            Some(model) => Arc::clone(model),
            None => return Err(ConfigError::MissingApiKey.into()),
        };

        let task = substitute(&prompt.text(), &context.vars);
        debug!(provider = self.id.as_str(), task_len = task.len(), "Prepared task prompt");

        let started_at = Utc::now();
        let clock = Instant::now();
        let result = ReasoningLoop::new(
            &*model,
            &mut self.registry,
            LoopOptions::from_config(&self.config),
        )
        .run(task)
        .await?;
        let elapsed = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(ProviderResponse::from_run(
            result,
            elapsed,
            self.registry.connected_count(),
            started_at,
        ))
    }

    /// Disconnect every tool server and return to the uninitialized state.
    pub async fn cleanup(&mut self) {
        self.registry.teardown_all().await;
        self.model = None;
        self.state = InitializationState::NotInitialized;
        debug!(provider = self.id.as_str(), "Agent provider cleaned up");
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs())
    }
}
