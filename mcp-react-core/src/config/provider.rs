use super::server::ServerDescriptor;
use crate::constants::{
    API_KEY_ENV, DEFAULT_API_BASE_URL, DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL,
    DEFAULT_PROVIDER_ID, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SYSTEM_PROMPT,
};
use serde::Deserialize;
use std::env;
use std::fmt;

/// Construction options in the harness shape: `{ id, config: {...} }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderOptions {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub config: ProviderConfig,
}

/// Provider settings; every field is optional and falls back to a default.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub mcp_servers: Vec<ServerDescriptor>,
    #[serde(default)]
    pub max_iterations: Option<usize>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("mcp_servers", &self.mcp_servers)
            .field("max_iterations", &self.max_iterations)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ProviderOptions {
    pub fn new(config: ProviderConfig) -> Self {
        Self { id: None, config }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> &str {
        non_blank(self.id.as_deref()).unwrap_or(DEFAULT_PROVIDER_ID)
    }
}

impl ProviderConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_servers(mut self, servers: Vec<ServerDescriptor>) -> Self {
        self.mcp_servers = servers;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Configured key, else `OPENAI_API_KEY` from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = non_blank(self.api_key.as_deref()) {
            return Some(key.to_string());
        }
        env::var(API_KEY_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    pub fn api_base_url(&self) -> &str {
        non_blank(self.api_base_url.as_deref()).unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn model(&self) -> &str {
        non_blank(self.model.as_deref()).unwrap_or(DEFAULT_MODEL)
    }

    pub fn system_prompt(&self) -> &str {
        non_blank(self.system_prompt.as_deref()).unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
