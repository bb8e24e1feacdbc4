use super::error::ConfigError;
use super::provider::{ProviderConfig, ProviderOptions};
use super::server::ServerDescriptor;
use std::path::Path;

/// Runner configuration loaded from `agent.toml`.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub id: Option<String>,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_iterations: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub servers: Vec<ServerDescriptor>,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Harness-shaped options for constructing an agent provider
    pub fn to_options(&self) -> ProviderOptions {
        ProviderOptions {
            id: self.id.clone(),
            config: ProviderConfig {
                api_key: self.api_key.clone(),
                api_base_url: self.api_base_url.clone(),
                model: self.model.clone(),
                system_prompt: self.system_prompt.clone(),
                mcp_servers: self.servers.clone(),
                max_iterations: self.max_iterations,
                request_timeout_secs: self.request_timeout_secs,
            },
        }
    }
}
