use super::error::ConfigError;
use super::server::ServerDescriptor;
use crate::constants::{CONFIG_PATH, ENV_PATH};
use dotenvy::from_filename;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::{debug, warn};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    pub id: Option<String>,
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_iterations: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub servers: Vec<ServerDescriptor>,
}

/// Ensures environment variables are loaded from config/.env and .env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        if from_filename(ENV_PATH).is_err() {
            let _ = dotenvy::dotenv();
        }
    });
}

/// Load and validate configuration from a file path
pub fn load_config(path: Option<&Path>) -> Result<super::AppConfig, ConfigError> {
    ensure_env_loaded();
    let config_path = path.unwrap_or_else(|| Path::new(CONFIG_PATH));
    read_config(config_path)
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str, origin: &Path) -> Result<super::AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    Ok(build(parsed))
}

fn read_config(path: &Path) -> Result<super::AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

fn build(parsed: RawConfig) -> super::AppConfig {
    let api_key = parsed
        .api_key
        .filter(|key| !key.trim().is_empty())
        .or_else(|| parsed.api_key_env.as_deref().and_then(resolve_api_key_env));

    super::AppConfig {
        id: parsed.id,
        api_key,
        api_base_url: parsed.api_base_url,
        model: parsed.model,
        system_prompt: parsed.system_prompt,
        max_iterations: parsed.max_iterations,
        request_timeout_secs: parsed.request_timeout_secs,
        servers: parsed.servers,
    }
}

/// Resolve an API key from a named environment variable
fn resolve_api_key_env(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        Ok(_) => None,
        Err(err) => {
            warn!(env_var = name, %err, "API key environment variable is not set");
            None
        }
    }
}
