//! Application constants
//!
//! Single source of truth for defaults, paths, and protocol identifiers.

/// Provider identifier reported when none is configured
pub const DEFAULT_PROVIDER_ID: &str = "openai-react-agent";

/// Chat model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Hosted completion endpoint used when no base URL is configured
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable consulted for the completion-endpoint key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Upper bound on reasoning passes per run
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Timeout applied to every HTTP request (completion endpoint and remote tool servers)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/agent.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Persona used when no system prompt is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that solves tasks step by step. \
Think about what information you need, call the available tools to gather it, \
and inspect each tool result before deciding on the next step. \
If a tool reports an error, adjust your approach instead of repeating the same call. \
When you have enough information, reply with the final answer and do not call any more tools.";
