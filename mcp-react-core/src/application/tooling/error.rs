use rmcp::ServiceError;
use rmcp::service::ClientInitializeError;
use serde_json::Value;
use thiserror::Error;

/// Failures raised while talking MCP to a tool server.
#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("failed to spawn MCP server '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("MCP server '{server}' transport error: {message}")]
    Transport { server: String, message: String },
    #[error("MCP handshake with '{server}' failed: {source}")]
    Handshake {
        server: String,
        #[source]
        source: ClientInitializeError,
    },
    #[error("MCP server '{server}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },
    #[error("MCP session with '{server}' failed: {source}")]
    Session {
        server: String,
        #[source]
        source: ServiceError,
    },
    #[error("MCP server '{server}' is not running")]
    Terminated { server: String },
    #[error("MCP session with '{server}' did not shut down cleanly: {source}")]
    Shutdown {
        server: String,
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("HTTP client for MCP server '{server}' could not be built: {source}")]
    Http {
        server: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors surfaced by a tool server connection or the registry.
///
/// Every variant is recoverable from the reasoning loop's point of view: the
/// loop turns it into a tool turn the model can read.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Not connected to MCP server '{server}'")]
    NotConnected { server: String },
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Tool '{tool}' on MCP server '{server}' failed: {}", render_payload(.payload))]
    RemoteExecution {
        server: String,
        tool: String,
        payload: Value,
    },
    #[error("Tool '{tool}' on MCP server '{server}' could not be reached: {source}")]
    Transport {
        server: String,
        tool: String,
        #[source]
        source: ToolInvokeError,
    },
    #[error("Failed to connect to MCP server '{server}': {source}")]
    ConnectionFailure {
        server: String,
        #[source]
        source: ToolInvokeError,
    },
    #[error("Invalid arguments for tool '{tool}': expected a JSON object")]
    InvalidArguments { tool: String },
}

fn render_payload(payload: &Value) -> String {
    if let Some(text) = payload.as_str() {
        return text.to_string();
    }
    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    if let Some(blocks) = payload.as_array() {
        let texts: Vec<&str> = blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect();
        if !texts.is_empty() {
            return texts.join("\n");
        }
    }
    payload.to_string()
}
