//! Minimal stdio MCP server used by the integration tests.
//!
//! Tools: `echo` (returns its `text`), `search` (prefixed with `MOCK_MCP_NAME`)
//! and `fail` (always reports `isError`). Setting `MOCK_MCP_EXIT_ON_START`
//! makes the process exit before the handshake.

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use serde_json::{Value, json};
use std::env;
use std::sync::Arc;

#[derive(Clone)]
struct MockServer {
    name: String,
}

fn schema(value: Value) -> Arc<JsonObject> {
    Arc::new(value.as_object().cloned().unwrap_or_default())
}

fn text_argument(arguments: &Option<JsonObject>, key: &str) -> String {
    arguments
        .as_ref()
        .and_then(|args| args.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl ServerHandler for MockServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name.clone(),
                version: "0.1.0".to_string(),
                ..Implementation::from_build_env()
            },
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(vec![
            Tool::new(
                "echo",
                "Echo the provided text",
                schema(json!({
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"]
                })),
            ),
            Tool::new(
                "search",
                "Search an index",
                schema(json!({
                    "type": "object",
                    "properties": { "query": { "type": "string" } }
                })),
            ),
            Tool::new("fail", "Always fails", Arc::new(JsonObject::new())),
        ]))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        match request.name.as_ref() {
            "echo" => Ok(CallToolResult::success(vec![Content::text(format!(
                "Echo: {}",
                text_argument(&request.arguments, "text")
            ))])),
            "search" => Ok(CallToolResult::success(vec![Content::text(format!(
                "{}: results for {}",
                self.name,
                text_argument(&request.arguments, "query")
            ))])),
            "fail" => Ok(CallToolResult::error(vec![Content::text("tool exploded")])),
            other => Err(ErrorData::invalid_params(format!("unknown tool {other}"), None)),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if env::var_os("MOCK_MCP_EXIT_ON_START").is_some() {
        return Ok(());
    }
    let name = env::var("MOCK_MCP_NAME").unwrap_or_else(|_| "mock".to_string());

    let service = MockServer { name }.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
