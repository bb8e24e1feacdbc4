// Shared fixtures - mock completion endpoint and mock HTTP MCP server
//
// Both servers bind to an ephemeral localhost port and run on the test runtime.

#![allow(dead_code)]

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use mcp_react_core::config::ServerDescriptor;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ListToolsResult, PaginatedRequestParams,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const MOCK_SERVER_BIN: &str = env!("CARGO_BIN_EXE_mock-mcp-server");

/// Descriptor for the stdio mock server binary.
pub fn stdio_server(name: &str) -> ServerDescriptor {
    ServerDescriptor::process(MOCK_SERVER_BIN, Vec::<String>::new())
        .with_name(name)
        .with_env("MOCK_MCP_NAME", name)
}

/// Descriptor for a command that cannot be spawned.
pub fn unreachable_server() -> ServerDescriptor {
    ServerDescriptor::process("/nonexistent/path/to/mcp-server", Vec::<String>::new())
        .with_name("unreachable")
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

// ---------------------------------------------------------------------------
// Mock HTTP MCP server
// ---------------------------------------------------------------------------

/// JSON-RPC methods and `mcp-session-id` headers seen by the HTTP mock, in arrival order.
#[derive(Default)]
pub struct McpRecorder {
    pub methods: Mutex<Vec<String>>,
    pub session_headers: Mutex<Vec<Option<String>>>,
}

struct McpState {
    expected_header: (String, String),
    recorder: Arc<McpRecorder>,
}

#[derive(Clone)]
struct LookupServer;

impl ServerHandler for LookupServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let schema = json!({
            "type": "object",
            "properties": { "key": { "type": "string" } }
        });
        Ok(ListToolsResult::with_all_items(vec![Tool::new(
            "lookup",
            "Look up a key",
            Arc::new(schema.as_object().cloned().unwrap_or_default()),
        )]))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let key = request
            .arguments
            .as_ref()
            .and_then(|args| args.get("key"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(CallToolResult::success(vec![Content::text(format!(
            "value of {key}"
        ))]))
    }
}

/// Start a streamable HTTP MCP server at `/mcp` that rejects requests lacking `expected_header`.
pub async fn spawn_http_mcp(expected_header: (&str, &str)) -> (SocketAddr, Arc<McpRecorder>) {
    let recorder = Arc::new(McpRecorder::default());
    let state = Arc::new(McpState {
        expected_header: (expected_header.0.to_string(), expected_header.1.to_string()),
        recorder: Arc::clone(&recorder),
    });
    let service = StreamableHttpService::new(
        || Ok(LookupServer),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    let app = Router::new()
        .nest_service("/mcp", service)
        .layer(middleware::from_fn_with_state(state, guard_and_record));
    (serve(app).await, recorder)
}

async fn guard_and_record(
    State(state): State<Arc<McpState>>,
    request: Request,
    next: Next,
) -> Response {
    let (name, value) = &state.expected_header;
    let authorized = request
        .headers()
        .get(name.as_str())
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == value);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "missing credentials").into_response();
    }

    let session = request
        .headers()
        .get("mcp-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Ok(mut sessions) = state.recorder.session_headers.lock() {
        sessions.push(session);
    }

    let (parts, body) = request.into_parts();
    let Ok(bytes) = to_bytes(body, usize::MAX).await else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if let Some(method) = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|message| message.get("method").and_then(Value::as_str).map(str::to_string))
    {
        if let Ok(mut methods) = state.recorder.methods.lock() {
            methods.push(method);
        }
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// ---------------------------------------------------------------------------
// Mock chat-completions endpoint
// ---------------------------------------------------------------------------

/// Scripted completion endpoint: the first request asks for `tool` with
/// `arguments`; once a tool result is in the conversation it answers with
/// that result.
#[derive(Default)]
pub struct CompletionRecorder {
    pub requests: Mutex<Vec<Value>>,
    pub authorization: Mutex<Vec<Option<String>>>,
}

struct CompletionState {
    tool: String,
    arguments: Value,
    recorder: Arc<CompletionRecorder>,
}

pub async fn spawn_openai_mock(tool: &str, arguments: Value) -> (SocketAddr, Arc<CompletionRecorder>) {
    let recorder = Arc::new(CompletionRecorder::default());
    let state = Arc::new(CompletionState {
        tool: tool.to_string(),
        arguments,
        recorder: Arc::clone(&recorder),
    });
    let app = Router::new()
        .route("/v1/chat/completions", post(completion_handler))
        .with_state(state);
    (serve(app).await, recorder)
}

async fn completion_handler(
    State(state): State<Arc<CompletionState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    if let Ok(mut auth) = state.recorder.authorization.lock() {
        auth.push(
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
    }
    if let Ok(mut requests) = state.recorder.requests.lock() {
        requests.push(body.clone());
    }

    let tool_result = body["messages"]
        .as_array()
        .and_then(|messages| {
            messages
                .iter()
                .rev()
                .find(|message| message["role"] == "tool")
        })
        .and_then(|message| message["content"].as_str())
        .map(str::to_string);

    let message = match tool_result {
        Some(result) => json!({
            "role": "assistant",
            "content": format!("The tool said: {result}")
        }),
        None => json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {
                    "name": state.tool,
                    "arguments": state.arguments.to_string()
                }
            }]
        }),
    };

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "choices": [{ "index": 0, "message": message, "finish_reason": "stop" }]
    }))
}
