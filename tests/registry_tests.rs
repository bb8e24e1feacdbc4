// Tool registry tests - real transports against mock MCP servers
//
// Stdio connections talk to the `mock-mcp-server` binary; remote connections
// talk to an in-process axum server that checks credentials.

mod support;

use mcp_react_core::config::{AuthConfig, ServerDescriptor};
use mcp_react_core::tooling::{ConnectionState, ToolError, ToolRegistry, ToolServerConnection};
use serde_json::json;
use std::time::Duration;
use support::{spawn_http_mcp, stdio_server, unreachable_server};

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn stdio_connection_lists_and_calls_tools() {
    let mut connection = ToolServerConnection::with_timeout(stdio_server("alpha"), TIMEOUT);
    connection.connect().await.expect("mock server connects");
    assert_eq!(connection.state(), ConnectionState::Connected);

    let names: Vec<String> = connection
        .list_tools()
        .expect("connected")
        .map(|tool| tool.name.clone())
        .collect();
    assert_eq!(names, vec!["echo", "search", "fail"]);

    let content = connection
        .call("echo", json!({ "text": "hello" }))
        .await
        .expect("echo succeeds");
    assert_eq!(content, json!([{ "type": "text", "text": "Echo: hello" }]));

    connection.disconnect().await;
    assert_eq!(connection.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn stdio_remote_errors_keep_connection_alive() {
    let mut connection = ToolServerConnection::with_timeout(stdio_server("alpha"), TIMEOUT);
    connection.connect().await.expect("mock server connects");

    let err = connection
        .call("fail", json!({}))
        .await
        .expect_err("tool reports isError");
    assert!(matches!(err, ToolError::RemoteExecution { .. }));
    assert!(err.to_string().contains("tool exploded"));
    assert!(connection.is_connected());

    let content = connection
        .call("echo", json!({ "text": "still here" }))
        .await
        .expect("connection still usable");
    assert_eq!(content[0]["text"], "Echo: still here");
    connection.disconnect().await;
}

#[tokio::test]
async fn server_exiting_during_handshake_fails_connection() {
    let descriptor = stdio_server("dying").with_env("MOCK_MCP_EXIT_ON_START", "1");
    let mut connection = ToolServerConnection::with_timeout(descriptor, TIMEOUT);

    let err = connection.connect().await.expect_err("handshake fails");
    assert!(matches!(err, ToolError::ConnectionFailure { .. }));
    assert_eq!(connection.state(), ConnectionState::Failed);
}

#[tokio::test]
async fn populate_skips_unreachable_servers() {
    let mut registry = ToolRegistry::new();
    registry
        .populate(&[unreachable_server(), stdio_server("alpha")], TIMEOUT)
        .await;

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.connected_count(), 1);
    assert_eq!(registry.connections()[0].state(), ConnectionState::Failed);
    assert_eq!(registry.available_tools().len(), 3);

    registry.teardown_all().await;
    assert!(registry.is_empty());
}

#[tokio::test]
async fn colliding_tools_route_to_first_registered_server() {
    let mut registry = ToolRegistry::new();
    registry
        .populate(&[stdio_server("alpha"), stdio_server("beta")], TIMEOUT)
        .await;

    for _ in 0..2 {
        let content = registry
            .invoke("search", json!({ "query": "rust" }))
            .await
            .expect("search routed");
        assert_eq!(content[0]["text"], "alpha: results for rust");
    }
    let names: Vec<String> = registry
        .available_tools()
        .into_iter()
        .map(|tool| tool.name)
        .collect();
    assert_eq!(names, vec!["echo", "search", "fail"]);

    let err = registry
        .invoke("unknown_tool", json!({}))
        .await
        .expect_err("unknown");
    assert_eq!(err.to_string(), "Unknown tool: unknown_tool");
    registry.teardown_all().await;
}

#[tokio::test]
async fn http_connection_sends_api_key_and_session() {
    let (addr, recorder) = spawn_http_mcp(("x-api-key", "secret-key")).await;
    let descriptor = ServerDescriptor::remote(format!("http://{addr}/mcp"))
        .with_name("remote")
        .with_auth(AuthConfig::ApiKey {
            api_key: "secret-key".into(),
        });

    let mut connection = ToolServerConnection::with_timeout(descriptor, TIMEOUT);
    connection.connect().await.expect("remote server connects");
    let content = connection
        .call("lookup", json!({ "key": "answer" }))
        .await
        .expect("lookup succeeds over streamable HTTP");
    assert_eq!(content[0]["text"], "value of answer");
    connection.disconnect().await;

    let methods = recorder.methods.lock().expect("methods").clone();
    assert_eq!(methods.first().map(String::as_str), Some("initialize"));
    let listed = methods.iter().position(|m| m == "tools/list").expect("tools listed");
    let called = methods.iter().position(|m| m == "tools/call").expect("tool called");
    assert!(listed < called);

    let sessions = recorder.session_headers.lock().expect("sessions").clone();
    assert_eq!(sessions[0], None);
    let session = sessions[1].clone().expect("session id echoed after initialize");
    assert!(sessions[1..].iter().all(|s| s.as_deref() == Some(session.as_str())));
}

#[tokio::test]
async fn http_connection_without_credentials_fails() {
    let (addr, _recorder) = spawn_http_mcp(("authorization", "Bearer right-token")).await;
    let descriptor = ServerDescriptor::remote(format!("http://{addr}/mcp")).with_auth(
        AuthConfig::Bearer {
            token: "wrong-token".into(),
        },
    );

    let mut connection = ToolServerConnection::with_timeout(descriptor, TIMEOUT);
    let err = connection.connect().await.expect_err("unauthorized");
    assert!(matches!(err, ToolError::ConnectionFailure { .. }));
    assert_eq!(connection.state(), ConnectionState::Failed);
}
