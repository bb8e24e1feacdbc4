//! The rmcp client session shared by the stdio and HTTP transports.

use super::error::ToolInvokeError;
use super::interface::{CallOutput, ToolDescriptor, call_arguments};
use rmcp::model::{
    CallToolRequestParams, ClientCapabilities, ClientInfo, Implementation, ProtocolVersion,
};
use rmcp::service::{Peer, RoleClient, RunningService, ServiceError};
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

pub(crate) type McpClient = RunningService<RoleClient, ClientInfo>;

/// What this client announces in the `initialize` handshake.
pub(crate) fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: ProtocolVersion::V_2025_06_18,
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            title: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: None,
            icons: None,
            website_url: None,
        },
    }
}

/// At most one running client per server; replaced on reopen.
pub(crate) struct ClientSession {
    server: String,
    client: AsyncMutex<Option<McpClient>>,
}

impl ClientSession {
    pub(crate) fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            client: AsyncMutex::new(None),
        }
    }

    pub(crate) fn server(&self) -> &str {
        &self.server
    }

    pub(crate) async fn is_open(&self) -> bool {
        self.client
            .lock()
            .await
            .as_ref()
            .is_some_and(|client| !client.is_closed())
    }

    pub(crate) async fn attach(&self, client: McpClient) {
        if let Some(info) = client.peer_info() {
            debug!(
                server = %self.server,
                remote_name = info.server_info.name.as_str(),
                remote_version = info.server_info.version.as_str(),
                protocol = %info.protocol_version,
                "MCP initialize handshake completed"
            );
        }
        let previous = self.client.lock().await.replace(client);
        if let Some(previous) = previous {
            if let Err(err) = previous.cancel().await {
                warn!(server = %self.server, %err, "Stale MCP session did not shut down cleanly");
            }
        }
    }

    pub(crate) async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        let peer = self.peer().await?;
        let tools = peer
            .list_all_tools()
            .await
            .map_err(|err| self.service_error(err))?;
        Ok(tools.into_iter().map(ToolDescriptor::from).collect())
    }

    pub(crate) async fn call_tool(
        &self,
        tool: &str,
        arguments: Value,
    ) -> Result<CallOutput, ToolInvokeError> {
        let peer = self.peer().await?;
        let params = CallToolRequestParams {
            meta: None,
            name: tool.to_string().into(),
            arguments: Some(call_arguments(arguments)),
            task: None,
        };
        let result = peer
            .call_tool(params)
            .await
            .map_err(|err| self.service_error(err))?;
        Ok(CallOutput::from(result))
    }

    /// Cancel the running client, if any. Closing twice is a no-op.
    pub(crate) async fn close(&self) -> Result<(), ToolInvokeError> {
        let Some(client) = self.client.lock().await.take() else {
            return Ok(());
        };
        let reason = client
            .cancel()
            .await
            .map_err(|source| ToolInvokeError::Shutdown {
                server: self.server.clone(),
                source,
            })?;
        debug!(server = %self.server, ?reason, "MCP session closed");
        Ok(())
    }

    async fn peer(&self) -> Result<Peer<RoleClient>, ToolInvokeError> {
        match self.client.lock().await.as_ref() {
            Some(client) if !client.is_closed() => Ok(client.peer().clone()),
            _ => Err(ToolInvokeError::Terminated {
                server: self.server.clone(),
            }),
        }
    }

    fn service_error(&self, err: ServiceError) -> ToolInvokeError {
        match err {
            ServiceError::McpError(data) => ToolInvokeError::Rpc {
                server: self.server.clone(),
                code: i64::from(data.code.0),
                message: data.message.into_owned(),
            },
            source => ToolInvokeError::Session {
                server: self.server.clone(),
                source,
            },
        }
    }
}
