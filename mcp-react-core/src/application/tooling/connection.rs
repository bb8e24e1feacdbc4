use super::error::{ToolError, ToolInvokeError};
use super::http::HttpTransport;
use super::interface::{ToolDescriptor, ToolTransport};
use super::process::{LaunchSpec, StdioTransport};
use crate::config::server::{ServerAddress, ServerDescriptor};
use crate::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Failed,
}

/// Lifecycle of one connection to one tool server.
pub struct ToolServerConnection {
    descriptor: ServerDescriptor,
    name: String,
    transport: Result<Box<dyn ToolTransport>, String>,
    state: ConnectionState,
    tools: Vec<ToolDescriptor>,
}

impl ToolServerConnection {
    /// Connection using the transport implied by the descriptor's address.
    pub fn new(descriptor: ServerDescriptor) -> Self {
        Self::with_timeout(descriptor, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(descriptor: ServerDescriptor, timeout: Duration) -> Self {
        let name = descriptor.display_name();
        let transport: Result<Box<dyn ToolTransport>, String> = match &descriptor.address {
            ServerAddress::Remote { url } => {
                HttpTransport::new(name.clone(), url.clone(), &descriptor.auth_headers(), timeout)
                    .map(|transport| Box::new(transport) as Box<dyn ToolTransport>)
                    .map_err(|err| err.to_string())
            }
            ServerAddress::Process { .. } | ServerAddress::Script { .. } => {
                match LaunchSpec::from_descriptor(&descriptor) {
                    Some(spec) => Ok(Box::new(StdioTransport::new(spec))),
                    None => Err(format!("'{name}' has no local launch command")),
                }
            }
        };
        Self {
            descriptor,
            name,
            transport,
            state: ConnectionState::Disconnected,
            tools: Vec::new(),
        }
    }

    /// Connection over an explicitly supplied transport.
    pub fn with_transport(descriptor: ServerDescriptor, transport: Box<dyn ToolTransport>) -> Self {
        Self {
            name: descriptor.display_name(),
            descriptor,
            transport: Ok(transport),
            state: ConnectionState::Disconnected,
            tools: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &ServerDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Open the transport and cache the server's tool listing.
    pub async fn connect(&mut self) -> Result<(), ToolError> {
        match self.try_connect().await {
            Ok(tools) => {
                info!(server = %self.name, tools = tools.len(), "Connected to MCP server");
                self.tools = tools;
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(source) => {
                self.tools.clear();
                self.state = ConnectionState::Failed;
                Err(ToolError::ConnectionFailure {
                    server: self.name.clone(),
                    source,
                })
            }
        }
    }

    async fn try_connect(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        let transport = self.transport()?;
        transport.open().await?;
        match transport.list_tools().await {
            Ok(tools) => Ok(tools),
            Err(err) => {
                if let Err(close_err) = transport.close().await {
                    warn!(server = %self.name, err = %close_err, "Failed to close MCP server connection");
                }
                Err(err)
            }
        }
    }

    /// Restartable iterator over the cached tools, in server listing order.
    pub fn list_tools(&self) -> Result<std::slice::Iter<'_, ToolDescriptor>, ToolError> {
        self.ensure_connected()?;
        Ok(self.tools.iter())
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.is_connected() && self.tools.iter().any(|t| t.name == tool)
    }

    /// Invoke `tool`; on success returns the server's `content` value unmodified.
    pub async fn call(&mut self, tool: &str, arguments: Value) -> Result<Value, ToolError> {
        self.ensure_connected()?;
        if !self.tools.iter().any(|t| t.name == tool) {
            return Err(ToolError::UnknownTool(tool.to_string()));
        }
        if !(arguments.is_object() || arguments.is_null()) {
            return Err(ToolError::InvalidArguments {
                tool: tool.to_string(),
            });
        }

        debug!(server = %self.name, tool, "Calling MCP tool");
        let result = match self.transport() {
            Ok(transport) => transport.call_tool(tool, arguments).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(output) if output.is_error => Err(ToolError::RemoteExecution {
                server: self.name.clone(),
                tool: tool.to_string(),
                payload: output.content,
            }),
            Ok(output) => Ok(output.content),
            Err(ToolInvokeError::Rpc { code, message, .. }) => Err(ToolError::RemoteExecution {
                server: self.name.clone(),
                tool: tool.to_string(),
                payload: serde_json::json!({ "code": code, "message": message }),
            }),
            Err(source) => {
                warn!(server = %self.name, tool, %source, "MCP server transport failed during call");
                self.state = ConnectionState::Failed;
                self.tools.clear();
                Err(ToolError::Transport {
                    server: self.name.clone(),
                    tool: tool.to_string(),
                    source,
                })
            }
        }
    }

    /// Close the transport and forget cached tools. Never fails.
    pub async fn disconnect(&mut self) {
        if let Ok(transport) = &self.transport {
            if let Err(err) = transport.close().await {
                warn!(server = %self.name, %err, "Failed to close MCP server connection");
            }
        }
        self.tools.clear();
        self.state = ConnectionState::Disconnected;
    }

    fn ensure_connected(&self) -> Result<(), ToolError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ToolError::NotConnected {
                server: self.name.clone(),
            })
        }
    }

    fn transport(&self) -> Result<&dyn ToolTransport, ToolInvokeError> {
        self.transport
            .as_ref()
            .map(|transport| &**transport)
            .map_err(|message| ToolInvokeError::Transport {
                server: self.name.clone(),
                message: message.clone(),
            })
    }
}
