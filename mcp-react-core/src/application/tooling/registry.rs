use super::connection::ToolServerConnection;
use super::error::ToolError;
use super::interface::ToolDescriptor;
use crate::config::server::ServerDescriptor;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Aggregates tool server connections and routes calls by tool name.
///
/// Connections keep their registration order. When two servers advertise the
/// same tool name, the earliest connected one wins.
#[derive(Default)]
pub struct ToolRegistry {
    connections: Vec<ToolServerConnection>,
    index: HashMap<String, Vec<usize>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to every descriptor in order. Failures are logged and kept.
    pub async fn populate(&mut self, descriptors: &[ServerDescriptor], timeout: Duration) {
        let connections = descriptors
            .iter()
            .cloned()
            .map(|descriptor| ToolServerConnection::with_timeout(descriptor, timeout))
            .collect();
        self.populate_connections(connections).await;
    }

    pub async fn populate_connections(&mut self, connections: Vec<ToolServerConnection>) {
        for mut connection in connections {
            if let Err(err) = connection.connect().await {
                warn!(server = %connection.name(), %err, "Skipping MCP server that failed to connect");
            }
            self.connections.push(connection);
        }
        self.rebuild_index();
        info!(
            servers = self.connections.len(),
            connected = self.connected_count(),
            tools = self.index.len(),
            "Tool registry populated"
        );
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (position, connection) in self.connections.iter().enumerate() {
            let Ok(tools) = connection.list_tools() else {
                continue;
            };
            for tool in tools {
                let owners = self.index.entry(tool.name.clone()).or_default();
                if !owners.contains(&position) {
                    owners.push(position);
                }
            }
        }
    }

    /// Tools of connected servers; shadowed duplicates are omitted.
    pub fn available_tools(&self) -> Vec<ToolDescriptor> {
        let mut seen = HashSet::new();
        self.connections
            .iter()
            .filter_map(|connection| connection.list_tools().ok())
            .flatten()
            .filter(|tool| seen.insert(tool.name.clone()))
            .cloned()
            .collect()
    }

    /// Route a call to the first connected owner of `tool`.
    pub async fn invoke(&mut self, tool: &str, arguments: Value) -> Result<Value, ToolError> {
        let owner = self
            .index
            .get(tool)
            .and_then(|owners| {
                owners
                    .iter()
                    .copied()
                    .find(|&position| self.connections[position].has_tool(tool))
            })
            .ok_or_else(|| ToolError::UnknownTool(tool.to_string()))?;

        let connection = &mut self.connections[owner];
        debug!(server = %connection.name(), tool, "Dispatching tool call");
        connection.call(tool, arguments).await
    }

    pub fn connected_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_connected()).count()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn connections(&self) -> &[ToolServerConnection] {
        &self.connections
    }

    /// Disconnect every server independently, then empty the registry.
    pub async fn teardown_all(&mut self) {
        for connection in &mut self.connections {
            connection.disconnect().await;
        }
        self.connections.clear();
        self.index.clear();
    }
}
