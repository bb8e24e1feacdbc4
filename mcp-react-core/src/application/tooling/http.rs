//! Remote tool servers over MCP streamable HTTP.

use super::error::ToolInvokeError;
use super::interface::{CallOutput, ToolDescriptor, ToolTransport};
use super::session::{ClientSession, client_info};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rmcp::ServiceExt;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

pub struct HttpTransport {
    url: String,
    client: Client,
    session: ClientSession,
}

impl HttpTransport {
    /// Build a transport whose every request carries `headers`.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, ToolInvokeError> {
        let name = name.into();
        let mut default_headers = HeaderMap::new();
        for (key, value) in headers {
            let header_name =
                HeaderName::from_bytes(key.as_bytes()).map_err(|err| ToolInvokeError::Transport {
                    server: name.clone(),
                    message: format!("invalid header name '{key}': {err}"),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|err| ToolInvokeError::Transport {
                    server: name.clone(),
                    message: format!("invalid value for header '{key}': {err}"),
                })?;
            default_headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(|source| ToolInvokeError::Http {
                server: name.clone(),
                source,
            })?;

        Ok(Self {
            url: url.into(),
            client,
            session: ClientSession::new(name),
        })
    }
}

#[async_trait]
impl ToolTransport for HttpTransport {
    async fn open(&self) -> Result<(), ToolInvokeError> {
        if self.session.is_open().await {
            return Ok(());
        }

        let transport = StreamableHttpClientTransport::with_client(
            self.client.clone(),
            StreamableHttpClientTransportConfig::with_uri(self.url.as_str()),
        );
        let client = client_info()
            .serve(transport)
            .await
            .map_err(|source| ToolInvokeError::Handshake {
                server: self.session.server().to_string(),
                source,
            })?;
        info!(server = self.session.server(), url = self.url.as_str(), "Connected to streamable HTTP MCP server");
        self.session.attach(client).await;
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        self.session.list_tools().await
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<CallOutput, ToolInvokeError> {
        self.session.call_tool(tool, arguments).await
    }

    async fn close(&self) -> Result<(), ToolInvokeError> {
        self.session.close().await
    }
}
