use async_trait::async_trait;
use rmcp::model::{CallToolResult, JsonObject, Tool};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::ToolInvokeError;

/// A tool advertised by one server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default = "empty_object_schema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema: empty_object_schema(),
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

impl From<Tool> for ToolDescriptor {
    fn from(tool: Tool) -> Self {
        let input_schema = if tool.input_schema.is_empty() {
            empty_object_schema()
        } else {
            Value::Object(tool.input_schema.as_ref().clone())
        };
        Self {
            name: tool.name.into_owned(),
            description: tool.description.map(|text| text.into_owned()),
            input_schema,
        }
    }
}

fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// A `tools/call` result: the content blocks as JSON plus the error flag.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutput {
    pub content: Value,
    pub is_error: bool,
}

impl From<CallToolResult> for CallOutput {
    fn from(result: CallToolResult) -> Self {
        let content = serde_json::to_value(&result.content).unwrap_or(Value::Null);
        Self {
            content,
            is_error: result.is_error.unwrap_or(false),
        }
    }
}

/// Wire-level access to one MCP tool server.
///
/// `open` performs the initialize handshake; `list_tools` and `call_tool`
/// require a prior successful `open`.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn open(&self) -> Result<(), ToolInvokeError>;

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError>;

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<CallOutput, ToolInvokeError>;

    async fn close(&self) -> Result<(), ToolInvokeError>;
}

/// `tools/call` arguments; `null` is sent as an empty object.
pub(crate) fn call_arguments(arguments: Value) -> JsonObject {
    match arguments {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}
