//! MCP tool servers: transports, per-server connections and the registry.

pub mod connection;
pub mod error;
pub mod http;
pub mod interface;
pub mod process;
pub mod registry;
mod session;

pub use connection::{ConnectionState, ToolServerConnection};
pub use error::{ToolError, ToolInvokeError};
pub use http::HttpTransport;
pub use interface::{CallOutput, ToolDescriptor, ToolTransport};
pub use process::{LaunchSpec, StdioTransport};
pub use registry::ToolRegistry;
