//! Local tool servers: child processes speaking MCP over stdio.

use super::error::ToolInvokeError;
use super::interface::{CallOutput, ToolDescriptor, ToolTransport};
use super::session::{ClientSession, client_info};
use crate::config::server::{ServerAddress, ServerDescriptor, script_interpreter};
use async_trait::async_trait;
use rmcp::ServiceExt;
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// How to launch a local tool server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub name: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

impl LaunchSpec {
    /// Launch spec for a process or script descriptor; `None` for remote ones.
    pub fn from_descriptor(descriptor: &ServerDescriptor) -> Option<Self> {
        let name = descriptor.display_name();
        match &descriptor.address {
            ServerAddress::Process {
                command,
                args,
                env,
                workdir,
            } => Some(Self {
                name,
                program: command.clone(),
                args: args.clone(),
                env: env.clone(),
                workdir: workdir.clone(),
            }),
            ServerAddress::Script {
                path,
                args,
                env,
                workdir,
            } => {
                let (program, mut full_args) = match script_interpreter(path) {
                    Some(interpreter) => (
                        PathBuf::from(interpreter),
                        vec![path.display().to_string()],
                    ),
                    None => (path.clone(), Vec::new()),
                };
                full_args.extend(args.iter().cloned());
                Some(Self {
                    name,
                    program,
                    args: full_args,
                    env: env.clone(),
                    workdir: workdir.clone(),
                })
            }
            ServerAddress::Remote { .. } => None,
        }
    }
}

pub struct StdioTransport {
    spec: LaunchSpec,
    session: ClientSession,
}

impl StdioTransport {
    pub fn new(spec: LaunchSpec) -> Self {
        Self {
            session: ClientSession::new(spec.name.clone()),
            spec,
        }
    }

    fn command(&self) -> Command {
        Command::new(&self.spec.program).configure(|cmd| {
            cmd.args(&self.spec.args)
                .envs(&self.spec.env)
                .kill_on_drop(true);
            if let Some(dir) = &self.spec.workdir {
                cmd.current_dir(dir);
            }
        })
    }
}

#[async_trait]
impl ToolTransport for StdioTransport {
    async fn open(&self) -> Result<(), ToolInvokeError> {
        if self.session.is_open().await {
            return Ok(());
        }

        let (process, _stderr) = TokioChildProcess::builder(self.command())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ToolInvokeError::Spawn {
                server: self.spec.name.clone(),
                source,
            })?;
        let client = client_info()
            .serve(process)
            .await
            .map_err(|source| ToolInvokeError::Handshake {
                server: self.spec.name.clone(),
                source,
            })?;
        info!(
            server = %self.spec.name,
            program = %self.spec.program.display(),
            "Spawned stdio MCP server"
        );
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_launch_uses_interpreter() {
        let descriptor = ServerDescriptor::script("/srv/tools/server.js");
        let spec = LaunchSpec::from_descriptor(&descriptor).expect("local descriptor");
        assert_eq!(spec.program, PathBuf::from("node"));
        assert_eq!(spec.args, vec!["/srv/tools/server.js".to_string()]);
    }

    #[test]
    fn remote_descriptor_has_no_launch_spec() {
        assert!(LaunchSpec::from_descriptor(&ServerDescriptor::remote("http://x")).is_none());
    }

    #[tokio::test]
    async fn spawning_missing_binary_fails() {
        let transport = StdioTransport::new(LaunchSpec {
            name: "ghost".into(),
            program: PathBuf::from("/definitely/not/a/real/mcp-server-binary"),
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
        });
        let err = transport.open().await.expect_err("spawn must fail");
        assert!(matches!(err, ToolInvokeError::Spawn { .. }));
    }
}
