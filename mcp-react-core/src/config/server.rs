use super::error::ConfigError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

/// Static description of one MCP tool server.
///
/// Deserializes from the flat harness shape (`command`/`args`, `url`, or
/// `path`, plus optional `name`, `env`, `workdir` and `auth`). Exactly one of
/// the three address fields must be present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawServerDescriptor")]
pub struct ServerDescriptor {
    pub name: Option<String>,
    pub address: ServerAddress,
    pub auth: Option<AuthConfig>,
}

/// Where a tool server lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAddress {
    /// A local executable spawned with piped stdio.
    Process {
        command: PathBuf,
        args: Vec<String>,
        env: HashMap<String, String>,
        workdir: Option<PathBuf>,
    },
    /// A network endpoint speaking JSON-RPC over HTTP.
    Remote { url: String },
    /// A local script launched through an interpreter picked by extension.
    Script {
        path: PathBuf,
        args: Vec<String>,
        env: HashMap<String, String>,
        workdir: Option<PathBuf>,
    },
}

/// Credentials injected as HTTP headers for remote servers.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    Bearer { token: String },
    ApiKey { api_key: String },
    Basic { username: String, password: String },
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::Bearer { .. } => f.write_str("AuthConfig::Bearer(<redacted>)"),
            AuthConfig::ApiKey { .. } => f.write_str("AuthConfig::ApiKey(<redacted>)"),
            AuthConfig::Basic { username, .. } => {
                write!(f, "AuthConfig::Basic({username}:<redacted>)")
            }
        }
    }
}

impl AuthConfig {
    /// Header mapping produced by this credential. Pure; no I/O.
    pub fn headers(&self) -> BTreeMap<String, String> {
        let (name, value) = match self {
            AuthConfig::Bearer { token } => ("Authorization", format!("Bearer {token}")),
            AuthConfig::ApiKey { api_key } => ("X-API-Key", api_key.clone()),
            AuthConfig::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{username}:{password}"));
                ("Authorization", format!("Basic {encoded}"))
            }
        };
        BTreeMap::from([(name.to_string(), value)])
    }

    fn expanded(self) -> Self {
        match self {
            AuthConfig::Bearer { token } => AuthConfig::Bearer {
                token: expand(&token),
            },
            AuthConfig::ApiKey { api_key } => AuthConfig::ApiKey {
                api_key: expand(&api_key),
            },
            AuthConfig::Basic { username, password } => AuthConfig::Basic {
                username: expand(&username),
                password: expand(&password),
            },
        }
    }
}

/// Headers for an optional credential; absent credentials yield an empty map.
pub fn auth_headers(auth: Option<&AuthConfig>) -> BTreeMap<String, String> {
    auth.map(AuthConfig::headers).unwrap_or_default()
}

impl ServerDescriptor {
    pub fn process<I, S>(command: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            address: ServerAddress::Process {
                command: command.into(),
                args: args.into_iter().map(Into::into).collect(),
                env: HashMap::new(),
                workdir: None,
            },
            auth: None,
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            name: None,
            address: ServerAddress::Remote { url: url.into() },
            auth: None,
        }
    }

    pub fn script(path: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            address: ServerAddress::Script {
                path: path.into(),
                args: Vec::new(),
                env: HashMap::new(),
                workdir: None,
            },
            auth: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self.address {
            ServerAddress::Process { env, .. } | ServerAddress::Script { env, .. } => {
                env.insert(key.into(), value.into());
            }
            ServerAddress::Remote { .. } => {}
        }
        self
    }

    /// Human-readable label: explicit name, else the address itself.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        match &self.address {
            ServerAddress::Remote { url } => url.clone(),
            ServerAddress::Script { path, .. } => path.display().to_string(),
            ServerAddress::Process { command, .. } => command.display().to_string(),
        }
    }

    pub fn auth_headers(&self) -> BTreeMap<String, String> {
        auth_headers(self.auth.as_ref())
    }
}

/// Interpreter used to launch a script, chosen by file extension.
pub fn script_interpreter(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "js" | "mjs" | "cjs" => Some("node"),
        "py" => Some("python3"),
        "sh" => Some("sh"),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct RawServerDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    workdir: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    auth: Option<AuthConfig>,
}

fn expand(s: &str) -> String {
    shellexpand::full(s)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

impl TryFrom<RawServerDescriptor> for ServerDescriptor {
    type Error = ConfigError;

    fn try_from(raw: RawServerDescriptor) -> Result<Self, Self::Error> {
        let present = [&raw.command, &raw.url, &raw.path]
            .iter()
            .filter(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
            .count();
        if present != 1 {
            return Err(ConfigError::InvalidServer {
                reason: format!(
                    "expected exactly one of 'command', 'url' or 'path' (found {present})"
                ),
            });
        }

        let args: Vec<String> = raw.args.iter().map(|arg| expand(arg)).collect();
        let workdir = raw.workdir.as_deref().map(|dir| PathBuf::from(expand(dir)));

        let address = if let Some(url) = raw.url.as_deref().filter(|v| !v.trim().is_empty()) {
            ServerAddress::Remote { url: expand(url) }
        } else if let Some(path) = raw.path.as_deref().filter(|v| !v.trim().is_empty()) {
            ServerAddress::Script {
                path: PathBuf::from(expand(path)),
                args,
                env: raw.env,
                workdir,
            }
        } else {
            let command = raw.command.as_deref().unwrap_or_default();
            ServerAddress::Process {
                command: PathBuf::from(expand(command)),
                args,
                env: raw.env,
                workdir,
            }
        };

        Ok(Self {
            name: raw.name,
            address,
            auth: raw.auth.map(AuthConfig::expanded),
        })
    }
}
