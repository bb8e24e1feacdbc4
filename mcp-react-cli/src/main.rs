mod cli;

use clap::Parser;
use cli::Cli;
use mcp_react_core::config::{AppConfig, ConfigError};
use mcp_react_core::constants::CONFIG_PATH;
use mcp_react_core::{AgentProvider, CallContext};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read prompt from {path:?}: {source}")]
    PromptFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read prompt from stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("prompt required via arguments, --prompt-file, or stdin")]
    MissingPrompt,
    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
    #[error("{0}")]
    Agent(String),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();
    let cli = Cli::parse();
    debug!(
        config = ?cli.config,
        model = ?cli.model,
        max_iterations = ?cli.max_iterations,
        vars = cli.vars.len(),
        "CLI arguments parsed"
    );

    let file_config = load_config(cli.config.as_deref())?;
    let mut options = file_config.to_options();
    if let Some(model) = &cli.model {
        options.config.model = Some(model.clone());
    }
    if let Some(system) = &cli.system {
        options.config.system_prompt = Some(system.clone());
    }
    if let Some(max_iterations) = cli.max_iterations {
        options.config.max_iterations = Some(max_iterations);
    }

    let prompt = load_prompt(&cli)?;
    let context = cli
        .vars
        .iter()
        .fold(CallContext::default(), |context, (key, value)| {
            context.with_var(key.clone(), value.clone())
        });

    let mut provider = AgentProvider::new(options);
    info!(
        provider = provider.id(),
        model = provider.model(),
        "Running task"
    );
    let response = provider.call_api(prompt, &context).await;
    provider.cleanup().await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    match response.error {
        Some(message) => Err(CliError::Agent(message)),
        None => Ok(()),
    }
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(io::stderr)
            .init();
    });
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    match AppConfig::load(path) {
        Ok(config) => {
            info!(
                path = %path.unwrap_or(Path::new(CONFIG_PATH)).display(),
                servers = config.servers.len(),
                "Loaded configuration"
            );
            Ok(config)
        }
        Err(ConfigError::NotFound { .. }) if path.is_none() => {
            info!("No configuration file found; using defaults and environment");
            Ok(AppConfig::default())
        }
        Err(err) => Err(err.into()),
    }
}

fn load_prompt(cli: &Cli) -> Result<String, CliError> {
    if let Some(path) = &cli.prompt_file {
        info!(path = %path.display(), "Loading prompt from file");
        let content = fs::read_to_string(path).map_err(|source| CliError::PromptFile {
            path: path.clone(),
            source,
        })?;
        return Ok(normalize_prompt(content));
    }

    if !cli.prompt.is_empty() {
        debug!("Using prompt provided through CLI arguments");
        return Ok(normalize_prompt(cli.prompt.join(" ")));
    }

    if !io::stdin().is_terminal() {
        info!("Reading prompt from standard input");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(CliError::Stdin)?;
        let prompt = normalize_prompt(buffer);
        if !prompt.is_empty() {
            return Ok(prompt);
        }
    }

    warn!("Prompt not provided via arguments, file, or stdin");
    Err(CliError::MissingPrompt)
}

fn normalize_prompt(prompt: String) -> String {
    prompt.trim().to_string()
}
