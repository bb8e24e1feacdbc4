use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "mcp-react",
    version,
    about = "Run a task through an OpenAI-compatible model with MCP tool servers"
)]
pub struct Cli {
    /// Path to the TOML configuration (defaults to config/agent.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub model: Option<String>,
    /// System prompt override
    #[arg(long)]
    pub system: Option<String>,
    #[arg(long)]
    pub max_iterations: Option<usize>,
    /// Template variable as key=value; repeatable
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,
    #[arg()]
    pub prompt: Vec<String>,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_vars_and_prompt_words() {
        let cli = Cli::parse_from([
            "mcp-react",
            "--var",
            "city=Paris",
            "--var",
            "query=a=b",
            "--max-iterations",
            "4",
            "weather",
            "in",
            "{{city}}",
        ]);
        assert_eq!(
            cli.vars,
            vec![
                ("city".to_string(), "Paris".to_string()),
                ("query".to_string(), "a=b".to_string())
            ]
        );
        assert_eq!(cli.max_iterations, Some(4));
        assert_eq!(cli.prompt.join(" "), "weather in {{city}}");
    }

    #[test]
    fn rejects_var_without_key() {
        assert!(parse_var("=value").is_err());
        assert!(parse_var("novalue").is_err());
    }
}
