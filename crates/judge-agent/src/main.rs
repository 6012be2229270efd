//! Judge Agent process
//!
//! Reads training judgment requests and prints deploy/retry/abort decisions
//! for the pipeline orchestrator.
//!
//! # Usage
//!
//! ```bash
//! # One request from a file (or stdin when --input is omitted)
//! judge-agent judge --input request.json
//!
//! # Newline-delimited requests on stdin, one response per line on stdout
//! judge-agent serve
//!
//! # Custom default thresholds
//! DEFAULT_THRESHOLDS='{"classification":{"min_accuracy":0.9}}' judge-agent serve
//! judge-agent --thresholds thresholds.toml thresholds
//! ```

mod serve;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use judgment::{JudgeAgent, JudgeConfig, JudgmentRequest};
use std::io::Read;
use std::path::PathBuf;
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Default-threshold override file, JSON or TOML (overrides JUDGE_THRESHOLDS_PATH)
    #[arg(long, global = true)]
    thresholds: Option<PathBuf>,

    /// Only host accepted in issue URLs (overrides JUDGE_ISSUE_TRACKER_HOST)
    #[arg(long, global = true)]
    issue_host: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Judge a single request and print the response
    Judge {
        /// Request JSON file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Judge newline-delimited requests from stdin until EOF
    Serve,
    /// Print the JSON Schema of a judgment request
    Schema,
    /// Print the effective default thresholds
    Thresholds,
}

impl Args {
    fn config(&self) -> JudgeConfig {
        let mut config = JudgeConfig::from_env();
        if let Some(path) = &self.thresholds {
            config.thresholds_path = Some(path.clone());
        }
        if let Some(host) = &self.issue_host {
            config.issue_tracker_host = host.clone();
        }
        config
    }
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = args.config();
    let agent = JudgeAgent::from_config(&config).context("Failed to build judge agent")?;
    info!(
        issue_host = %config.issue_tracker_host,
        default_max_retries = config.default_max_retries,
        "Judge agent ready"
    );

    match args.command {
        Command::Judge { input } => {
            let raw = read_input(input.as_ref())?;
            let response = agent.handle_str(&raw);
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.is_success() {
                std::process::exit(1);
            }
        }
        Command::Serve => {
            serve::serve(&agent, BufReader::new(stdin()), stdout()).await?;
        }
        Command::Thresholds => {
            println!("{}", serde_json::to_string_pretty(agent.thresholds())?);
        }
        Command::Schema => {
            let schema = schemars::schema_for!(JudgmentRequest);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_env_config() {
        let args = Args::try_parse_from([
            "judge-agent",
            "--thresholds",
            "/tmp/t.toml",
            "--issue-host",
            "git.example.org",
            "thresholds",
        ])
        .unwrap();
        let config = args.config();
        assert_eq!(config.thresholds_path, Some(PathBuf::from("/tmp/t.toml")));
        assert_eq!(config.issue_tracker_host, "git.example.org");
        assert!(matches!(args.command, Command::Thresholds));
    }

    #[test]
    fn test_judge_subcommand_input() {
        let args = Args::try_parse_from(["judge-agent", "judge", "--input", "req.json"]).unwrap();
        match args.command {
            Command::Judge { input } => assert_eq!(input, Some(PathBuf::from("req.json"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
