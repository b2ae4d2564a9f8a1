use clap::{ArgGroup, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

mod commands;
mod error;

use aethero::{Payload, RuntimeConfig, RuntimeConfigBuilder, SysinfoHostMetrics, init_tracing};
use commands::monitor::run_monitor;
use commands::parse::run_parse;
use commands::run::{AgentKind, run_task, task_from_json};
use error::{CliError, read_file};

#[derive(Parser, Debug)]
#[command(name = "aethero", version)]
#[command(about = "Aethero CLI - run agents, parse annotations and monitor the host")]
struct Cli {
    /// TOML configuration file; AETHERO_* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract annotation tags from text and print them as JSON
    #[command(group(ArgGroup::new("source").required(true).args(["text", "file"])))]
    Parse {
        /// Text to parse
        #[arg(long)]
        text: Option<String>,
        /// File whose contents are parsed
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Sample host metrics and report alerts
    Monitor {
        /// Number of samples to take
        #[arg(long, default_value_t = 1)]
        samples: usize,
        /// Time between samples (e.g. "5s"); defaults to the configured interval
        #[arg(long, value_parser = humantime::parse_duration)]
        interval: Option<Duration>,
    },
    /// Execute one task through a built-in agent and print what it published
    #[command(group(ArgGroup::new("task_source").required(true).args(["input", "task"])))]
    Run {
        /// JSON file holding the task
        #[arg(long)]
        input: Option<PathBuf>,
        /// Task as inline JSON
        #[arg(long)]
        task: Option<String>,
        /// Annotations passed alongside the task, as inline JSON
        #[arg(long)]
        annotations: Option<String>,
        /// Agent to run the task with
        #[arg(long, value_enum, default_value_t = AgentKind::Introspection)]
        agent: AgentKind,
    },
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig, CliError> {
    let builder = match path {
        Some(path) => RuntimeConfigBuilder::from_toml_file(path)?,
        None => RuntimeConfigBuilder::new(),
    };
    Ok(builder.with_env_overrides()?.build()?)
}

async fn execute(command: Commands, config: RuntimeConfig) -> Result<serde_json::Value, CliError> {
    match command {
        Commands::Parse { text, file } => run_parse(text, file.as_deref()),
        Commands::Monitor { samples, interval } => {
            let interval = interval.unwrap_or(config.monitor.interval);
            run_monitor(
                Arc::new(SysinfoHostMetrics::new()),
                config.monitor.clone(),
                samples,
                interval,
            )
            .await
        }
        Commands::Run {
            input,
            task,
            annotations,
            agent,
        } => {
            let task = match (task, input) {
                (Some(task), _) => task_from_json(&task)?,
                (None, Some(path)) => task_from_json(&read_file(&path)?)?,
                (None, None) => return Err(CliError::InvalidTask("either --input or --task is required".into())),
            };
            let annotations = match annotations {
                Some(source) => task_from_json(&source)?,
                None => Payload::new(),
            };
            run_task(&config, agent, task, annotations).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(e.exit_code());
        }
    };

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Warning: {e}");
    }

    match execute(cli.command, config).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to render output");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_requires_a_source() {
        assert!(Cli::try_parse_from(["aethero", "parse"]).is_err());
        assert!(Cli::try_parse_from(["aethero", "parse", "--text", "a", "--file", "b"]).is_err());

        let cli = Cli::try_parse_from(["aethero", "--config", "a.toml", "parse", "--text", "{x: 1}"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("a.toml")));
    }

    #[test]
    fn test_monitor_interval_uses_humantime() {
        let cli = Cli::try_parse_from(["aethero", "monitor", "--samples", "3", "--interval", "250ms"]).unwrap();
        match cli.command {
            Commands::Monitor { samples, interval } => {
                assert_eq!(samples, 3);
                assert_eq!(interval, Some(Duration::from_millis(250)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_agent_selection() {
        let cli = Cli::try_parse_from(["aethero", "run", "--task", "{}", "--agent", "annotation"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { agent: AgentKind::Annotation, .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pipeline_id = \"cli-pipeline\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.pipeline_id.as_str(), "cli-pipeline");
    }
}
