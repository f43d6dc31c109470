//! TaskPlanner CLI entry point

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use taskplanner::api::{ApiServer, ApiServerConfig};
use taskplanner::cli::{Cli, Command, OutputFormat};
use taskplanner::config::Config;
use taskplanner::llm::create_client;
use taskplanner::pipeline::{FormattedOutput, Pipeline, PlanState};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskplanner")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("taskplanner.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log level is needed before the full config load can report anything
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "TaskPlanner loaded config");

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let pipeline = Arc::new(Pipeline::from_config(&config, llm));

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan { statement, format } => cmd_plan(&pipeline, &statement, format).await,
        Command::Serve { host, port } => cmd_serve(&config, pipeline, host, port).await,
    }
}

/// Generate one plan and print the requested view
async fn cmd_plan(pipeline: &Pipeline, statement: &str, format: OutputFormat) -> Result<()> {
    debug!(%statement, ?format, "cmd_plan: called");
    let state = pipeline.run(statement).await;

    for error in &state.errors {
        eprintln!("{}", error);
    }
    for warning in &state.warnings {
        eprintln!("warning: {}", warning);
    }

    println!("{}", select_view(&state, format)?);
    Ok(())
}

fn select_view(state: &PlanState, format: OutputFormat) -> Result<String> {
    let plan = match (&state.formatted_output, format) {
        (_, OutputFormat::Json) => return serde_json::to_string_pretty(state).context("Failed to serialize plan"),
        (Some(FormattedOutput::Rendered(plan)), _) => plan,
        (Some(FormattedOutput::Failed { error }), _) => return Err(eyre::eyre!("{}", error)),
        (None, _) => return Err(eyre::eyre!("Pipeline produced no output")),
    };

    match format {
        OutputFormat::Gantt => Ok(plan.mermaid_gantt.clone()),
        OutputFormat::Summary => serde_json::to_string_pretty(&plan.summary).context("Failed to serialize summary"),
        OutputFormat::Markdown | OutputFormat::Json => Ok(plan.markdown.clone()),
    }
}

/// Run the HTTP server
async fn cmd_serve(config: &Config, pipeline: Arc<Pipeline>, host: Option<String>, port: Option<u16>) -> Result<()> {
    debug!(?host, ?port, "cmd_serve: called");
    let mut server_config = ApiServerConfig::from(config.server.clone());
    if let Some(host) = host {
        server_config.host = host;
    }
    if let Some(port) = port {
        server_config.port = port;
    }

    println!("Serving on http://{}:{}", server_config.host, server_config.port);
    ApiServer::new(server_config, pipeline).start().await
}
