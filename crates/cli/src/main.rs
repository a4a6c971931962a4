//! Assist CLI - chat, receipts and admin back-office from the terminal

mod commands;
mod config;
mod logging;

use anyhow::{Context, Result};
use assist_http::client::session::FileSessionStore;
use assist_http::AssistClient;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(name = "assist")]
#[command(about = "Command-line client for the Assist corporate assistant")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for config, session and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// API base URL (overrides config and ASSIST_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "60")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(config::default_data_dir);

    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;

    let mut settings = config::CliConfig::load(&data_dir)?;
    if let Some(base_url) = cli.base_url {
        settings.api.base_url = base_url;
    }

    let session_path = settings.session_path(&data_dir);
    let store = FileSessionStore::open(&session_path)
        .with_context(|| format!("Failed to open session at {}", session_path.display()))?;

    let client = AssistClient::builder()
        .config(settings.api.clone())
        .session_store(Arc::new(store))
        .on_session_expired(|route: &str| {
            info!(route, "Session expired");
            eprintln!("Your session has expired. Run `assist login` to sign in again.");
        })
        .build()?;

    info!(base_url = client.base_url(), "Starting Assist CLI");

    let outcome = if cli.timeout == 0 {
        cli.command.execute(&client).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(&client)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(anyhow::anyhow!(
                "Command timed out after {} seconds",
                cli.timeout
            )),
        }
    };

    if let Err(e) = outcome {
        error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
