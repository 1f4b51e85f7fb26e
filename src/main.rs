use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

mod chat;
mod settings;
mod trivia;
mod ui;

use settings::models::SettingsModel;
use settings::repositories::{JsonSettingsRepository, SettingsRepository};

#[derive(Parser)]
#[command(name = "gemterm", version, about = "Terminal Gemini chat with a trivia sidebar")]
struct Cli {
    /// Override the configured model id for this run
    #[arg(long)]
    model: Option<String>,

    /// Alternate settings file (defaults to <config_dir>/gemterm/settings.json)
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Log file (defaults to <data_dir>/gemterm/gemterm.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("gemterm").join("gemterm.log"))
        .unwrap_or_else(|| PathBuf::from("gemterm.log"))
}

/// Structured logging goes to a file; ratatui owns the terminal.
fn init_tracing(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let repository: Arc<dyn SettingsRepository> = match &cli.config_file {
        Some(path) => Arc::new(JsonSettingsRepository::with_path(path.clone())),
        None => Arc::new(JsonSettingsRepository::new().context("failed to locate settings")?),
    };

    let mut settings = match repository.load().await {
        Ok(settings) => settings,
        Err(error) => {
            warn!(error = %error, "failed to load settings, using defaults");
            SettingsModel::default()
        }
    };
    if let Some(model) = cli.model {
        settings.model = model;
    }
    info!(path = %repository.storage_path(), model = %settings.model, "settings loaded");

    let terminal = ratatui::init();
    let result = ui::event_loop::run(terminal, settings, Arc::clone(&repository)).await;
    ratatui::restore();
    result
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    if let Err(error) = init_tracing(&log_path) {
        eprintln!("gemterm: logging disabled: {error:#}");
    }
    info!("starting gemterm");

    let runtime = tokio::runtime::Runtime::new().context("failed to create Tokio runtime")?;
    runtime.block_on(run(cli))
}
