mod action;
mod app;
mod app_state;
mod component;
mod components;
mod download_manager;
mod launcher;
mod theme;
mod widgets;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use songbook_core::catalog::Location;
use songbook_core::config::Config;
use songbook_core::feed::{self, DriveClient};
use songbook_core::platform;

#[derive(Parser, Debug)]
#[command(name = "songbook", version, about = "Browse sheet-music PDFs from the terminal")]
struct Cli {
    /// Catalog configuration, as a URL or a local path.
    /// Overrides `catalog.config_url` from config.toml.
    #[arg(short, long)]
    config: Option<String>,

    /// Songs per page.
    #[arg(short, long)]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate every drive's song list from its Google Drive folder.
    Build {
        /// Catalog configuration file to read drives from; feeds are written
        /// next to it.
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Some(Command::Build { config }) => build(config).await,
        None => browse(cli.config, cli.page_size).await,
    }
}

async fn browse(config_location: Option<String>, page_size: Option<usize>) -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = platform::log_path();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("songbook log: {}", log_path.display());
    tracing::info!("songbook starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                "could not read {}: {:#}; using defaults",
                Config::config_path().display(),
                e
            );
            Config::default()
        }
    };

    let location = Location::parse(
        config_location
            .as_deref()
            .unwrap_or(&config.catalog.config_url),
    );
    let page_size = page_size.map(|n| n.max(1)).unwrap_or_else(|| config.page_size());
    tracing::info!("catalog configuration: {} ({} per page)", location, page_size);

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(config, location, page_size, platform::ui_state_path());
    app.run().await?;

    Ok(())
}

async fn build(config_path: PathBuf) -> anyhow::Result<()> {
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter.as_str())
        .init();

    let api_key = match std::env::var(feed::API_KEY_VAR) {
        Ok(key) if !key.is_empty() => key,
        _ => anyhow::bail!("{} is not set", feed::API_KEY_VAR),
    };

    let report = feed::build_all(&config_path, &DriveClient::new(api_key), |k| {
        std::env::var(k).ok()
    })
    .await?;

    for path in &report.written {
        tracing::info!("wrote {}", path.display());
    }
    if !report.skipped.is_empty() {
        tracing::warn!("skipped (no folder configured): {}", report.skipped.join(", "));
    }
    if !report.failed.is_empty() {
        anyhow::bail!("failed to build: {}", report.failed.join(", "));
    }
    Ok(())
}
