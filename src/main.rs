//! Painel CLI
//!
//! - `painel run`    - seed render, immediate cycle, periodic polling and
//!   the dashboard server
//! - `painel once`   - one cycle, then print or write the dashboard HTML
//! - `painel config` - print or write the default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use painel::{
    generate_default_config, AppState, Config, HttpSource, LoggingConfig, SeedData, Updater,
    UpdaterConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "painel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Economic indicator dashboard for a local series API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll continuously and serve the dashboard
    Run {
        /// Do not start the HTTP server
        #[arg(long)]
        no_server: bool,
    },

    /// Run a single update cycle
    Once {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_or_print(output.as_deref(), &generate_default_config());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    tracing::info!("Painel v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Series API: {}", config.poller.base_url);

    let updater = Arc::new(build_updater(&config)?);
    let seed = load_seed(&config);
    updater.render_seed(&seed).await;

    match cli.command {
        Commands::Run { no_server } => {
            let poller = Arc::clone(&updater).start();

            if config.server.enabled && !no_server {
                painel::serve(AppState::new(Arc::clone(&updater)), &config.server).await?;
            } else {
                painel::api::shutdown_signal().await;
            }

            updater.stop().await;
            poller.abort();
            tracing::info!("Painel stopped");
        }
        Commands::Once { output } => {
            let report = updater.update().await;
            tracing::info!(
                updated = ?report.updated,
                skipped = ?report.skipped,
                "Cycle complete"
            );
            write_or_print(output.as_deref(), &updater.html().await)?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn build_updater(config: &Config) -> anyhow::Result<Updater> {
    let source = HttpSource::new(config.poller.source_config())
        .context("Failed to create HTTP client")?;

    let updater_config = UpdaterConfig {
        interval: config.poller.interval(),
        live_row_cap: config.poller.live_row_cap,
        seed_row_cap: config.poller.seed_row_cap,
        html_path: config.output.html_path.clone(),
    };

    Ok(Updater::new(Arc::new(source), updater_config))
}

/// Seed data is optional; a broken seed file is logged and ignored
fn load_seed(config: &Config) -> SeedData {
    let Some(path) = &config.poller.seed_file else {
        return SeedData::empty();
    };

    match SeedData::load(path) {
        Ok(seed) => {
            tracing::info!(path = ?path, indicators = seed.len(), "Loaded seed data");
            seed
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring seed data");
            SeedData::empty()
        }
    }
}

/// Logs go to stderr so `once` can print the page on stdout
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("painel={}", logging.level).into());

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
