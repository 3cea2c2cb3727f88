//! lexi-enrich - vocabulary enrichment service
//!
//! Hosts the supplementation engine behind a small HTTP surface:
//! - `GET /health`
//! - `POST /words/:id/supplement`
//! - `POST /maintenance/example-cache/cleanup`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lexi_common::config::{self, TomlConfig};
use lexi_enrich::config::EnrichmentConfig;
use lexi_enrich::freshness::{Clock, SystemClock};
use lexi_enrich::{AppState, WordSupplementationService};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5731";

/// Command-line arguments for lexi-enrich
#[derive(Parser, Debug)]
#[command(name = "lexi-enrich")]
#[command(about = "Vocabulary enrichment cache and merge service")]
#[command(version)]
struct Args {
    /// Root folder holding the database
    #[arg(short, long, env = "LEXI_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "LEXI_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "LEXI_BIND_ADDRESS")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = match config::config_file_path(args.config.as_deref()) {
        Some(path) => TomlConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };

    let default_filter = format!(
        "lexi_enrich={level},lexi_common={level},tower_http=info",
        level = toml_config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting lexi-enrich v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = config::database_path(&root_folder);
    info!(root = %root_folder.display(), database = %db_path.display(), "Resolved storage");

    let pool = lexi_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let enrichment_config =
        EnrichmentConfig::from_toml(&toml_config).context("Invalid [enrichment] config")?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sources = lexi_enrich::sources::build_sources(&toml_config, clock.clone())
        .context("Invalid [[sources]] config")?;
    if sources.is_empty() {
        warn!("No enrichment sources configured; supplement will only read the cache");
    }

    let service = Arc::new(
        WordSupplementationService::new(pool.clone(), sources, enrichment_config)
            .with_clock(clock),
    );
    let app = lexi_enrich::build_router(AppState::new(pool, service));

    let bind = args
        .bind
        .or(toml_config.bind_address)
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;
    info!("Listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
