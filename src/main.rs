//! Monitoreo API Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Loaded from a TOML file (see `--config`) with environment overrides:
//! - `MONITOREO_DATA_DIR`: Data directory for the log and snapshot
//! - `MONITOREO_ZONE`: IANA zone for local dates (default: UTC)
//! - `MONITOREO_API_HOST` / `MONITOREO_API_PORT`: Bind address
//! - `MONITOREO_API_KEY`: Shared secret for POST /api/datos
//! - `RUST_LOG`: Log filter (default: monitoreo=info,tower_http=debug)

use anyhow::Context;
use clap::Parser;
use monitoreo::api::{serve, ApiConfig, AppState};
use monitoreo::config::Config;
use monitoreo::store::FileStore;
use monitoreo::time::Normalizer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sensor telemetry ingestion and aggregation API
#[derive(Parser, Debug)]
#[command(name = "monitoreo", version, about)]
struct Args {
    /// Path to a TOML config file (default: standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<String>,

    /// Print a commented default config file and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", monitoreo::config::generate_default_config());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };

    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.store.data_dir = data_dir;
    }

    init_tracing(&config);

    tracing::info!("Starting Monitoreo API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {}", config.store.data_dir);

    let store = Arc::new(
        FileStore::open(&config.store.data_dir)
            .with_context(|| format!("opening store at {}", config.store.data_dir))?,
    );

    let normalizer = Normalizer::from_name(config.time.zone.as_deref());
    tracing::info!("Local zone: {}", normalizer.zone());

    if config.api.api_key.is_some() {
        tracing::info!("Ingestion API key required");
    } else {
        tracing::warn!("No API key configured, POST /api/datos accepts any producer");
    }

    let api_config = ApiConfig {
        host: config.api.host.clone(),
        port: config.api.port,
        api_key: config.api.api_key.clone(),
        request_timeout_secs: config.api.request_timeout_secs,
    };

    let state = AppState::new(store, normalizer, api_config.clone(), config.store.max_scan_lines);

    serve(state, &api_config).await?;

    tracing::info!("Monitoreo API server stopped");
    Ok(())
}

/// Initialize tracing from the logging config, `RUST_LOG` winning when set
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "monitoreo={},tower_http=debug",
            config.logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
