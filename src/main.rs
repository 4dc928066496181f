//! sqlsight binary entry point.
//!
//! Wires configuration, target resolution and metric definition loading
//! into the exporter, then serves the exposition endpoint until shutdown.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use sqlsight::{
    config::{AppConfig, ConfigError, load_definitions, parse_duration},
    exporter::Exporter,
    server::{AppState, create_router},
    target::resolve_targets,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// sqlsight - SQL query to Prometheus metrics exporter
#[derive(Parser, Debug)]
#[command(name = "sqlsight", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "SQLSIGHT_CONFIG")]
    config: Option<String>,

    /// Comma-separated list of target connection strings (overrides config file)
    #[arg(long, env = "DATA_SOURCE_NAME")]
    dsn: Option<String>,

    /// Server bind address (overrides config file)
    #[arg(long, env = "SQLSIGHT_SERVER_BIND")]
    server_bind: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, env = "SQLSIGHT_SERVER_PORT")]
    server_port: Option<u16>,

    /// File with default metric definitions (overrides config file)
    #[arg(long, env = "DEFAULT_METRICS")]
    default_metrics: Option<String>,

    /// File with additional custom metric definitions (overrides config file)
    #[arg(long, env = "CUSTOM_METRICS")]
    custom_metrics: Option<String>,

    /// Per-query timeout, e.g. "5s" (overrides config file)
    #[arg(long, env = "QUERY_TIMEOUT")]
    query_timeout: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlsight=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    sqlx::any::install_default_drivers();

    // Load configuration from file, or start from defaults
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(dsn) = cli.dsn {
        config.targets.dsn = dsn;
    }
    if let Some(bind) = cli.server_bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.server_port {
        config.server.port = port;
    }
    if let Some(path) = cli.default_metrics {
        config.default_metrics = path;
    }
    if let Some(path) = cli.custom_metrics {
        config.custom_metrics = Some(path);
    }
    if let Some(timeout) = cli.query_timeout {
        config.query_timeout = parse_duration(&timeout).map_err(ConfigError::Validation)?;
    }
    config.validate()?;

    // Resolve targets; zero valid targets is fatal
    let targets = resolve_targets(&config.targets.dsn)?;

    // Load metric definitions; any parse or validation failure is fatal
    let definitions = load_definitions(
        Path::new(&config.default_metrics),
        config.custom_metrics.as_deref().map(Path::new),
    )?;

    tracing::info!(
        targets = targets.len(),
        definitions = definitions.len(),
        query_timeout = ?config.query_timeout,
        "configuration loaded"
    );

    let exporter = Arc::new(Exporter::new(&targets, definitions, config.query_timeout)?);
    let state = AppState {
        exporter,
        telemetry_path: config.telemetry_path.clone(),
    };
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("listening on http://{}{}", addr, config.telemetry_path);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("received terminate signal");
        }
    }
}
