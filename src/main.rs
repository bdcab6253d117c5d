//! scribed - Scribe Daemon
//!
//! Hosts collaboratively edited documents. Transports attach through the
//! library's [`Curator`]; the daemon itself owns storage, metrics and the
//! shutdown sequence.

use scribed::config::{self, Config};
use scribed::{Curator, http, metrics, store};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "Refusing to start with {} configuration error(s). See error messages above.",
            errors.len()
        ));
    }

    info!(
        server = %config.server.name,
        storage = ?config.storage.kind,
        retention_secs = config.binder.retention_period_secs,
        flush_ms = config.binder.flush_period_ms,
        kick_ms = config.binder.kick_period_ms,
        idle_close_secs = config.binder.close_inactivity_period_secs,
        "Starting scribed"
    );

    let store = store::from_config(&config.storage).await?;
    let curator = Arc::new(Curator::new(config.binder.clone(), store));
    info!("Curator ready");

    // Prometheus metrics are optional.
    // Convention: metrics_port = 0 disables the HTTP endpoint (used by tests).
    let metrics_port = config.server.metrics_port.unwrap_or(9090);
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        info!("Metrics initialized");

        let curator = curator.clone();
        tokio::spawn(async move {
            http::run_http_server(metrics_port, curator).await;
        });
        info!(port = metrics_port, "Operator HTTP server started");
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested, flushing open documents");

    curator.close().await;
    info!("Shutdown complete");

    Ok(())
}
