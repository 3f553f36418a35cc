//! Mentionhook Web Server - signed webhook receiver.
//!
//! This binary:
//! - Answers the platform's CRC handshake
//! - Verifies the signature on every delivery
//! - Publishes mentions of our account to RabbitMQ
//!
//! Replies are produced by the responder, not here.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mentionhook::{router, AppState, Config, FileSecretStore, Publisher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    let config = Config::from_env();
    info!(
        port = config.port,
        api_secret_configured = config.api_secret_id.is_some(),
        self_user_configured = config.self_user_id.is_some(),
        outbound_queue = ?config.outbound_queue,
        secrets_dir = %config.secrets_dir.display(),
        "config_loaded"
    );

    let publisher = Publisher::new(config.cloudamqp_url.clone());
    info!("rabbitmq_publisher_created");

    let secrets = FileSecretStore::new(config.secrets_dir.clone());

    let state = AppState::new(
        config.clone(),
        Arc::new(secrets),
        Arc::new(publisher.clone()),
    );

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    publisher.close().await;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
