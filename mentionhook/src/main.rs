//! Mentionhook Responder - consumes mentions forwarded by the web server.
//!
//! Each message on the outbound queue is one mention of our account that
//! passed signature verification and filtering.

mod consumer;
mod responder;

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mentionhook::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    tracing::info!("responder_starting");

    let config = Config::from_env();
    tracing::info!(
        cloudamqp_url_set = !config.cloudamqp_url.is_empty(),
        outbound_queue = ?config.outbound_queue,
        user_secret_configured = config.user_secret_id.is_some(),
        concurrency = config.responder_concurrency,
        "config_loaded"
    );

    consumer::run(config).await?;

    Ok(())
}
