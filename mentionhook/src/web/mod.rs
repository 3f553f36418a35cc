//! Web server module for handling inbound webhooks.
//!
//! This module provides the HTTP surface:
//! - `GET  /webhooks/twitter?crc_token=...` answers the handshake
//! - `POST /webhooks/twitter` verifies and forwards deliveries
//! - `GET  /health`

pub mod handlers;
pub mod signature;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{
    crc_challenge, health, webhook_delivery, AckResponse, AppState, CrcQuery, ErrorResponse,
    HealthResponse, SIGNATURE_HEADER,
};
pub use signature::{constant_time_compare, sign, signature_header, verify_signature};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/twitter", get(crc_challenge).post(webhook_delivery))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
