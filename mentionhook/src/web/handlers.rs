//! Webhook endpoint handlers.
//!
//! Handlers only extract the request parts and map pipeline results onto
//! responses. All decisions live in [`crate::process`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::WebhookError;
use crate::process::{answer_challenge, process_delivery};
use crate::queue::MessageChannel;
use crate::secrets::SecretStore;
use crate::Config;

/// Header carrying `sha256=<base64>` of the raw body.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub secrets: Arc<dyn SecretStore>,
    pub channel: Arc<dyn MessageChannel>,
}

impl AppState {
    pub fn new(
        config: Config,
        secrets: Arc<dyn SecretStore>,
        channel: Arc<dyn MessageChannel>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            secrets,
            channel,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// Acknowledgement body for deliveries.
#[derive(Serialize)]
pub struct AckResponse {
    pub msg: &'static str,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Handshake
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CrcQuery {
    pub crc_token: Option<String>,
}

/// Challenge-response endpoint.
///
/// A query string that does not decode (repeated or badly escaped
/// `crc_token`) is reported as a missing challenge.
pub async fn crc_challenge(
    State(state): State<AppState>,
    query: Result<Query<CrcQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!(error = %rejection, "crc_query_rejected");
            return WebhookError::MissingParameter.into_response();
        }
    };

    info!(has_token = query.crc_token.is_some(), "crc_challenge_received");

    match answer_challenge(
        &state.config,
        state.secrets.as_ref(),
        query.crc_token.as_deref(),
    )
    .await
    {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// Event delivery endpoint.
///
/// The body is taken as raw bytes so the signature covers exactly what was
/// sent. A signature header with bytes outside visible ASCII is still a
/// present header; it is decoded lossily and fails verification.
pub async fn webhook_delivery(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "delivery_body_rejected");
            return WebhookError::UnreadableBody(rejection.body_text()).into_response();
        }
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()));

    info!(
        has_signature = signature.is_some(),
        body_length = body.len(),
        "delivery_received"
    );

    match process_delivery(
        &state.config,
        state.secrets.as_ref(),
        state.channel.as_ref(),
        signature.as_deref(),
        &body,
    )
    .await
    {
        Ok(_) => (StatusCode::OK, Json(AckResponse { msg: "Got it!" })).into_response(),
        Err(e) => e.into_response(),
    }
}
