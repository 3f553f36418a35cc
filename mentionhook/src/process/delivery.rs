//! Delivery verification, filtering and publishing.
//!
//! ```text
//! Received → VerifyingSignature → {Rejected | Parsing}
//!          → {NoOp | Filtering} → Publishing(0..N) → {Acknowledged | Failed}
//! ```
//!
//! The body is never parsed before its signature is verified.

use tracing::{debug, error, info, warn};

use super::events::DeliveryEnvelope;
use super::filter::skip_reason;
use crate::error::{WebhookError, WebhookResult};
use crate::queue::{MessageChannel, OutboundMessage};
use crate::secrets::SecretStore;
use crate::web::signature::verify_delivery;
use crate::Config;

/// Successful end state of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Verified, but carried no events.
    NoOp,
    /// Every event was examined; `published` of them were forwarded.
    Acknowledged { published: usize, skipped: usize },
}

/// Verify, filter and forward one delivery.
pub async fn process_delivery(
    config: &Config,
    secrets: &dyn SecretStore,
    channel: &dyn MessageChannel,
    signature: Option<&str>,
    body: &[u8],
) -> WebhookResult<DeliveryOutcome> {
    let signature = match signature {
        Some(s) => s,
        None => {
            warn!("delivery_signature_missing");
            return Err(WebhookError::MissingHeader);
        }
    };

    if body.is_empty() {
        warn!("delivery_body_empty");
        return Err(WebhookError::EmptyBody);
    }

    let secret_id = config.api_secret_id()?;
    let self_id = config.self_user_id()?;

    if !verify_delivery(secrets, secret_id, body, signature).await {
        warn!(body_length = body.len(), "delivery_rejected");
        return Err(WebhookError::AuthenticationFailure);
    }

    let envelope: DeliveryEnvelope = serde_json::from_slice(body).map_err(|e| {
        error!(error = %e, "delivery_parse_failed");
        WebhookError::MalformedPayload(e.to_string())
    })?;

    let events = match envelope.events {
        Some(events) if !events.is_empty() => events,
        _ => {
            info!("delivery_without_events");
            return Ok(DeliveryOutcome::NoOp);
        }
    };

    let mut published = 0;
    let mut skipped = 0;

    for event in &events {
        if let Some(reason) = skip_reason(event, self_id) {
            debug!(status_id = %event.id_str, reason = reason.as_str(), "mention_skipped");
            skipped += 1;
            continue;
        }

        let message = OutboundMessage::from(event);
        publish(config, channel, &message).await?;
        published += 1;

        info!(
            message_id = %message.message_id(),
            status_id = %event.id_str,
            target_status_id = %message.status_id,
            user_id = %message.user_id,
            "mention_forwarded"
        );
    }

    info!(
        events = events.len(),
        published = published,
        skipped = skipped,
        "delivery_acknowledged"
    );

    Ok(DeliveryOutcome::Acknowledged { published, skipped })
}

async fn publish(
    config: &Config,
    channel: &dyn MessageChannel,
    message: &OutboundMessage,
) -> WebhookResult<()> {
    let queue = config.outbound_queue.as_deref().ok_or_else(|| {
        error!("outbound_queue_not_configured");
        WebhookError::ChannelUnavailable("OUTBOUND_QUEUE not configured".to_string())
    })?;

    let payload = serde_json::to_string(message)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

    channel.publish(queue, &payload).await.map_err(|e| {
        error!(
            queue = queue,
            message_id = %message.message_id(),
            error = %e,
            "mention_publish_failed"
        );
        WebhookError::ChannelUnavailable(e.to_string())
    })
}
