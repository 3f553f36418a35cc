//! Handling of a single forwarded mention.
//!
//! Posting the reply is outside this service. The responder resolves the
//! account it answers as and records the mention it would answer.

use anyhow::{Context, Result};
use tracing::info;

use mentionhook::secrets::{fetch_user_credentials, SecretStore};
use mentionhook::{Config, OutboundMessage};

/// Decode a queue payload.
pub fn decode(data: &[u8]) -> Result<OutboundMessage> {
    serde_json::from_slice(data).context("Failed to decode outbound message")
}

/// Handle one mention. Credentials are fetched per message.
pub async fn handle_mention(
    config: &Config,
    secrets: &dyn SecretStore,
    message: &OutboundMessage,
) -> Result<()> {
    let secret_id = config.user_secret_id()?;
    let account = fetch_user_credentials(secrets, secret_id).await?;

    info!(
        responder_user_id = %account.user_id,
        responder_screen_name = %account.screen_name,
        in_reply_to = %message.status_id,
        author_id = %message.user_id,
        author = %message.user,
        text_length = message.tweet_body.len(),
        "mention_ready_for_reply"
    );

    Ok(())
}
