//! Queue message types.
//!
//! The outbound queue carries one [`OutboundMessage`] per qualifying mention.

use serde::{Deserialize, Serialize};

/// Normalized mention handed to the responder.
///
/// `status_id` is the tweet to answer: the id the mention replied to, or
/// the mention's own id when it was not a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Text of the mention
    pub tweet_body: String,
    /// Author account id
    pub user_id: String,
    /// Author screen name
    pub user: String,
    /// Target status id
    pub status_id: String,
}

impl OutboundMessage {
    /// Identifier that ties publish logs to a mention.
    pub fn message_id(&self) -> String {
        format!("mention-{}", self.status_id)
    }
}
