//! Delivery payload schema.
//!
//! Only the fields the filter reads are decoded; everything else in the
//! platform's payload is ignored. Ids use the platform's `*_str` fields.

use serde::Deserialize;

use crate::queue::OutboundMessage;

/// Top-level delivery body.
///
/// Deliveries for other activity types (follows, likes, ...) carry no
/// `events` collection and decode with `events == None`.
#[derive(Debug, Deserialize)]
pub struct DeliveryEnvelope {
    #[serde(default)]
    pub events: Option<Vec<TweetEvent>>,
}

/// A single delivered tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct TweetEvent {
    pub id_str: String,
    pub text: String,
    pub user: TweetUser,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub in_reply_to_status_id_str: Option<String>,
    /// Present only on retweets. Its contents are never inspected.
    #[serde(default)]
    pub retweeted_status: Option<serde_json::Value>,
    /// Untruncated text for tweets longer than the legacy limit.
    #[serde(default)]
    pub extended_tweet: Option<ExtendedTweet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetUser {
    pub id_str: String,
    pub screen_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub user_mentions: Vec<UserMention>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserMention {
    pub id_str: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtendedTweet {
    pub full_text: String,
}

impl TweetEvent {
    /// Full text when available, otherwise the (possibly truncated) text.
    pub fn body_text(&self) -> &str {
        self.extended_tweet
            .as_ref()
            .map(|ext| ext.full_text.as_str())
            .unwrap_or(&self.text)
    }

    pub fn mentions(&self, user_id: &str) -> bool {
        self.entities
            .user_mentions
            .iter()
            .any(|mention| mention.id_str == user_id)
    }

    pub fn is_retweet(&self) -> bool {
        self.retweeted_status.is_some()
    }

    /// Status a reply should target.
    pub fn target_status_id(&self) -> &str {
        self.in_reply_to_status_id_str
            .as_deref()
            .unwrap_or(&self.id_str)
    }
}

impl From<&TweetEvent> for OutboundMessage {
    fn from(event: &TweetEvent) -> Self {
        OutboundMessage {
            tweet_body: event.body_text().to_string(),
            user_id: event.user.id_str.clone(),
            user: event.user.screen_name.clone(),
            status_id: event.target_status_id().to_string(),
        }
    }
}
