//! Mention qualification.

use super::events::TweetEvent;

/// Why an event was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotMentioned,
    Retweet,
    OwnTweet,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotMentioned => "not_mentioned",
            Self::Retweet => "retweet",
            Self::OwnTweet => "own_tweet",
        }
    }
}

/// First rule `event` fails, or `None` if it qualifies.
///
/// An event qualifies when it mentions us, is not a retweet and was not
/// written by us.
pub fn skip_reason(event: &TweetEvent, self_id: &str) -> Option<SkipReason> {
    if !event.mentions(self_id) {
        Some(SkipReason::NotMentioned)
    } else if event.is_retweet() {
        Some(SkipReason::Retweet)
    } else if event.user.id_str == self_id {
        Some(SkipReason::OwnTweet)
    } else {
        None
    }
}
