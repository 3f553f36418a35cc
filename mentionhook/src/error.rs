//! Typed failures for the webhook pipeline.
//!
//! Each variant maps to a fixed HTTP status and a stable public message.
//! The `Display` text is for logs only and may name the missing config key;
//! it never carries secret material.

use axum::http::StatusCode;

/// Errors produced while handling a handshake or a delivery.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The `crc_token` query parameter was absent or empty.
    #[error("challenge token missing")]
    MissingParameter,

    /// The signature header was absent.
    #[error("signature header missing")]
    MissingHeader,

    /// The delivery body was empty.
    #[error("delivery body empty")]
    EmptyBody,

    /// The delivery body could not be read (too large or truncated).
    #[error("delivery body unreadable: {0}")]
    UnreadableBody(String),

    /// The signature did not match the body.
    #[error("signature verification failed")]
    AuthenticationFailure,

    /// The secret could not be fetched or decoded.
    #[error("secret unavailable: {0}")]
    SecretUnavailable(String),

    /// The outbound channel rejected a publish or has no destination.
    #[error("outbound channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// A required configuration value is unset.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(&'static str),

    /// The verified body did not match the delivery schema.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Result alias for pipeline operations.
pub type WebhookResult<T> = Result<T, WebhookError>;

impl WebhookError {
    /// HTTP status returned for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter
            | Self::MissingHeader
            | Self::EmptyBody
            | Self::UnreadableBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailure => StatusCode::UNAUTHORIZED,
            Self::SecretUnavailable(_)
            | Self::ChannelUnavailable(_)
            | Self::ConfigurationMissing(_)
            | Self::MalformedPayload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingParameter => "Challenge was not passed in as a query parameter.",
            Self::MissingHeader => "Signature header was not passed in.",
            Self::EmptyBody => "Request body was empty.",
            Self::UnreadableBody(_) => "Request body could not be read.",
            Self::AuthenticationFailure => "Request signature could not be verified.",
            Self::SecretUnavailable(_) => {
                "Could not retrieve required resource, internal failure."
            }
            Self::ChannelUnavailable(_)
            | Self::ConfigurationMissing(_)
            | Self::MalformedPayload(_) => "Internal Server Error",
        }
    }
}
