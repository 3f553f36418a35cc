//! Mentionhook - signed webhook receiver for account mentions.
//!
//! This library provides shared modules for the two binaries:
//! - `mentionhook-web`: answers the CRC handshake and verifies deliveries
//! - `mentionhook-responder`: consumes forwarded mentions
//!
//! ## Architecture
//!
//! ```text
//! Platform → Web Server (verify, filter) → outbound queue → Responder
//! ```

pub mod config;
pub mod error;
pub mod process;
pub mod queue;
pub mod secrets;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::{WebhookError, WebhookResult};
pub use process::{answer_challenge, process_delivery, DeliveryOutcome};
pub use queue::{MessageChannel, OutboundMessage, Publisher};
pub use secrets::{FileSecretStore, SecretStore};
pub use web::{router, AppState};
