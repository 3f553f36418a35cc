//! Webhook processing pipeline.
//!
//! ## Processing Flow
//!
//! ```text
//! GET  crc_token  → answer_challenge() → CrcResponse
//! POST delivery   → process_delivery() → verify → parse → filter → publish
//! ```

pub mod delivery;
pub mod events;
pub mod filter;
pub mod handshake;

pub use delivery::{process_delivery, DeliveryOutcome};
pub use events::{DeliveryEnvelope, TweetEvent};
pub use filter::{skip_reason, SkipReason};
pub use handshake::{answer_challenge, CrcResponse};
