//! Queue module for RabbitMQ operations.
//!
//! This module provides:
//! - The outbound message format
//! - The publish-only channel trait and its RabbitMQ implementation
//!
//! ## Architecture
//!
//! ```text
//! Web Server → outbound queue → Responder
//! ```

pub mod publisher;
pub mod types;

pub use publisher::{declare_queue, MessageChannel, Publisher};
pub use types::OutboundMessage;
