//! Secret lookup.
//!
//! Secrets are opaque JSON strings fetched by identifier. They are decoded
//! into credential bundles right before use and never cached between
//! requests.

pub mod store;
pub mod types;

pub use store::{
    fetch_api_credentials, fetch_user_credentials, FileSecretStore, MemorySecretStore,
    SecretStore,
};
pub use types::{ApiCredentials, UserCredentials};
