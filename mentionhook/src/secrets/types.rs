//! Credential bundles stored in the secret store.
//!
//! Field names match the stored JSON (`ApiSecretKey`, `UserId`, ...).

use std::fmt;

use serde::Deserialize;

/// Application-level credentials. `api_secret_key` is the HMAC key for
/// both the handshake and delivery signatures.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret_key: String,
    pub access_token: String,
    pub access_token_secret: String,
}

/// Credentials of the account the responder acts as.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserCredentials {
    pub access_token: String,
    pub access_token_secret: String,
    pub user_id: String,
    pub screen_name: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret_key", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("access_token", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("screen_name", &self.screen_name)
            .finish()
    }
}
