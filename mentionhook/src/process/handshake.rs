//! Challenge-response handshake.
//!
//! The platform sends a `crc_token` and expects it back signed with the API
//! secret key, proving we hold the secret without sending it.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{WebhookError, WebhookResult};
use crate::secrets::{fetch_api_credentials, SecretStore};
use crate::web::signature::signature_header;
use crate::Config;

/// Body returned for a successful handshake.
#[derive(Debug, Serialize)]
pub struct CrcResponse {
    pub response_token: String,
}

/// Answer a challenge token.
pub async fn answer_challenge(
    config: &Config,
    secrets: &dyn SecretStore,
    crc_token: Option<&str>,
) -> WebhookResult<CrcResponse> {
    let token = match crc_token {
        Some(t) if !t.is_empty() => t,
        _ => {
            warn!("crc_token_missing");
            return Err(WebhookError::MissingParameter);
        }
    };

    let secret_id = config.api_secret_id()?;
    let creds = fetch_api_credentials(secrets, secret_id).await?;

    let response_token = signature_header(&creds.api_secret_key, token.as_bytes())
        .ok_or_else(|| WebhookError::SecretUnavailable("signing key rejected".to_string()))?;

    info!(token_length = token.len(), "crc_challenge_answered");

    Ok(CrcResponse { response_token })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{api_secret_json, test_config};
    use crate::secrets::MemorySecretStore;

    #[tokio::test]
    async fn test_known_challenge() {
        let store = MemorySecretStore::new().with_secret("api", api_secret_json("shh"));
        let response = answer_challenge(&test_config(), &store, Some("abc123"))
            .await
            .unwrap();
        assert_eq!(
            response.response_token,
            "sha256=JwbJ7rk5zCPrcSDEAf7XRfEWKNiJMHqxJa0Va4Yd7KU="
        );
    }

    #[tokio::test]
    async fn test_same_token_same_response() {
        let store = MemorySecretStore::new().with_secret("api", api_secret_json("shh"));
        let config = test_config();
        let first = answer_challenge(&config, &store, Some("token")).await.unwrap();
        let second = answer_challenge(&config, &store, Some("token")).await.unwrap();
        assert_eq!(first.response_token, second.response_token);
    }

    #[tokio::test]
    async fn test_missing_token_checked_before_secret() {
        // No secret configured: the token check must still win.
        let store = MemorySecretStore::new();
        let err = answer_challenge(&test_config(), &store, None).await.unwrap_err();
        assert!(matches!(err, WebhookError::MissingParameter));

        let err = answer_challenge(&test_config(), &store, Some("")).await.unwrap_err();
        assert!(matches!(err, WebhookError::MissingParameter));
    }

    #[tokio::test]
    async fn test_missing_secret() {
        let store = MemorySecretStore::new();
        let err = answer_challenge(&test_config(), &store, Some("abc123"))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::SecretUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_secret_id() {
        let store = MemorySecretStore::new().with_secret("api", api_secret_json("shh"));
        let config = Config {
            api_secret_id: None,
            ..test_config()
        };
        let err = answer_challenge(&config, &store, Some("abc123")).await.unwrap_err();
        assert!(matches!(err, WebhookError::ConfigurationMissing("API_SECRET_ID")));
    }
}
