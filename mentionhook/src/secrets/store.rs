//! Secret store backends.
//!
//! The file store reads `<dir>/<identifier>` on every lookup, so rotated
//! secrets are picked up without a restart.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::types::{ApiCredentials, UserCredentials};
use crate::error::WebhookError;

/// Key-value secret lookup.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the raw secret string, `Ok(None)` if no such identifier exists.
    async fn get_secret(&self, id: &str) -> Result<Option<String>>;
}

/// Secrets stored as individual files in a directory.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, id: &str) -> Result<Option<String>> {
        // Identifiers are file names, never paths.
        if id.is_empty() || id.contains('/') || id.contains('\\') || id == "." || id == ".." {
            anyhow::bail!("invalid secret identifier");
        }

        match tokio::fs::read_to_string(self.dir.join(id)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read secret file"),
        }
    }
}

/// In-process secret map.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    secrets: HashMap<String, String>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(id.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, id: &str) -> Result<Option<String>> {
        Ok(self.secrets.get(id).cloned())
    }
}

/// Fetch and decode the API credential bundle.
pub async fn fetch_api_credentials(
    store: &dyn SecretStore,
    id: &str,
) -> Result<ApiCredentials, WebhookError> {
    fetch_bundle(store, id).await
}

/// Fetch and decode the user credential bundle.
pub async fn fetch_user_credentials(
    store: &dyn SecretStore,
    id: &str,
) -> Result<UserCredentials, WebhookError> {
    fetch_bundle(store, id).await
}

async fn fetch_bundle<T: DeserializeOwned>(
    store: &dyn SecretStore,
    id: &str,
) -> Result<T, WebhookError> {
    let raw = match store.get_secret(id).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            warn!(secret_id = %id, "secret_not_found");
            return Err(WebhookError::SecretUnavailable(format!("{} not found", id)));
        }
        Err(e) => {
            warn!(secret_id = %id, error = %e, "secret_fetch_failed");
            return Err(WebhookError::SecretUnavailable(format!("{} unreachable", id)));
        }
    };

    // serde_json errors can quote input, so the error itself is not surfaced.
    serde_json::from_str(&raw).map_err(|_| {
        warn!(secret_id = %id, "secret_decode_failed");
        WebhookError::SecretUnavailable(format!("{} undecodable", id))
    })
}
