//! Shared test doubles.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::queue::MessageChannel;
use crate::Config;

pub const SELF_ID: &str = "123";
pub const QUEUE: &str = "mentions";

pub fn test_config() -> Config {
    Config {
        cloudamqp_url: "amqp://127.0.0.1:1/%2f".to_string(),
        port: 0,
        api_secret_id: Some("api".to_string()),
        user_secret_id: Some("user".to_string()),
        outbound_queue: Some(QUEUE.to_string()),
        self_user_id: Some(SELF_ID.to_string()),
        secrets_dir: PathBuf::from("/nonexistent"),
        responder_concurrency: 1,
    }
}

pub fn api_secret_json(secret_key: &str) -> String {
    serde_json::json!({
        "ApiKey": "api-key",
        "ApiSecretKey": secret_key,
        "AccessToken": "access-token",
        "AccessTokenSecret": "access-token-secret",
    })
    .to_string()
}

/// Records publishes; fails the publish numbered `fail_at` (0-based).
#[derive(Default)]
pub struct RecordingChannel {
    pub published: Mutex<Vec<(String, String)>>,
    pub fail_at: Option<usize>,
}

impl RecordingChannel {
    pub fn failing_at(index: usize) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail_at: Some(index),
        }
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    async fn publish(&self, topic: &str, payload: &str) -> Result<()> {
        let mut published = self.published.lock().unwrap();
        if self.fail_at == Some(published.len()) {
            anyhow::bail!("broker unreachable");
        }
        published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}
