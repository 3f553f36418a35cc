//! Async RabbitMQ publisher for enqueueing messages.
//!
//! The publisher is shared across request tasks. It keeps one connection and
//! channel, reconnecting when the channel is no longer connected.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Publish-only outbound channel.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Publish `payload` to `topic`. Errors mean the message was not accepted.
    async fn publish(&self, topic: &str, payload: &str) -> Result<()>;
}

/// Async RabbitMQ publisher with connection management.
///
/// Topics are durable queues on the default exchange, declared once per
/// connection.
#[derive(Clone)]
pub struct Publisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    url: String,
    connection: RwLock<Option<Connection>>,
    channel: RwLock<Option<Channel>>,
    declared: RwLock<HashSet<String>>,
}

impl Publisher {
    /// Create a new publisher with the given RabbitMQ URL.
    pub fn new(url: String) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                url,
                connection: RwLock::new(None),
                channel: RwLock::new(None),
                declared: RwLock::new(HashSet::new()),
            }),
        }
    }

    /// Ensure we have a valid connection and channel.
    async fn ensure_connected(&self) -> Result<Channel> {
        {
            let channel = self.inner.channel.read().await;
            if let Some(ch) = channel.as_ref() {
                if ch.status().connected() {
                    return Ok(ch.clone());
                }
            }
        }

        let mut connection = self.inner.connection.write().await;
        let mut channel = self.inner.channel.write().await;

        // Double-check after acquiring write lock
        if let Some(ch) = channel.as_ref() {
            if ch.status().connected() {
                return Ok(ch.clone());
            }
        }

        info!("rabbitmq_publisher_connecting");

        let conn = Connection::connect(&self.inner.url, ConnectionProperties::default())
            .await
            .context("Failed to connect to RabbitMQ")?;

        let ch = conn
            .create_channel()
            .await
            .context("Failed to create channel")?;

        info!("rabbitmq_publisher_connected");

        *connection = Some(conn);
        *channel = Some(ch.clone());
        self.forget_declared().await;

        Ok(ch)
    }

    async fn is_declared(&self, queue: &str) -> bool {
        self.inner.declared.read().await.contains(queue)
    }

    async fn mark_declared(&self, queue: &str) {
        self.inner.declared.write().await.insert(queue.to_string());
    }

    /// A new connection starts with nothing declared.
    async fn forget_declared(&self) {
        self.inner.declared.write().await.clear();
    }

    /// Close the connection gracefully.
    pub async fn close(&self) {
        let mut connection = self.inner.connection.write().await;
        let mut channel = self.inner.channel.write().await;

        if let Some(ch) = channel.take() {
            if let Err(e) = ch.close(200, "Normal shutdown").await {
                warn!(error = %e, "rabbitmq_channel_close_error");
            }
        }

        if let Some(conn) = connection.take() {
            if let Err(e) = conn.close(200, "Normal shutdown").await {
                warn!(error = %e, "rabbitmq_connection_close_error");
            }
        }

        info!("rabbitmq_publisher_closed");
    }
}

/// Declare `queue` as durable. Idempotent on the broker side.
pub async fn declare_queue(channel: &Channel, queue: &str) -> Result<()> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .with_context(|| format!("Failed to declare queue {}", queue))?;
    Ok(())
}

#[async_trait]
impl MessageChannel for Publisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<()> {
        let channel = self.ensure_connected().await?;

        if !self.is_declared(topic).await {
            declare_queue(&channel, topic).await?;
            self.mark_declared(topic).await;
            info!(queue = topic, "rabbitmq_queue_declared");
        }

        channel
            .basic_publish(
                "",
                topic,
                BasicPublishOptions::default(),
                payload.as_bytes(),
                BasicProperties::default()
                    .with_delivery_mode(2) // Persistent
                    .with_content_type("application/json".into()),
            )
            .await
            .context("Failed to publish to outbound queue")?
            .await
            .context("Failed to confirm publish")?;

        info!(
            queue = topic,
            body_length = payload.len(),
            "rabbitmq_outbound_published"
        );

        Ok(())
    }
}
