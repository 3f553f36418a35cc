//! RabbitMQ consumer for forwarded mentions.
//!
//! Connects, consumes the outbound queue and spawns a task per delivery.
//! Messages that cannot be decoded or handled are rejected without requeue.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use lapin::{
    options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions},
    types::FieldTable,
    Channel, Connection, ConnectionProperties,
};
use tokio::signal;
use tracing::{error, info, warn};

use mentionhook::queue::declare_queue;
use mentionhook::{Config, FileSecretStore, SecretStore};

use crate::responder::{decode, handle_mention};

/// Run the RabbitMQ consumer until SIGINT/SIGTERM or the broker closes it.
pub async fn run(config: Config) -> Result<()> {
    let config = Arc::new(config);
    let queue = config
        .outbound_queue
        .clone()
        .context("OUTBOUND_QUEUE is not configured")?;

    info!(url_length = config.cloudamqp_url.len(), "rabbitmq_connecting");

    let conn = Connection::connect(&config.cloudamqp_url, ConnectionProperties::default())
        .await
        .context("Failed to connect to RabbitMQ")?;

    info!("rabbitmq_connected");

    let channel = conn.create_channel().await.context("Failed to create channel")?;

    let prefetch_count = u16::try_from(config.responder_concurrency).unwrap_or(u16::MAX);
    channel
        .basic_qos(prefetch_count, BasicQosOptions::default())
        .await
        .context("Failed to set QoS")?;

    info!(prefetch_count = prefetch_count, "rabbitmq_qos_set");

    declare_queue(&channel, &queue).await?;

    info!(queue = %queue, "rabbitmq_queue_declared");

    let secrets: Arc<dyn SecretStore> =
        Arc::new(FileSecretStore::new(config.secrets_dir.clone()));

    let mut consumer = channel
        .basic_consume(
            &queue,
            "mentionhook-responder",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .context("Failed to start consumer")?;

    info!(queue = %queue, "responder_ready");

    let channel = Arc::new(channel);

    let shutdown = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT"),
            _ = terminate => info!("Received SIGTERM"),
        }
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("responder_stopping");
                break;
            }
            delivery = consumer.next() => {
                match delivery {
                    Some(Ok(delivery)) => {
                        let delivery_tag = delivery.delivery_tag;
                        let config = Arc::clone(&config);
                        let secrets = Arc::clone(&secrets);
                        let channel = Arc::clone(&channel);

                        tokio::spawn(async move {
                            let message = match decode(&delivery.data) {
                                Ok(message) => message,
                                Err(e) => {
                                    error!(
                                        delivery_tag = delivery_tag,
                                        error = %e,
                                        "mention_decode_failed"
                                    );
                                    reject(&channel, delivery_tag).await;
                                    return;
                                }
                            };

                            if let Err(e) =
                                handle_mention(&config, secrets.as_ref(), &message).await
                            {
                                warn!(
                                    status_id = %message.status_id,
                                    error = %e,
                                    "mention_handling_failed"
                                );
                                reject(&channel, delivery_tag).await;
                                return;
                            }

                            if let Err(e) = channel
                                .basic_ack(delivery_tag, BasicAckOptions::default())
                                .await
                            {
                                error!(
                                    delivery_tag = delivery_tag,
                                    error = %e,
                                    "rabbitmq_ack_failed"
                                );
                            } else {
                                info!(status_id = %message.status_id, "mention_completed");
                            }
                        });
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "rabbitmq_delivery_error");
                    }
                    None => {
                        warn!("rabbitmq_consumer_closed");
                        break;
                    }
                }
            }
        }
    }

    info!("responder_shutdown_complete");
    Ok(())
}

/// Nack without requeue. Failed mentions are not retried.
async fn reject(channel: &Channel, delivery_tag: u64) {
    if let Err(e) = channel
        .basic_nack(
            delivery_tag,
            BasicNackOptions {
                requeue: false,
                ..Default::default()
            },
        )
        .await
    {
        error!(delivery_tag = delivery_tag, error = %e, "rabbitmq_nack_failed");
    }
}
