//! Redis backend
//!
//! Publishing goes through a multiplexed connection that is opened on first
//! use and dropped after any failure so the next publish reconnects.
//! Each subscription gets its own pub/sub connection, pumped by a background
//! task until the server goes away or the `Subscription` is dropped.

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{Broker, BrokerItem, Subscription};
use crate::utils::Result;

pub struct RedisBroker {
    client: redis::Client,
    publisher: Mutex<Option<MultiplexedConnection>>,
}

impl RedisBroker {
    /// Parse `url` (e.g. `redis://127.0.0.1:6379`). No connection is made yet.
    pub fn open(url: &str) -> Result<Self> {
        Ok(Self {
            client: redis::Client::open(url)?,
            publisher: Mutex::new(None),
        })
    }

    async fn publisher(&self) -> Result<MultiplexedConnection> {
        let mut slot = self.publisher.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self.client.get_multiplexed_async_connection().await?;
        *slot = Some(conn.clone());
        Ok(conn)
    }
}

impl std::fmt::Debug for RedisBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBroker")
            .field("client", &self.client.get_connection_info().addr)
            .finish()
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn publish(&self, channel: &str, content: &str) -> Result<()> {
        let mut conn = self.publisher().await?;
        match conn.publish::<_, _, i64>(channel, content).await {
            Ok(receivers) => {
                debug!(channel, receivers, "published to redis");
                Ok(())
            }
            Err(e) => {
                *self.publisher.lock().await = None;
                Err(e.into())
            }
        }
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;

        let (tx, subscription) = Subscription::channel(channel);
        let _ = tx.send(BrokerItem::Subscription {
            channel: channel.to_string(),
            kind: "subscribe".to_string(),
            count: 1,
        });

        let name = channel.to_string();
        tokio::spawn(async move {
            let messages = pubsub.into_on_message();
            futures_util::pin_mut!(messages);

            loop {
                tokio::select! {
                    next = messages.next() => {
                        let Some(msg) = next else { break };
                        let item = match msg.get_payload::<String>() {
                            Ok(data) => BrokerItem::Published {
                                channel: msg.get_channel_name().to_string(),
                                data,
                            },
                            Err(e) => BrokerItem::Other(format!(
                                "undecodable payload on '{}': {e}",
                                msg.get_channel_name()
                            )),
                        };
                        if tx.send(item).is_err() {
                            return;
                        }
                    }
                    _ = tx.closed() => return,
                }
            }

            warn!(channel = %name, "redis pub/sub stream ended");
            let _ = tx.send(BrokerItem::TerminalError(format!(
                "redis pub/sub connection for '{name}' closed"
            )));
        });

        Ok(subscription)
    }
}
