//! The `broker` module is the hub's view of the external pub/sub relay.
//!
//! The hub only needs three things from it: publish a string to a named
//! channel, subscribe to a channel, and receive the next item from that
//! subscription. [`Broker`] captures that contract; `RedisBroker` talks to a
//! real Redis server and `MemoryBroker` relays in-process.

pub mod memory;
pub mod redis_broker;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::utils::Result;

pub use self::memory::MemoryBroker;
pub use self::redis_broker::RedisBroker;

/// One item received from a broker subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerItem {
    /// A message someone published on the channel.
    Published { channel: String, data: String },
    /// Subscribe/unsubscribe acknowledgement. `count` is the number of
    /// channels the subscription connection is now attached to.
    Subscription {
        channel: String,
        kind: String,
        count: usize,
    },
    /// The subscription is no longer usable.
    TerminalError(String),
    /// Anything the backend produced that the hub has no use for.
    Other(String),
}

#[async_trait]
pub trait Broker: Send + Sync + std::fmt::Debug {
    async fn publish(&self, channel: &str, content: &str) -> Result<()>;

    async fn subscribe(&self, channel: &str) -> Result<Subscription>;
}

/// Receiving end of a broker subscription.
#[derive(Debug)]
pub struct Subscription {
    channel: String,
    rx: mpsc::UnboundedReceiver<BrokerItem>,
}

impl Subscription {
    /// A subscription plus the sender a backend feeds it through.
    pub fn channel(channel: &str) -> (mpsc::UnboundedSender<BrokerItem>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sub = Self {
            channel: channel.to_string(),
            rx,
        };
        (tx, sub)
    }

    pub fn name(&self) -> &str {
        &self.channel
    }

    /// Wait for the next item. A backend that went away without saying so
    /// shows up as a terminal error.
    pub async fn recv(&mut self) -> BrokerItem {
        match self.rx.recv().await {
            Some(item) => item,
            None => BrokerItem::TerminalError(format!(
                "subscription to '{}' closed by the broker",
                self.channel
            )),
        }
    }
}

#[cfg(test)]
mod tests;
