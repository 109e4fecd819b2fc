//! In-process broker
//!
//! Relays published strings to every live subscription of the same channel.
//! Used for local runs without Redis and throughout the test suite, which is
//! why it can be told to fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::{Broker, BrokerItem, Subscription};
use crate::utils::{HubError, Result};

#[derive(Debug, Default)]
pub struct MemoryBroker {
    channels: Mutex<HashMap<String, Vec<UnboundedSender<BrokerItem>>>>,
    published: AtomicUsize,
    reject_publishes: AtomicBool,
    reject_subscribes: AtomicUsize,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// End every open subscription with a terminal error. Returns how many
    /// subscriptions were ended.
    pub fn fail_subscriptions(&self, reason: &str) -> usize {
        let mut channels = self.channels();
        let mut ended = 0;
        for (_, subscribers) in channels.drain() {
            for tx in subscribers {
                if tx.send(BrokerItem::TerminalError(reason.to_string())).is_ok() {
                    ended += 1;
                }
            }
        }
        ended
    }

    /// Make every publish fail until switched back off.
    pub fn fail_publishes(&self, fail: bool) {
        self.reject_publishes.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` subscribe calls fail.
    pub fn fail_next_subscribes(&self, count: usize) {
        self.reject_subscribes.store(count, Ordering::SeqCst);
    }

    /// Inject an arbitrary item into every subscription of `channel`.
    pub fn inject(&self, channel: &str, item: BrokerItem) {
        if let Some(subscribers) = self.channels().get_mut(channel) {
            subscribers.retain(|tx| tx.send(item.clone()).is_ok());
        }
    }

    /// Number of publishes accepted so far.
    pub fn published_count(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels()
            .get(channel)
            .map(|subs| subs.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, Vec<UnboundedSender<BrokerItem>>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn publish(&self, channel: &str, content: &str) -> Result<()> {
        if self.reject_publishes.load(Ordering::SeqCst) {
            return Err(HubError::Broker(format!("publish to '{channel}' rejected")));
        }

        self.published.fetch_add(1, Ordering::SeqCst);
        self.inject(
            channel,
            BrokerItem::Published {
                channel: channel.to_string(),
                data: content.to_string(),
            },
        );
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        let rejected = self
            .reject_subscribes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(HubError::Broker(format!(
                "subscribe to '{channel}' rejected"
            )));
        }

        let (tx, subscription) = Subscription::channel(channel);
        let _ = tx.send(BrokerItem::Subscription {
            channel: channel.to_string(),
            kind: "subscribe".to_string(),
            count: 1,
        });
        self.channels()
            .entry(channel.to_string())
            .or_default()
            .push(tx);
        Ok(subscription)
    }
}
