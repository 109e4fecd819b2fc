//! Broker intake loop
//!
//! Receives items from the hub's broker subscription and broadcasts every
//! published message. [`run_intake_once`] drains a single subscription until
//! it fails; [`run_intake`] wraps it and resubscribes with exponential
//! backoff, so delivery resumes after the broker comes back.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::broker::{BrokerItem, Subscription};
use crate::config::BrokerSettings;
use crate::hub::engine::Hub;

/// Floor for the first delay, so a zero setting cannot turn retries into a busy loop.
pub const MIN_BACKOFF: Duration = Duration::from_millis(1);

/// Exponential backoff between resubscribe attempts.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(MIN_BACKOFF);
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    pub fn from_settings(settings: &BrokerSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.retry_initial_ms),
            Duration::from_millis(settings.retry_max_ms),
        )
    }

    /// Delay to wait now; doubles the next one up to the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Broadcast everything published on `subscription` until it reports a
/// terminal error, whose reason is returned.
pub async fn run_intake_once(hub: &Hub, subscription: &mut Subscription) -> String {
    loop {
        match subscription.recv().await {
            BrokerItem::Published { channel, data } => {
                debug!(channel = %channel, bytes = data.len(), "broker message received");
                hub.broadcast(&data);
            }
            BrokerItem::Subscription {
                channel,
                kind,
                count,
            } => {
                info!(channel = %channel, kind = %kind, count, "subscription message");
            }
            BrokerItem::TerminalError(reason) => {
                error!(channel = %subscription.name(), reason = reason.as_str(), "error pub/sub, delivery has stopped");
                return reason;
            }
            BrokerItem::Other(what) => {
                debug!(item = %what, "pubsub received");
            }
        }
    }
}

/// Run the intake for the life of the process, starting from an already
/// established subscription. Never returns.
pub async fn run_intake(hub: Arc<Hub>, subscription: Subscription, mut backoff: Backoff) {
    let mut current = Some(subscription);

    loop {
        if let Some(mut subscription) = current.take() {
            hub.set_delivering(true);
            backoff.reset();
            run_intake_once(&hub, &mut subscription).await;
            hub.set_delivering(false);
        }

        let delay = backoff.next_delay();
        warn!(channel = %hub.channel(), ?delay, "resubscribing to broker");
        tokio::time::sleep(delay).await;

        match hub.subscribe().await {
            Ok(subscription) => {
                info!(channel = %hub.channel(), "broker subscription restored");
                current = Some(subscription);
            }
            Err(e) => {
                error!(channel = %hub.channel(), error = %e, "broker resubscribe failed");
            }
        }
    }
}
