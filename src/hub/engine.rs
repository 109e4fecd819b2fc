//! Hub engine
//!
//! The `Hub` ties the connection registry to the broker:
//! - clients publish through it (`publish` forwards to the broker channel)
//! - the intake loop hands it every broker message (`broadcast`)
//! - sessions register and deregister through it
//!
//! Concurrency notes:
//! - The registry lock is held only to copy the membership. A broadcast walks
//!   its snapshot, so a client registering mid-broadcast may or may not get
//!   the in-flight event.
//! - Writes go to each client's bounded outbound queue, drained by that
//!   client's own writer task, so one slow socket never holds up the rest of
//!   the pass. A client whose queue is full is treated like a closed one and
//!   dropped from the registry.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::Sender;
use tracing::{debug, error, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::{Broker, Subscription};
use crate::client::{Client, Registration};
use crate::hub::message::Event;
use crate::hub::registry::Registry;
use crate::utils::{HubError, Result};

#[derive(Debug)]
pub struct Hub {
    registry: Arc<Registry>,
    broker: Arc<dyn Broker>,
    channel: String,
    delivering: AtomicBool,
}

impl Hub {
    pub fn new(broker: Arc<dyn Broker>, channel: impl Into<String>) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            broker,
            channel: channel.into(),
            delivering: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The broker channel every client publishes to and the hub listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Register a new connection. The returned `Registration` removes it from
    /// the registry when dropped.
    pub fn register(&self, sender: Sender<WsMessage>) -> (Client, Registration) {
        let client = self.registry.register(sender);
        let registration = Registration::new(client.id.clone(), self.registry.clone());
        (client, registration)
    }

    /// Forward client-originated content to the broker channel.
    pub async fn publish(&self, content: &str) -> Result<()> {
        self.broker.publish(&self.channel, content).await
    }

    /// Open a subscription on the hub's channel.
    pub async fn subscribe(&self) -> Result<Subscription> {
        self.broker.subscribe(&self.channel).await
    }

    /// Deliver `content` to every registered connection, in registration order.
    ///
    /// A failed write is logged and the dead handle is dropped from the
    /// registry; delivery to the remaining connections carries on.
    pub fn broadcast(&self, content: &str) {
        let ws_msg = match Event::new(content).to_ws_message() {
            Ok(msg) => msg,
            Err(e) => {
                error!(error = %e, "failed to serialize event");
                return;
            }
        };

        let recipients = self.registry.snapshot();
        let mut delivered = 0usize;
        for client in &recipients {
            match client.send(ws_msg.clone()) {
                Ok(()) => {
                    delivered += 1;
                    debug!(client_id = %client.id, "message sent to client");
                }
                Err(e) => {
                    warn!(client_id = %client.id, error = %e, "error on message delivery");
                    self.registry.remove(&client.id);
                }
            }
        }
        debug!(recipients = recipients.len(), delivered, "broadcast complete");
    }

    /// Deliver `content` to a single connection by id.
    ///
    /// Not used by the broadcast path; kept for routing on an event's `id`.
    pub fn deliver_to_one(&self, client_id: &str, content: &str) -> Result<()> {
        let Some(client) = self.registry.get(client_id) else {
            warn!(client_id, "client not found in registry");
            return Err(HubError::NotFound {
                client_id: client_id.to_string(),
            });
        };

        let ws_msg = Event::new(content).to_ws_message()?;
        if let Err(e) = client.send(ws_msg) {
            warn!(client_id, error = %e, "error on message delivery");
            self.registry.remove(client_id);
            return Err(e);
        }
        debug!(client_id, "client found, message sent");
        Ok(())
    }

    /// True while the intake loop holds a working broker subscription.
    pub fn is_delivering(&self) -> bool {
        self.delivering.load(Ordering::SeqCst)
    }

    pub(crate) fn set_delivering(&self, delivering: bool) {
        self.delivering.store(delivering, Ordering::SeqCst);
    }
}
