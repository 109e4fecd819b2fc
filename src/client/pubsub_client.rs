//! Client representation
//!
//! `Client` is the hub's handle for one connection: a process-unique id and
//! the sending side of that connection's bounded outbound queue. The transport
//! owns the receiving side and drains it into the socket, so writing through a
//! `Client` never waits on the peer. A peer that stops reading fills its queue
//! and from then on looks the same as one that has gone away.

use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::utils::{HubError, Result};

#[derive(Debug, Clone)]
pub struct Client {
    pub id: String,
    pub sender: Sender<WsMessage>,
}

impl Client {
    /// Create a new client with a fresh UUID. Ids are never reused, even for
    /// the same underlying socket registered twice.
    pub fn new(sender: Sender<WsMessage>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
        }
    }

    /// Queue a frame for this connection without waiting. Fails once the
    /// writer side is gone or the queue is full.
    pub fn send(&self, msg: WsMessage) -> Result<()> {
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => HubError::Lagging {
                client_id: self.id.clone(),
            },
            TrySendError::Closed(_) => HubError::Closed {
                client_id: self.id.clone(),
            },
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
