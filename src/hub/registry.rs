//! Connection registry
//!
//! The set of live connection handles, kept in registration order behind a
//! single mutex. Every structural operation takes the lock for just that
//! operation; broadcast works on a [`Registry::snapshot`] so no lock is held
//! while frames are being queued.
//!
//! Registry operations never fail the caller. A poisoned lock is recovered,
//! since the membership list is valid after any panic that could poison it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::Sender;
use tungstenite::protocol::Message as WsMessage;

use crate::client::Client;

#[derive(Debug, Default)]
pub struct Registry {
    entries: Mutex<Vec<Client>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle with a fresh id for `sender` and add it to the set.
    pub fn register(&self, sender: Sender<WsMessage>) -> Client {
        let client = Client::new(sender);
        self.entries().push(client.clone());
        client
    }

    /// Point-in-time copy of the membership, in registration order.
    pub fn snapshot(&self) -> Vec<Client> {
        self.entries().clone()
    }

    /// Remove the handle with `client_id`. Returns whether it was present;
    /// removing an unknown or already-removed id is a no-op.
    pub fn remove(&self, client_id: &str) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|c| c.id != client_id);
        entries.len() != before
    }

    pub fn get(&self, client_id: &str) -> Option<Client> {
        self.entries().iter().find(|c| c.id == client_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Client>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
