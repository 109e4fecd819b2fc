//! Registration guard
//!
//! Ties a connection's registry entry to the lifetime of its session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::hub::registry::Registry;

/// Keeps a connection registered for as long as it is alive.
///
/// Dropping it (or calling [`Registration::release`]) removes the handle from
/// the registry exactly once, whichever of the session's exit paths gets
/// there first.
#[derive(Debug)]
pub struct Registration {
    client_id: String,
    registry: Arc<Registry>,
    released: AtomicBool,
}

impl Registration {
    pub(crate) fn new(client_id: String, registry: Arc<Registry>) -> Self {
        Self {
            client_id,
            registry,
            released: AtomicBool::new(false),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.registry.remove(&self.client_id);
            info!(client_id = %self.client_id, "client deregistered");
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}
