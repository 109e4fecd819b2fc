//! The `client` module defines the hub's view of a connected client.
//!
//! - `Client`: the connection handle (id + outbound queue).
//! - `Registration`: deregisters the handle when the session ends.

pub mod pubsub_client;
pub mod registration;

pub use pubsub_client::Client;
pub use registration::Registration;
