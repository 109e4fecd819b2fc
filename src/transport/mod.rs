//! The `transport` module handles network communication with clients over
//! WebSockets: the listener, the upgrade on the configured path, and the
//! per-connection session loop that feeds client events to the broker.
//! [`run`] is the bootstrap that wires the hub's broker intake to the listener.

pub mod websocket;

pub use websocket::{SessionEnd, run, run_session, serve, start_websocket_server};
