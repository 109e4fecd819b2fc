//! # fanhub
//!
//! `fanhub` is a real-time fan-out hub. Clients connect over WebSockets and
//! every event published on a shared broker channel is delivered to every
//! connected client. Events sent by clients are published to that channel,
//! so they come back to everyone, the sender included.
//!
//! ## Core Modules
//!
//! - `hub`: the connection registry, the broadcast engine and the broker intake loop.
//! - `client`: the per-connection handle and its registration guard.
//! - `broker`: the pub/sub contract, with Redis and in-memory backends.
//! - `transport`: the WebSocket listener and the per-client session loop.
//! - `config`: layered settings from defaults, a config file and the environment.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod hub;
pub mod transport;
pub mod utils;
