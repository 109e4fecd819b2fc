//! The hub: connection registry, broadcast engine and broker intake.
//!
//! - `Registry`: the guarded set of live connection handles.
//! - `Hub`: registers connections, forwards client publishes to the broker
//!   and fans broker messages out to every connection.
//! - `intake`: the long-running loop feeding broker messages into `Hub::broadcast`.

pub mod engine;
pub mod intake;
pub mod message;
pub mod registry;

pub use engine::Hub;
pub use message::Event;
pub use registry::Registry;
