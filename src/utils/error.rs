//! Error types for the hub.
//!
//! Only configuration, listener and startup-subscription errors are allowed to
//! reach `main`. Everything scoped to one connection or one message is logged
//! and dropped where it happens.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HubError>;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("broker error: {0}")]
    Broker(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("connection {client_id} is closed")]
    Closed { client_id: String },

    #[error("connection {client_id} is not keeping up, outbound queue full")]
    Lagging { client_id: String },

    #[error("connection {client_id} not found")]
    NotFound { client_id: String },
}

impl From<redis::RedisError> for HubError {
    fn from(err: redis::RedisError) -> Self {
        HubError::Broker(err.to_string())
    }
}
