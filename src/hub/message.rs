//! Event definition
//!
//! `Event` is the single message shape on the wire, in both directions:
//! `{ "id": <optional string>, "content": <string> }`.
//!
//! - `id`: delivery id. Carried through but not used for routing; broadcast
//!   events never set it and it is omitted from the encoded JSON when absent.
//! - `content`: the payload relayed through the broker. Required when decoding.

use serde::{Deserialize, Serialize};
use tungstenite::protocol::Message as WsMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<String>,
    pub content: String,
}

impl Event {
    /// An event with no delivery id, as produced by a broadcast.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            delivery_id: None,
            content: content.into(),
        }
    }

    pub fn to_ws_message(&self) -> Result<WsMessage, serde_json::Error> {
        serde_json::to_string(self).map(WsMessage::text)
    }

    /// Decode an inbound frame. Text and binary frames carry the same JSON.
    pub fn from_ws_message(msg: &WsMessage) -> Result<Self, serde_json::Error> {
        match msg {
            WsMessage::Text(text) => serde_json::from_str(text.as_str()),
            other => serde_json::from_slice(&other.clone().into_data()),
        }
    }
}
