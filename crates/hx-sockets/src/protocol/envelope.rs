//! Inbound envelope format
//!
//! htmx's `ws` extension serializes the triggering element's form values
//! into a JSON object and nests the request headers under `HEADERS`:
//!
//! ```json
//! {
//!   "HEADERS": { "HX-Request": "true", "HX-Trigger": "toggle", "HX-Target": "toggle" },
//!   "state": true
//! }
//! ```
//!
//! Only `HX-Trigger` is interpreted here. The raw frame is handed to the
//! handler untouched, so applications decode the rest themselves.

use crate::error::{SocketError, SocketResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Headers htmx attaches to every websocket message
///
/// Embed this under `#[serde(rename = "HEADERS")]` in an application
/// message type when the fields are needed by a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HxHeaders {
    #[serde(rename = "HX-Request", default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,

    /// Id of the element that fired the event
    #[serde(rename = "HX-Trigger", default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,

    /// Name of the element that fired the event, null when it has none
    #[serde(rename = "HX-Trigger-Name", default, skip_serializing_if = "Option::is_none")]
    pub trigger_name: Option<String>,

    #[serde(rename = "HX-Target", default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(rename = "HX-Current-URL", default, skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
}

/// The part of an inbound message the dispatcher reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    #[serde(rename = "HEADERS", default)]
    pub headers: HxHeaders,
}

impl Envelope {
    /// Parse the headers out of a raw frame
    ///
    /// The frame must be a JSON object. A missing `HEADERS` key is accepted
    /// and yields an envelope without a trigger.
    pub fn parse(frame: &[u8]) -> SocketResult<Self> {
        let value: Value = serde_json::from_slice(frame)?;
        if !value.is_object() {
            return Err(SocketError::MalformedEnvelope(
                "envelope is not a JSON object".to_string(),
            ));
        }

        Ok(Self::deserialize(value)?)
    }

    /// Trigger name, `None` when missing or empty
    pub fn trigger(&self) -> Option<&str> {
        self.headers
            .trigger
            .as_deref()
            .filter(|trigger| !trigger.is_empty())
    }
}
