//! Host message codec.
//!
//! Inbound: `{ "type": "update_config", "config": { ...partial config... } }`.
//! Outbound: `{ "type": "viewer_ready" }`, at most once per initialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ConfigUpdate;
use crate::error::ConfigError;

pub const UPDATE_CONFIG: &str = "update_config";
pub const VIEWER_READY: &str = "viewer_ready";

#[derive(Clone, Debug, PartialEq)]
pub enum InboundMessage {
    /// `warnings` lists the fields that were dropped while decoding.
    UpdateConfig {
        update: ConfigUpdate,
        warnings: Vec<ConfigError>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    ViewerReady,
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    config: Option<Value>,
}

/// Decode a host message.
///
/// Messages of any other type are `None`; pages commonly share their
/// message channel with other scripts.
pub fn parse_inbound(value: Value) -> Option<InboundMessage> {
    let envelope: Envelope = serde_json::from_value(value).ok()?;
    match envelope.kind.as_deref() {
        Some(UPDATE_CONFIG) => {
            let (update, warnings) =
                ConfigUpdate::from_value(envelope.config.unwrap_or(Value::Null));
            Some(InboundMessage::UpdateConfig { update, warnings })
        }
        _ => None,
    }
}

pub fn parse_inbound_str(json: &str) -> Result<Option<InboundMessage>, ConfigError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ConfigError::MalformedMessage(e.to_string()))?;
    Ok(parse_inbound(value))
}

/// One-shot latch for the readiness signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadyLatch {
    fired: bool,
}

impl ReadyLatch {
    /// True exactly once.
    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    #[inline]
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
