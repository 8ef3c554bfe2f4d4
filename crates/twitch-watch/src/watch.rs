//! The `minute-watched` presence payload.
//!
//! The spade endpoint takes a form field `data` holding the base64 of a
//! compact JSON array of events.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const MINUTE_WATCHED: &str = "minute-watched";
pub const PLAYER: &str = "site";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEvent {
    pub event: String,
    pub properties: WatchProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchProperties {
    pub channel_id: u64,
    pub broadcast_id: u64,
    pub player: String,
    pub user_id: u64,
}

impl WatchEvent {
    pub fn minute_watched(channel_id: u64, broadcast_id: u64, user_id: u64) -> Self {
        Self {
            event: MINUTE_WATCHED.to_string(),
            properties: WatchProperties {
                channel_id,
                broadcast_id,
                player: PLAYER.to_string(),
                user_id,
            },
        }
    }
}

/// Serializes `events` to compact JSON and base64-encodes it.
pub fn encode_payload(events: &[WatchEvent]) -> Result<String> {
    let json = serde_json::to_vec(events)?;
    Ok(STANDARD.encode(json))
}

pub fn decode_payload(data: &str) -> Result<Vec<WatchEvent>> {
    let json = STANDARD.decode(data)?;
    Ok(serde_json::from_slice(&json)?)
}
