//! Protocol module - JSON message types for the network adapter
//!
//! Implements the message vocabulary spoken between a client simulation
//! and the authoritative server engine. Message names match the wire
//! protocol: "connected" hands over the initial snapshot, "game event"
//! carries confirmed events, and "clock" publishes the authority time.

use serde::{Deserialize, Serialize};

use crate::types::Event;

/// Handshake payload sent once when a client joins a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    /// Player index assigned to this client.
    pub player: usize,
    /// Serialized engine snapshot to reconstruct the game from.
    pub game: serde_json::Value,
    /// Ticks per second the authority advances its clock at.
    pub frame_rate: u32,
}

/// Messages flowing from the authority to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// A confirmed event every client must apply at its scheduled time.
    #[serde(rename = "game event")]
    GameEvent { event: Event },
    /// The authority clock; clients step their simulation up to it.
    #[serde(rename = "clock")]
    Clock { time: u64 },
}

/// Messages flowing from a client to the authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// A locally produced event, proposed for confirmation.
    #[serde(rename = "game event")]
    GameEvent { event: Event },
}
