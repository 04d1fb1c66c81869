//! Adapter module - client-side mirror of a remote authoritative engine
//!
//! Implements the "connected" / "game event" / "clock" message protocol
//! and the `NetworkGameEngine` that replays confirmed events against a
//! local simulation.

pub mod adapter;
pub mod protocol;

// Re-export protocol types
pub use adapter::NetworkGameEngine;
pub use protocol::{ClientMessage, ConnectedMessage, ServerMessage};
