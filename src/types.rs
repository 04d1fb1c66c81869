//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the simulation
//! core. All types are pure data with no behavior beyond parsing/formatting,
//! making them usable in any context (core logic, engine, network adapter).
//!
//! # Board Dimensions
//!
//! Standard puyo playfield dimensions:
//!
//! - **Width**: 6 columns (indexed 0-5)
//! - **Height**: 12 rows (indexed 0-11, row 0 at the top)
//! - **Spawn column**: 2 (a block resting on its top cell means overflow)
//!
//! # Cell Encoding
//!
//! Cells are stored as `i8`:
//!
//! | Value | Meaning |
//! |-------|---------|
//! | `0` | empty |
//! | `1..=4` | colored puyo |
//! | `-1` | nuisance puyo |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Board width in cells (6 columns)
pub const BOARD_WIDTH: usize = 6;

/// Board height in cells (12 rows)
pub const BOARD_HEIGHT: usize = 12;

/// Column whose top cell decides overflow (the piece spawn column)
pub const SPAWN_COLUMN: usize = 2;

/// Number of distinct puyo colors
pub const NUM_COLORS: i8 = 4;

/// Number of upcoming deals visible to a player
pub const NUM_DEALS: usize = 3;

/// Minimum connected group size that clears
pub const CLEAR_THRESHOLD: usize = 4;

/// Cell value for an empty cell
pub const EMPTY: Block = 0;

/// Cell value for a nuisance puyo
pub const NUISANCE: Block = -1;

/// A single cell of the grid (see module docs for the encoding)
pub type Block = i8;

/// One upcoming piece group: a pair of colors, dealt in order
pub type Deal = [Block; 2];

/// Game mode identifiers recognized by the engine
///
/// The wire names (`"puyo:basic"` etc.) are what session layers put in the
/// engine construction options and what serialized snapshots carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    #[serde(rename = "puyo:basic")]
    Basic,
    #[serde(rename = "puyo:endless")]
    Endless,
    #[serde(rename = "puyo:duel")]
    Duel,
}

impl GameMode {
    /// Parse a mode identifier string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "puyo:basic" => Some(GameMode::Basic),
            "puyo:endless" => Some(GameMode::Endless),
            "puyo:duel" => Some(GameMode::Duel),
            _ => None,
        }
    }

    /// The wire identifier for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Basic => "puyo:basic",
            GameMode::Endless => "puyo:endless",
            GameMode::Duel => "puyo:duel",
        }
    }

    /// Number of boards this mode simulates
    pub fn player_count(&self) -> usize {
        match self {
            GameMode::Basic | GameMode::Endless => 1,
            GameMode::Duel => 2,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific payload of an [`Event`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    /// Deliver a piece-group placement: `blocks` is a whole number of rows
    /// laid over the top of the target board, containing the deal's blocks.
    #[serde(rename = "addPuyos")]
    AddPuyos { blocks: Vec<Block> },
    /// Force the end of the game, naming the losing side via `player`.
    #[serde(rename = "termination")]
    Termination { reason: String },
}

/// A time-stamped input to the simulation
///
/// Events become eligible for application once the engine's `step()`
/// reaches their tick. `player` attributes the event to a board; single
/// board modes accept events without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<usize>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Convenience constructor for a placement event
    pub fn add_puyos(time: u64, player: Option<usize>, blocks: Vec<Block>) -> Self {
        Self {
            time,
            player,
            kind: EventKind::AddPuyos { blocks },
        }
    }

    /// Convenience constructor for a forced termination
    pub fn termination(time: u64, player: usize, reason: impl Into<String>) -> Self {
        Self {
            time,
            player: Some(player),
            kind: EventKind::Termination {
                reason: reason.into(),
            },
        }
    }
}

/// Errors surfaced by the engine to its driving layer
///
/// Malformed events are deliberately *not* represented here: they are
/// rejected as no-ops so the engine stays live for the rest of the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An event was queued for a tick that `step()` already resolved.
    /// This indicates a logic bug in the driving layer (e.g. upstream
    /// reordering), so it is surfaced instead of silently dropped.
    LateEvent { event_time: u64, current_time: u64 },
    /// `unserialize` was given data from an incompatible mode or format
    /// version. The engine cannot be safely constructed from it.
    IncompatibleSnapshot(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::LateEvent {
                event_time,
                current_time,
            } => write!(
                f,
                "event for tick {event_time} is late: engine already at tick {current_time}"
            ),
            EngineError::IncompatibleSnapshot(reason) => {
                write!(f, "incompatible snapshot: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
