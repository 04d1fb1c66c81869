//! Core module - pure simulation logic with no I/O
//!
//! Everything here is deterministic computation over in-memory values:
//! the seedable RNG, flat-grid board operations, scoring tables and the
//! snapshot state model. The engine layer orchestrates these pieces.

pub mod board;
pub mod rng;
pub mod scoring;
pub mod state;

pub use rng::Jkiss31;
pub use state::{BoardState, Effect, GameState, Status};
