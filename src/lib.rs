//! Deterministic puyo simulation core.
//!
//! The crate is split the same way the process is split in production:
//! `core` holds the pure game rules (grid physics, chain scoring, the
//! shared RNG), `engine` drives them tick by tick from a scheduled event
//! queue, and `adapter` mirrors a remote authoritative engine over a
//! message transport.
//!
//! Every operation is deterministic: two engines built from the same
//! snapshot and fed the same events produce identical state sequences,
//! which is what lets clients simulate locally and reconcile against the
//! server.

pub mod adapter;
pub mod core;
pub mod engine;
pub mod types;

pub use engine::{EngineOptions, GameEngine};
pub use types::GameMode;
