//! Engine module - tick loop, event queue, and mode steppers
//!
//! `GameEngine` owns the clock and the scheduled event queue; the
//! `Stepper` enum carries the per-mode rules (basic, endless, duel).

pub mod duel;
pub mod engine;
pub mod stepper;

// Re-export commonly used types
pub use engine::{EngineOptions, GameEngine};
pub use stepper::{random_puyos, DuelConfig, Stepper};
