//! Engine module - event queue, tick loop and whole-engine serialization
//!
//! The engine owns the current snapshot, the pending event queue (keyed by
//! the tick each event applies to) and the active stepper. `step()` is the
//! sole mutator of simulation state: it applies the current tick's events,
//! runs the stepper's resolution, advances the clock by one and returns the
//! new snapshot as a value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{GameState, Jkiss31, Status};
use crate::types::{EngineError, Event, EventKind, GameMode, BOARD_HEIGHT, BOARD_WIDTH};

use super::stepper::{DuelConfig, Stepper};

/// Serialization format version; bumped on any incompatible change
const SERIAL_VERSION: u32 = 1;

/// Recognized engine construction options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOptions {
    /// Mode identifier selecting basic/endless/duel logic
    pub stepper: GameMode,
    /// Duel only: rounds a player may lose before the match ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_losses: Option<u32>,
    /// Duel only: first board at or past this total score wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_score: Option<u32>,
}

impl EngineOptions {
    /// Options for a mode with no match-ending tweaks
    pub fn mode(stepper: GameMode) -> Self {
        Self {
            stepper,
            max_losses: None,
            target_score: None,
        }
    }

    fn build_stepper(&self) -> Stepper {
        match self.stepper {
            GameMode::Basic => Stepper::Basic,
            GameMode::Endless => Stepper::Endless,
            GameMode::Duel => {
                let defaults = DuelConfig::default();
                Stepper::Duel(DuelConfig {
                    max_losses: self.max_losses.unwrap_or(defaults.max_losses),
                    target_score: self.target_score,
                })
            }
        }
    }
}

/// The deterministic simulation engine for one match
#[derive(Debug, Clone)]
pub struct GameEngine {
    options: EngineOptions,
    stepper: Stepper,
    rng: Jkiss31,
    state: GameState,
    events: BTreeMap<u64, Vec<Event>>,
}

/// On-the-wire shape of a serialized engine
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedEngine {
    version: u32,
    options: EngineOptions,
    rng: [u32; 4],
    state: GameState,
    events: Vec<Event>,
}

impl GameEngine {
    /// Create an authority engine with an unpredictable seed
    pub fn new(options: EngineOptions) -> Self {
        let mut rng = Jkiss31::new();
        rng.scramble();
        Self::with_rng(options, rng)
    }

    /// Create a fully deterministic engine from a seed (tests, fixed
    /// replays)
    pub fn with_seed(options: EngineOptions, seed: u32) -> Self {
        Self::with_rng(options, Jkiss31::from_seed(seed))
    }

    fn with_rng(options: EngineOptions, mut rng: Jkiss31) -> Self {
        let stepper = options.build_stepper();
        let state = stepper.initial_state(&mut rng);
        Self {
            options,
            stepper,
            rng,
            state,
            events: BTreeMap::new(),
        }
    }

    /// The mode this engine simulates
    pub fn mode(&self) -> GameMode {
        self.stepper.mode()
    }

    /// Current tick counter
    pub fn time(&self) -> u64 {
        self.state.time
    }

    /// Current snapshot (the initial state before the first `step()`)
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Read-only mode predicate: can `player`'s current deal still be
    /// placed?
    pub fn can_play(&self, player: usize) -> bool {
        self.stepper.can_play(&self.state, player)
    }

    /// Queue an event under its declared tick.
    ///
    /// Events for a tick `step()` already resolved are a usage error in
    /// the driving layer and surface as [`EngineError::LateEvent`]. After
    /// termination, queuing is an accepted no-op so drivers need no
    /// special-casing.
    pub fn add_event(&mut self, event: Event) -> Result<(), EngineError> {
        if self.state.status.terminated {
            return Ok(());
        }
        if event.time < self.state.time {
            log::warn!(
                "late event for tick {} at tick {}",
                event.time,
                self.state.time
            );
            return Err(EngineError::LateEvent {
                event_time: event.time,
                current_time: self.state.time,
            });
        }
        self.events.entry(event.time).or_default().push(event);
        Ok(())
    }

    /// Advance one tick and return the new snapshot.
    ///
    /// A termination event freezes the clock: the returned state keeps the
    /// tick the event named, and every later `step()` returns the terminal
    /// snapshot unchanged.
    pub fn step(&mut self) -> GameState {
        if self.state.status.terminated {
            return self.state.clone();
        }
        let mut next = self.state.clone();
        for board in next.boards.iter_mut() {
            board.effects.clear();
        }
        for event in self.events.remove(&next.time).unwrap_or_default() {
            match &event.kind {
                EventKind::Termination { reason } => {
                    let loser = event
                        .player
                        .filter(|&player| player < next.boards.len());
                    log::info!("terminated at tick {}: {}", next.time, reason);
                    next.status = Status::terminated(loser, reason.clone());
                    self.state = next;
                    return self.state.clone();
                }
                EventKind::AddPuyos { .. } => {
                    if !self.stepper.apply_event(&mut next, &event) {
                        log::debug!("rejected event at tick {}: {:?}", next.time, event);
                    }
                }
            }
        }
        self.stepper.resolve_tick(&mut next, &mut self.rng);
        next.time += 1;
        self.state = next;
        self.state.clone()
    }

    /// Produce an exact, self-describing snapshot of the whole engine:
    /// mode configuration, RNG state, board state and pending events.
    pub fn serialize(&self) -> serde_json::Value {
        let serialized = SerializedEngine {
            version: SERIAL_VERSION,
            options: self.options.clone(),
            rng: self.rng.serialize(),
            state: self.state.clone(),
            events: self.events.values().flatten().cloned().collect(),
        };
        serde_json::to_value(serialized).expect("engine state is always representable as JSON")
    }

    /// Reconstruct an engine whose future `step()` sequence is
    /// indistinguishable from the serialized one's.
    pub fn unserialize(data: &serde_json::Value) -> Result<Self, EngineError> {
        let parsed: SerializedEngine = serde_json::from_value(data.clone())
            .map_err(|err| EngineError::IncompatibleSnapshot(err.to_string()))?;
        if parsed.version != SERIAL_VERSION {
            return Err(EngineError::IncompatibleSnapshot(format!(
                "format version {} (expected {})",
                parsed.version, SERIAL_VERSION
            )));
        }
        if parsed.state.width != BOARD_WIDTH || parsed.state.height != BOARD_HEIGHT {
            return Err(EngineError::IncompatibleSnapshot(format!(
                "{}x{} grid (expected {}x{})",
                parsed.state.width, parsed.state.height, BOARD_WIDTH, BOARD_HEIGHT
            )));
        }
        let expected_boards = parsed.options.stepper.player_count();
        if parsed.state.boards.len() != expected_boards {
            return Err(EngineError::IncompatibleSnapshot(format!(
                "{} boards in a {} snapshot",
                parsed.state.boards.len(),
                parsed.options.stepper
            )));
        }
        let cells = parsed.state.width * parsed.state.height;
        if parsed
            .state
            .boards
            .iter()
            .any(|board| board.blocks.len() != cells)
        {
            return Err(EngineError::IncompatibleSnapshot(
                "board size does not match grid dimensions".to_string(),
            ));
        }
        let stepper = parsed.options.build_stepper();
        let mut events: BTreeMap<u64, Vec<Event>> = BTreeMap::new();
        for event in parsed.events {
            events.entry(event.time).or_default().push(event);
        }
        Ok(Self {
            stepper,
            options: parsed.options,
            rng: Jkiss31::unserialize(parsed.rng),
            state: parsed.state,
            events,
        })
    }
}
