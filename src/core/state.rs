//! State module - the snapshot a single `step()` produces
//!
//! State is a value: the engine derives each tick's snapshot from the
//! previous one, so prior snapshots stay valid for diffing and animation.
//! Field names serialize in camelCase to match the wire format consumed by
//! remote replicas.

use serde::{Deserialize, Serialize};

use crate::types::{Block, Deal, BOARD_HEIGHT, BOARD_WIDTH, EMPTY};

/// Terminal outcome of a game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub terminated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loser: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl Status {
    /// A terminal status naming the losing side (or none, for a draw)
    pub fn terminated(loser: Option<usize>, result: impl Into<String>) -> Self {
        Self {
            terminated: true,
            loser,
            result: Some(result.into()),
        }
    }
}

/// A discrete, presentation-relevant occurrence produced by one tick
///
/// Effects are purely observational: presentation layers consume them, the
/// simulation never replays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    /// A block moved from one cell index to another while settling
    #[serde(rename = "puyoDropped")]
    PuyoDropped {
        player: usize,
        from: usize,
        to: usize,
    },
}

impl Effect {
    /// The board the effect belongs to
    pub fn player(&self) -> usize {
        match self {
            Effect::PuyoDropped { player, .. } => *player,
        }
    }

    /// Rebind the effect to another board index (used when checking the
    /// duel mirror property, never by the simulation itself)
    pub fn with_player(&self, player: usize) -> Self {
        match self {
            Effect::PuyoDropped { from, to, .. } => Effect::PuyoDropped {
                player,
                from: *from,
                to: *to,
            },
        }
    }
}

/// Snapshot of one board's contents and score bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    /// Index of the owning player (0 or 1)
    pub player: usize,
    /// Flat grid, row-major, row 0 at the top
    pub blocks: Vec<Block>,
    /// Cursor into the shared deal queue
    pub deal_index: usize,
    /// Chain position within the currently resolving cascade (0 = idle)
    pub chain_number: u32,
    /// Score contribution of the currently resolving cascade
    pub chain_score: u32,
    /// Cumulative score for this board
    pub total_score: u32,
    /// Committed all-clear bonus, pending conversion (duel mode)
    pub all_clear_bonus: bool,
    /// Provisional flag: the board emptied mid-cascade
    pub chain_all_clear_bonus: bool,
    /// Nuisance owed to this board, buffered until its chains settle
    pub pending_nuisance: u32,
    /// Chain score below one nuisance unit, carried to the next conversion
    pub nuisance_carry: u32,
    /// Rounds lost so far (duel mode)
    pub losses: u32,
    /// Effects produced by the most recent tick
    pub effects: Vec<Effect>,
}

impl BoardState {
    /// Fresh board for the given player
    pub fn new(player: usize) -> Self {
        Self {
            player,
            blocks: vec![EMPTY; BOARD_WIDTH * BOARD_HEIGHT],
            deal_index: 0,
            chain_number: 0,
            chain_score: 0,
            total_score: 0,
            all_clear_bonus: false,
            chain_all_clear_bonus: false,
            pending_nuisance: 0,
            nuisance_carry: 0,
            losses: 0,
            effects: Vec::new(),
        }
    }

    /// Reset the grid and cascade bookkeeping for a new round, keeping
    /// cumulative score, losses and the deal cursor.
    pub fn reset_round(&mut self) {
        for cell in self.blocks.iter_mut() {
            *cell = EMPTY;
        }
        self.chain_number = 0;
        self.chain_score = 0;
        self.all_clear_bonus = false;
        self.chain_all_clear_bonus = false;
        self.pending_nuisance = 0;
        self.nuisance_carry = 0;
    }

    /// Whether every cell is empty
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&cell| cell == EMPTY)
    }
}

/// Snapshot of a whole game at one tick: shared clock, deal queue, status
/// and one board per player (two in duel mode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub time: u64,
    pub width: usize,
    pub height: usize,
    /// Upcoming deals visible/reserved per board
    pub num_deals: usize,
    /// Shared piece sequence; boards index into it with their cursors
    pub deals: Vec<Deal>,
    pub status: Status,
    /// `childStates` of duel mode; a single entry in single-board modes
    pub boards: Vec<BoardState>,
}

impl GameState {
    /// Fresh state with `players` empty boards and no deals yet
    pub fn new(players: usize) -> Self {
        Self {
            time: 0,
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            num_deals: crate::types::NUM_DEALS,
            deals: Vec::new(),
            status: Status::default(),
            boards: (0..players).map(BoardState::new).collect(),
        }
    }

    /// The deal a player's cursor currently points at
    pub fn deal_for_player(&self, player: usize) -> Option<Deal> {
        let board = self.boards.get(player)?;
        self.deals.get(board.deal_index).copied()
    }

    /// All effects produced by the most recent tick, across boards
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.boards.iter().flat_map(|board| board.effects.iter())
    }
}
