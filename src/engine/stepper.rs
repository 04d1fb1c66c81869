//! Stepper module - per-mode rule sets behind one capability interface
//!
//! A stepper knows how to build a mode's initial state, apply a placement
//! event against it, and resolve one discrete tick. The set of modes is
//! closed: dispatch is a match on the [`Stepper`] variants, never an
//! open-ended lookup.
//!
//! Resolution performs at most one clearing wave per tick; a cascade
//! therefore spans several ticks, and the tick after its last wave is the
//! one that commits bonuses and resets the chain counters.

use crate::core::board;
use crate::core::scoring::{self, ALL_CLEAR_SCORE};
use crate::core::{BoardState, Effect, GameState, Jkiss31, Status};
use crate::types::{Block, Deal, Event, EventKind, GameMode, EMPTY, NUM_COLORS};

/// Match-ending configuration for duel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelConfig {
    /// Rounds a player may lose before the match ends
    pub max_losses: u32,
    /// Optional score race: first board at or past this total wins
    pub target_score: Option<u32>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            max_losses: 1,
            target_score: None,
        }
    }
}

/// Pluggable per-mode logic, one variant per game mode
#[derive(Debug, Clone, PartialEq)]
pub enum Stepper {
    /// Single board; overflow ends the game
    Basic,
    /// Single board; overflow resets the grid and play continues
    Endless,
    /// Two boards exchanging nuisance
    Duel(DuelConfig),
}

impl Stepper {
    /// The mode identifier this stepper implements
    pub fn mode(&self) -> GameMode {
        match self {
            Stepper::Basic => GameMode::Basic,
            Stepper::Endless => GameMode::Endless,
            Stepper::Duel(_) => GameMode::Duel,
        }
    }

    /// Build the initial state, drawing the opening deals from `rng`
    pub fn initial_state(&self, rng: &mut Jkiss31) -> GameState {
        let mut state = GameState::new(self.mode().player_count());
        replenish_deals(&mut state, rng);
        state
    }

    /// Apply a placement event. Returns `false` when the event is rejected
    /// (wrong player index, malformed payload, or occupied target cells);
    /// rejection leaves the state untouched.
    pub fn apply_event(&self, state: &mut GameState, event: &Event) -> bool {
        let EventKind::AddPuyos { blocks: payload } = &event.kind else {
            return false;
        };
        let Some(player) = self.event_player(event) else {
            return false;
        };
        if !payload_is_well_formed(state, payload) {
            return false;
        }
        let board = &mut state.boards[player];
        if !board::payload_fits(&board.blocks, payload) {
            return false;
        }
        board::place_payload(&mut board.blocks, payload);
        board.deal_index += 1;
        true
    }

    /// Advance one discrete tick: settle, match, score, exchange nuisance
    /// (duel), check termination, and replenish the deal queue.
    pub fn resolve_tick(&self, state: &mut GameState, rng: &mut Jkiss31) {
        match self {
            Stepper::Basic => resolve_single(state, false),
            Stepper::Endless => resolve_single(state, true),
            Stepper::Duel(config) => super::duel::resolve(state, config),
        }
        replenish_deals(state, rng);
    }

    /// Read-only predicate: can `player`'s current deal still be placed?
    pub fn can_play(&self, state: &GameState, player: usize) -> bool {
        state
            .boards
            .get(player)
            .map(|board| board::can_place_deal(&board.blocks, state.width))
            .unwrap_or(false)
    }

    /// Resolve the board index an event addresses, if it is valid for this
    /// mode. Single-board modes accept an absent player.
    fn event_player(&self, event: &Event) -> Option<usize> {
        let count = self.mode().player_count();
        match event.player {
            None if count == 1 => Some(0),
            Some(player) if player < count => Some(player),
            _ => None,
        }
    }
}

/// Settle and resolve one wave on a single board. Returns `true` on the
/// tick the board's cascade ends (chain counters are still set; the caller
/// commits the per-mode consequences).
pub(crate) fn resolve_board(board: &mut BoardState, width: usize) -> bool {
    let player = board.player;
    let moves = board::apply_gravity(&mut board.blocks, width);
    board
        .effects
        .extend(moves.into_iter().map(|(from, to)| Effect::PuyoDropped {
            player,
            from,
            to,
        }));
    let groups = board::find_clear_groups(&board.blocks, width);
    if !groups.is_empty() {
        board.chain_number += 1;
        let summary = board::clear_groups(&mut board.blocks, width, &groups);
        let score = scoring::wave_score(
            board.chain_number,
            summary.cleared,
            &summary.group_sizes,
            summary.colors,
        );
        board.chain_score = board.chain_score.saturating_add(score);
        board.total_score = board.total_score.saturating_add(score);
        if board.is_empty() {
            board.chain_all_clear_bonus = true;
        }
        return false;
    }
    board.chain_number > 0
}

fn resolve_single(state: &mut GameState, endless: bool) {
    let width = state.width;
    let board = &mut state.boards[0];
    if resolve_board(board, width) {
        // Cascade over: the all-clear bonus commits straight to the score
        // in single-board modes.
        if board.chain_all_clear_bonus {
            board.chain_all_clear_bonus = false;
            board.total_score = board.total_score.saturating_add(ALL_CLEAR_SCORE);
        }
        board.chain_number = 0;
        board.chain_score = 0;
    }
    if board::is_overflowed(&board.blocks, width) {
        if endless {
            log::debug!("endless board overflowed, resetting grid");
            board.reset_round();
        } else {
            log::info!("board overflowed, game over");
            state.status = Status::terminated(Some(0), "Game over");
        }
    }
}

/// Extend the shared deal queue until it covers every board's visible
/// window.
pub(crate) fn replenish_deals(state: &mut GameState, rng: &mut Jkiss31) {
    let furthest = state
        .boards
        .iter()
        .map(|board| board.deal_index)
        .max()
        .unwrap_or(0);
    while state.deals.len() < furthest + state.num_deals {
        state.deals.push(rng.next_deal());
    }
}

fn payload_is_well_formed(state: &GameState, payload: &[Block]) -> bool {
    let width = state.width;
    if payload.is_empty() || payload.len() % width != 0 || payload.len() > width * state.height {
        return false;
    }
    let mut filled = 0usize;
    for &cell in payload {
        if cell == EMPTY {
            continue;
        }
        if !(1..=NUM_COLORS).contains(&cell) {
            return false;
        }
        filled += 1;
    }
    // A placement delivers exactly one deal's pair.
    filled == 2
}

/// Generate a random placement payload for a deal: a horizontal pair in
/// one top row or a vertical pair spanning two rows. Used by bots and
/// tests to drive games the way real clients do.
pub fn random_puyos(rng: &mut Jkiss31, deal: Deal, width: usize) -> Vec<Block> {
    if rng.next_range(2) == 0 {
        let x = rng.next_range((width - 1) as u32) as usize;
        let mut row = vec![EMPTY; width];
        row[x] = deal[0];
        row[x + 1] = deal[1];
        row
    } else {
        let x = rng.next_range(width as u32) as usize;
        let mut rows = vec![EMPTY; 2 * width];
        rows[x] = deal[0];
        rows[x + width] = deal[1];
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BOARD_WIDTH, NUM_DEALS};

    fn endless_state(rng: &mut Jkiss31) -> GameState {
        Stepper::Endless.initial_state(rng)
    }

    fn fill_checkerboard(state: &mut GameState) {
        let width = state.width;
        for (index, cell) in state.boards[0].blocks.iter_mut().enumerate() {
            let row = index / width;
            let col = index % width;
            *cell = if (row + col) % 2 == 0 { 1 } else { 2 };
        }
    }

    #[test]
    fn initial_state_has_visible_deals() {
        let mut rng = Jkiss31::from_seed(5);
        let state = endless_state(&mut rng);
        assert_eq!(state.deals.len(), NUM_DEALS);
        assert_eq!(state.boards.len(), 1);
        assert_eq!(state.deal_for_player(0), Some(state.deals[0]));
    }

    #[test]
    fn accepted_placement_advances_deal_cursor() {
        let mut rng = Jkiss31::from_seed(5);
        let mut state = endless_state(&mut rng);
        let event = Event::add_puyos(0, None, vec![1, 1, 0, 0, 0, 0]);
        assert!(Stepper::Endless.apply_event(&mut state, &event));
        assert_eq!(state.boards[0].deal_index, 1);
    }

    #[test]
    fn occupied_target_cells_reject_as_noop() {
        let mut rng = Jkiss31::from_seed(5);
        let mut state = endless_state(&mut rng);
        state.boards[0].blocks[0] = 2;
        let before = state.clone();
        let event = Event::add_puyos(0, None, vec![1, 1, 0, 0, 0, 0]);
        assert!(!Stepper::Endless.apply_event(&mut state, &event));
        assert_eq!(state, before);
    }

    #[test]
    fn malformed_payloads_reject_as_noop() {
        let mut rng = Jkiss31::from_seed(5);
        let mut state = endless_state(&mut rng);
        let before = state.clone();
        let stepper = Stepper::Endless;
        // Wrong row length.
        let event = Event::add_puyos(0, None, vec![1, 1, 0]);
        assert!(!stepper.apply_event(&mut state, &event));
        // Too many blocks for one deal.
        let event = Event::add_puyos(0, None, vec![1, 1, 1, 0, 0, 0]);
        assert!(!stepper.apply_event(&mut state, &event));
        // Color out of range.
        let event = Event::add_puyos(0, None, vec![9, 9, 0, 0, 0, 0]);
        assert!(!stepper.apply_event(&mut state, &event));
        assert_eq!(state, before);
    }

    #[test]
    fn out_of_range_player_rejects() {
        let mut rng = Jkiss31::from_seed(5);
        let stepper = Stepper::Duel(DuelConfig::default());
        let mut state = stepper.initial_state(&mut rng);
        let event = Event::add_puyos(0, Some(2), vec![1, 1, 0, 0, 0, 0]);
        assert!(!stepper.apply_event(&mut state, &event));
        // Duel events must name a player.
        let event = Event::add_puyos(0, None, vec![1, 1, 0, 0, 0, 0]);
        assert!(!stepper.apply_event(&mut state, &event));
    }

    #[test]
    fn wave_resolution_scores_and_clears() {
        let mut rng = Jkiss31::from_seed(5);
        let mut state = endless_state(&mut rng);
        let board = &mut state.boards[0];
        let bottom = (state.height - 1) * state.width;
        for col in 0..3 {
            board.blocks[bottom + col] = 1;
        }
        // The fourth block starts floating and completes the group once
        // gravity settles it.
        board.blocks[3] = 1;
        Stepper::Endless.resolve_tick(&mut state, &mut rng);
        let board = &state.boards[0];
        assert_eq!(board.chain_number, 1);
        assert_eq!(board.chain_score, 80);
        assert_eq!(board.total_score, 80);
        assert!(board.is_empty());
        assert!(board.chain_all_clear_bonus);
    }

    #[test]
    fn cascade_end_commits_all_clear_score() {
        let mut rng = Jkiss31::from_seed(5);
        let mut state = endless_state(&mut rng);
        let board = &mut state.boards[0];
        board.chain_number = 2;
        board.chain_score = 400;
        board.total_score = 400;
        board.chain_all_clear_bonus = true;
        Stepper::Endless.resolve_tick(&mut state, &mut rng);
        let board = &state.boards[0];
        assert_eq!(board.chain_number, 0);
        assert_eq!(board.chain_score, 0);
        assert!(!board.chain_all_clear_bonus);
        assert!(!board.all_clear_bonus);
        assert_eq!(board.total_score, 400 + ALL_CLEAR_SCORE);
    }

    #[test]
    fn basic_overflow_terminates() {
        let mut rng = Jkiss31::from_seed(5);
        let mut state = Stepper::Basic.initial_state(&mut rng);
        // Checkerboard fill: full grid with no matching groups.
        fill_checkerboard(&mut state);
        Stepper::Basic.resolve_tick(&mut state, &mut rng);
        assert!(state.status.terminated);
        assert_eq!(state.status.loser, Some(0));
    }

    #[test]
    fn endless_overflow_resets_but_keeps_score() {
        let mut rng = Jkiss31::from_seed(5);
        let mut state = endless_state(&mut rng);
        state.boards[0].total_score = 990;
        fill_checkerboard(&mut state);
        Stepper::Endless.resolve_tick(&mut state, &mut rng);
        assert!(!state.status.terminated);
        assert!(state.boards[0].is_empty());
        assert_eq!(state.boards[0].total_score, 990);
    }

    #[test]
    fn random_puyos_deliver_the_deal() {
        let mut rng = Jkiss31::from_seed(5);
        for _ in 0..100 {
            let deal = rng.next_deal();
            let payload = random_puyos(&mut rng, deal, BOARD_WIDTH);
            assert_eq!(payload.len() % BOARD_WIDTH, 0);
            let mut filled: Vec<Block> =
                payload.iter().copied().filter(|&b| b != EMPTY).collect();
            let mut expected = deal.to_vec();
            filled.sort_unstable();
            expected.sort_unstable();
            assert_eq!(filled, expected);
        }
    }
}
