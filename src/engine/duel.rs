//! Duel module - two-board resolution with cross-board nuisance transfer
//!
//! Each board resolves its cascades independently; this module wires the
//! boards together: score-to-nuisance conversion at cascade end, mutual
//! offsetting so simultaneous equal sends cancel exactly (required for the
//! mirror-symmetry property), gated delivery, and match termination.
//!
//! Nothing here consumes the engine RNG, and every pairwise computation is
//! written symmetrically in the board index, so feeding player-swapped
//! event streams yields mirror-identical results.

use crate::core::board;
use crate::core::scoring::{
    score_to_nuisance, ALL_CLEAR_NUISANCE, MAX_NUISANCE_ROWS,
};
use crate::core::{Effect, GameState, Status};

use super::stepper::{resolve_board, DuelConfig};

pub(crate) fn resolve(state: &mut GameState, config: &DuelConfig) {
    let width = state.width;

    // Delivery runs first, so nuisance exchanged later this tick waits at
    // least one tick before landing. The gate is the receiving board's
    // chain counter from the previous tick: a board mid-cascade receives
    // nothing.
    for board in state.boards.iter_mut() {
        if board.chain_number > 0 || board.pending_nuisance == 0 {
            continue;
        }
        let cap = (width * MAX_NUISANCE_ROWS) as u32;
        let amount = board.pending_nuisance.min(cap);
        board.pending_nuisance -= amount;
        let player = board.player;
        let moves = board::add_nuisance(&mut board.blocks, width, amount as usize);
        board
            .effects
            .extend(moves.into_iter().map(|(from, to)| Effect::PuyoDropped {
                player,
                from,
                to,
            }));
    }

    // Independent per-board resolution; completed cascades convert their
    // score into outgoing nuisance units.
    let mut sent = [0u32; 2];
    for (index, board) in state.boards.iter_mut().enumerate() {
        if resolve_board(board, width) {
            let (mut units, carry) = score_to_nuisance(board.chain_score, board.nuisance_carry);
            board.nuisance_carry = carry;
            if board.all_clear_bonus {
                board.all_clear_bonus = false;
                units += ALL_CLEAR_NUISANCE;
            }
            if board.chain_all_clear_bonus {
                board.chain_all_clear_bonus = false;
                board.all_clear_bonus = true;
            }
            board.chain_number = 0;
            board.chain_score = 0;
            sent[index] = units;
        }
    }

    // Outgoing nuisance first offsets the sender's own pending amount.
    let mut outgoing = [0u32; 2];
    for (index, board) in state.boards.iter_mut().enumerate() {
        let cancelled = sent[index].min(board.pending_nuisance);
        board.pending_nuisance -= cancelled;
        outgoing[index] = sent[index] - cancelled;
    }
    // Simultaneous sends cancel against each other; only the net
    // difference reaches the opponent.
    state.boards[1].pending_nuisance += outgoing[0].saturating_sub(outgoing[1]);
    state.boards[0].pending_nuisance += outgoing[1].saturating_sub(outgoing[0]);

    if let Some(target) = config.target_score {
        let reached = [
            state.boards[0].total_score >= target,
            state.boards[1].total_score >= target,
        ];
        match reached {
            [true, true] => {
                state.status = Status::terminated(None, "Draw");
                return;
            }
            [true, false] => {
                state.status = Status::terminated(Some(1), "Target score reached");
                return;
            }
            [false, true] => {
                state.status = Status::terminated(Some(0), "Target score reached");
                return;
            }
            [false, false] => {}
        }
    }

    let overflowed = [
        board::is_overflowed(&state.boards[0].blocks, width),
        board::is_overflowed(&state.boards[1].blocks, width),
    ];
    if overflowed == [false, false] {
        return;
    }
    for (index, board) in state.boards.iter_mut().enumerate() {
        if overflowed[index] {
            board.losses += 1;
        }
    }
    let out = [
        state.boards[0].losses >= config.max_losses,
        state.boards[1].losses >= config.max_losses,
    ];
    match out {
        [true, true] => {
            log::info!("both players out of rounds, draw");
            state.status = Status::terminated(None, "Draw");
        }
        [true, false] => {
            state.status = Status::terminated(Some(0), "Game over");
        }
        [false, true] => {
            state.status = Status::terminated(Some(1), "Game over");
        }
        [false, false] => {
            // Round lost but match continues: both grids restart.
            log::debug!("round over, resetting boards");
            for board in state.boards.iter_mut() {
                board.reset_round();
            }
        }
    }
}
