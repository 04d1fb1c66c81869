//! Board module - flat-grid operations
//!
//! The grid is a flat sequence of cells in row-major order: index `i` maps
//! to column `i % width`, row `i / width`, with row 0 at the top. All
//! operations here are pure functions over that representation; the stepper
//! owns the surrounding bookkeeping (scores, chains, deals).
//!
//! Every mutation reports the block movements it caused as `(from, to)`
//! index pairs, in a deterministic order (columns left to right, bottom
//! up), so steppers can translate them into presentation effects without
//! re-deriving them.

use arrayvec::ArrayVec;

use crate::types::{Block, CLEAR_THRESHOLD, EMPTY, NUISANCE, SPAWN_COLUMN};

/// Outcome of clearing one resolution wave
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearSummary {
    /// Colored blocks removed this wave (nuisance not counted)
    pub cleared: usize,
    /// Size of each cleared group
    pub group_sizes: Vec<usize>,
    /// Number of distinct colors among the cleared groups
    pub colors: usize,
    /// Nuisance blocks removed by adjacency
    pub nuisance_cleared: usize,
}

/// Let every floating block fall until it rests on a filled cell or the
/// floor. Returns the movements performed. Applying this to an already
/// settled grid returns no movements and changes nothing.
pub fn apply_gravity(blocks: &mut [Block], width: usize) -> Vec<(usize, usize)> {
    let height = blocks.len() / width;
    let mut moves = Vec::new();
    for col in 0..width {
        let mut write_row = height;
        for row in (0..height).rev() {
            let idx = row * width + col;
            if blocks[idx] == EMPTY {
                continue;
            }
            write_row -= 1;
            let dst = write_row * width + col;
            if dst != idx {
                blocks[dst] = blocks[idx];
                blocks[idx] = EMPTY;
                moves.push((idx, dst));
            }
        }
    }
    moves
}

fn neighbors(index: usize, width: usize, len: usize) -> ArrayVec<usize, 4> {
    let mut out = ArrayVec::new();
    let col = index % width;
    if col > 0 {
        out.push(index - 1);
    }
    if col + 1 < width {
        out.push(index + 1);
    }
    if index >= width {
        out.push(index - width);
    }
    if index + width < len {
        out.push(index + width);
    }
    out
}

/// Find every 4-connected group of same-colored blocks at or above the
/// clearing threshold. Groups are returned with ascending cell indices,
/// ordered by their smallest index, which keeps downstream iteration
/// deterministic.
pub fn find_clear_groups(blocks: &[Block], width: usize) -> Vec<Vec<usize>> {
    let mut visited = vec![false; blocks.len()];
    let mut groups = Vec::new();
    for start in 0..blocks.len() {
        if visited[start] || blocks[start] <= EMPTY {
            continue;
        }
        let color = blocks[start];
        let mut group = vec![start];
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(index) = stack.pop() {
            for neighbor in neighbors(index, width, blocks.len()) {
                if !visited[neighbor] && blocks[neighbor] == color {
                    visited[neighbor] = true;
                    group.push(neighbor);
                    stack.push(neighbor);
                }
            }
        }
        if group.len() >= CLEAR_THRESHOLD {
            group.sort_unstable();
            groups.push(group);
        }
    }
    groups.sort_unstable_by_key(|group| group[0]);
    groups
}

/// Remove the given groups simultaneously, along with any nuisance block
/// adjacent to a cleared cell. Nuisance removed this way does not count
/// toward the scored block total.
pub fn clear_groups(
    blocks: &mut [Block],
    width: usize,
    groups: &[Vec<usize>],
) -> ClearSummary {
    let mut summary = ClearSummary::default();
    let mut color_seen = [false; 8];
    for group in groups {
        summary.group_sizes.push(group.len());
        summary.cleared += group.len();
        let color = blocks[group[0]];
        if color > EMPTY && !color_seen[color as usize] {
            color_seen[color as usize] = true;
            summary.colors += 1;
        }
        for &index in group {
            blocks[index] = EMPTY;
        }
    }
    for group in groups {
        for &index in group {
            for neighbor in neighbors(index, width, blocks.len()) {
                if blocks[neighbor] == NUISANCE {
                    blocks[neighbor] = EMPTY;
                    summary.nuisance_cleared += 1;
                }
            }
        }
    }
    summary
}

/// Check whether a payload of full rows can be laid over the top of the
/// grid: every non-empty payload cell must target an empty grid cell.
pub fn payload_fits(blocks: &[Block], payload: &[Block]) -> bool {
    payload.len() <= blocks.len()
        && payload
            .iter()
            .zip(blocks.iter())
            .all(|(&incoming, &cell)| incoming == EMPTY || cell == EMPTY)
}

/// Write a validated payload into the top rows of the grid.
/// Returns the target indices of the placed blocks.
pub fn place_payload(blocks: &mut [Block], payload: &[Block]) -> Vec<usize> {
    let mut placed = Vec::new();
    for (index, &incoming) in payload.iter().enumerate() {
        if incoming != EMPTY {
            blocks[index] = incoming;
            placed.push(index);
        }
    }
    placed
}

/// Drop `amount` nuisance blocks into the grid: full rows first, the
/// remainder into the leftmost columns. Blocks that no longer fit in their
/// column are discarded (the spawn-cell overflow check catches a board
/// that full). Returns the landing movements, `(top-of-column, landing)`.
pub fn add_nuisance(blocks: &mut [Block], width: usize, amount: usize) -> Vec<(usize, usize)> {
    let height = blocks.len() / width;
    let base = amount / width;
    let remainder = amount % width;
    let mut moves = Vec::new();
    for col in 0..width {
        let count = base + usize::from(col < remainder);
        for _ in 0..count {
            let landing = (0..height)
                .rev()
                .map(|row| row * width + col)
                .find(|&idx| blocks[idx] == EMPTY);
            if let Some(idx) = landing {
                blocks[idx] = NUISANCE;
                moves.push((col, idx));
            }
        }
    }
    moves
}

/// Overflow predicate: a block resting on the spawn cell means the stack
/// has reached the grid top and the board is dead (mode logic decides what
/// that implies).
pub fn is_overflowed(blocks: &[Block], _width: usize) -> bool {
    blocks[SPAWN_COLUMN] != EMPTY
}

/// Whether the current deal can still be played somewhere: a pair needs
/// either two free cells at the top of one column or the top cells of two
/// adjacent columns.
pub fn can_place_deal(blocks: &[Block], width: usize) -> bool {
    for col in 0..width {
        if blocks[col] == EMPTY && blocks[col + width] == EMPTY {
            return true;
        }
        if col + 1 < width && blocks[col] == EMPTY && blocks[col + 1] == EMPTY {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

    fn empty_grid() -> Vec<Block> {
        vec![EMPTY; BOARD_WIDTH * BOARD_HEIGHT]
    }

    fn bottom_index(col: usize, rows_up: usize) -> usize {
        (BOARD_HEIGHT - 1 - rows_up) * BOARD_WIDTH + col
    }

    #[test]
    fn gravity_drops_to_floor() {
        let mut blocks = empty_grid();
        blocks[2] = 1;
        let moves = apply_gravity(&mut blocks, BOARD_WIDTH);
        assert_eq!(moves, vec![(2, bottom_index(2, 0))]);
        assert_eq!(blocks[bottom_index(2, 0)], 1);
        assert_eq!(blocks[2], EMPTY);
    }

    #[test]
    fn gravity_is_idempotent_on_settled_grid() {
        let mut blocks = empty_grid();
        blocks[bottom_index(0, 0)] = 1;
        blocks[bottom_index(0, 1)] = 2;
        blocks[bottom_index(4, 0)] = NUISANCE;
        let before = blocks.clone();
        let moves = apply_gravity(&mut blocks, BOARD_WIDTH);
        assert!(moves.is_empty());
        assert_eq!(blocks, before);
    }

    #[test]
    fn gravity_preserves_column_order() {
        let mut blocks = empty_grid();
        // Column 1, floating with a gap: 1 above 2.
        blocks[BOARD_WIDTH + 1] = 1;
        blocks[3 * BOARD_WIDTH + 1] = 2;
        apply_gravity(&mut blocks, BOARD_WIDTH);
        assert_eq!(blocks[bottom_index(1, 0)], 2);
        assert_eq!(blocks[bottom_index(1, 1)], 1);
    }

    #[test]
    fn square_of_four_clears() {
        let mut blocks = empty_grid();
        for idx in [
            bottom_index(0, 0),
            bottom_index(1, 0),
            bottom_index(0, 1),
            bottom_index(1, 1),
        ] {
            blocks[idx] = 3;
        }
        let groups = find_clear_groups(&blocks, BOARD_WIDTH);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 4);
        let summary = clear_groups(&mut blocks, BOARD_WIDTH, &groups);
        assert_eq!(summary.cleared, 4);
        assert_eq!(summary.colors, 1);
        assert!(blocks.iter().all(|&cell| cell == EMPTY));
    }

    #[test]
    fn three_same_color_does_not_clear() {
        let mut blocks = empty_grid();
        for idx in [bottom_index(0, 0), bottom_index(1, 0), bottom_index(2, 0)] {
            blocks[idx] = 1;
        }
        assert!(find_clear_groups(&blocks, BOARD_WIDTH).is_empty());
    }

    #[test]
    fn diagonal_does_not_connect() {
        let mut blocks = empty_grid();
        // Checkerboard of one color: no 4-connected group.
        for idx in [
            bottom_index(0, 0),
            bottom_index(1, 1),
            bottom_index(2, 0),
            bottom_index(3, 1),
        ] {
            blocks[idx] = 2;
        }
        assert!(find_clear_groups(&blocks, BOARD_WIDTH).is_empty());
    }

    #[test]
    fn adjacent_nuisance_clears_without_scoring() {
        let mut blocks = empty_grid();
        for idx in [
            bottom_index(0, 0),
            bottom_index(1, 0),
            bottom_index(0, 1),
            bottom_index(1, 1),
        ] {
            blocks[idx] = 1;
        }
        blocks[bottom_index(2, 0)] = NUISANCE;
        blocks[bottom_index(4, 0)] = NUISANCE;
        let groups = find_clear_groups(&blocks, BOARD_WIDTH);
        let summary = clear_groups(&mut blocks, BOARD_WIDTH, &groups);
        assert_eq!(summary.cleared, 4);
        assert_eq!(summary.nuisance_cleared, 1);
        assert_eq!(blocks[bottom_index(2, 0)], EMPTY);
        // The far nuisance block is untouched.
        assert_eq!(blocks[bottom_index(4, 0)], NUISANCE);
    }

    #[test]
    fn simultaneous_groups_count_distinct_colors() {
        let mut blocks = empty_grid();
        for idx in [
            bottom_index(0, 0),
            bottom_index(0, 1),
            bottom_index(0, 2),
            bottom_index(0, 3),
        ] {
            blocks[idx] = 1;
        }
        for idx in [
            bottom_index(5, 0),
            bottom_index(5, 1),
            bottom_index(5, 2),
            bottom_index(5, 3),
        ] {
            blocks[idx] = 2;
        }
        let groups = find_clear_groups(&blocks, BOARD_WIDTH);
        assert_eq!(groups.len(), 2);
        let summary = clear_groups(&mut blocks, BOARD_WIDTH, &groups);
        assert_eq!(summary.cleared, 8);
        assert_eq!(summary.colors, 2);
        assert_eq!(summary.group_sizes, vec![4, 4]);
    }

    #[test]
    fn payload_overlap_detected() {
        let mut blocks = empty_grid();
        let mut payload = vec![EMPTY; BOARD_WIDTH];
        payload[0] = 1;
        payload[1] = 1;
        assert!(payload_fits(&blocks, &payload));
        blocks[1] = 2;
        assert!(!payload_fits(&blocks, &payload));
    }

    #[test]
    fn nuisance_fills_rows_then_leftmost() {
        let mut blocks = empty_grid();
        let moves = add_nuisance(&mut blocks, BOARD_WIDTH, BOARD_WIDTH + 2);
        assert_eq!(moves.len(), BOARD_WIDTH + 2);
        // One full bottom row.
        for col in 0..BOARD_WIDTH {
            assert_eq!(blocks[bottom_index(col, 0)], NUISANCE);
        }
        // Remainder lands in columns 0 and 1.
        assert_eq!(blocks[bottom_index(0, 1)], NUISANCE);
        assert_eq!(blocks[bottom_index(1, 1)], NUISANCE);
        assert_eq!(blocks[bottom_index(2, 1)], EMPTY);
    }

    #[test]
    fn nuisance_overflow_is_discarded() {
        let mut blocks = vec![1; BOARD_WIDTH * BOARD_HEIGHT];
        blocks[0] = EMPTY;
        let moves = add_nuisance(&mut blocks, BOARD_WIDTH, 3);
        // Only the single free cell receives a block.
        assert_eq!(moves.len(), 1);
        assert_eq!(blocks[0], NUISANCE);
    }

    #[test]
    fn overflow_checks_spawn_column() {
        let mut blocks = empty_grid();
        assert!(!is_overflowed(&blocks, BOARD_WIDTH));
        blocks[SPAWN_COLUMN] = 1;
        assert!(is_overflowed(&blocks, BOARD_WIDTH));
    }

    #[test]
    fn deal_placement_needs_two_cells() {
        let mut blocks = empty_grid();
        assert!(can_place_deal(&blocks, BOARD_WIDTH));
        // Fill everything except one top cell: no room for a pair.
        for cell in blocks.iter_mut() {
            *cell = 1;
        }
        blocks[0] = EMPTY;
        assert!(!can_place_deal(&blocks, BOARD_WIDTH));
        // Free the neighbor: a horizontal pair fits again.
        blocks[1] = EMPTY;
        assert!(can_place_deal(&blocks, BOARD_WIDTH));
    }
}
