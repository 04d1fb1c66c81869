//! Scoring module - chain scoring tables and nuisance conversion
//!
//! A resolution wave scores
//! `10 * cleared * clamp(chain_power + color_bonus + group_bonus, 1, 999)`.
//! The coefficient tables are an explicit per-mode configuration, pinned by
//! unit tests to the reference behavior: a plain first-wave clear of one
//! 4-group scores 80, the second wave of the same cascade scores 320.

/// Chain power by chain position (index 0 = first wave of a cascade)
pub const CHAIN_POWERS: [u32; 19] = [
    2, 8, 16, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 480, 512,
];

/// Bonus for clearing multiple colors in one wave (index = colors - 1)
pub const COLOR_BONUSES: [u32; 5] = [0, 3, 6, 12, 24];

/// Bonus per cleared group by size (index 0 = size 4; larger groups use
/// the last entry)
pub const GROUP_BONUSES: [u32; 8] = [0, 2, 3, 4, 5, 6, 7, 10];

/// Upper clamp for the combined wave multiplier
pub const MAX_WAVE_POWER: u32 = 999;

/// Points per block cleared, before the wave multiplier
pub const POINTS_PER_BLOCK: u32 = 10;

/// Score granted in single-board modes when a cascade ends with an empty
/// board
pub const ALL_CLEAR_SCORE: u32 = 2100;

/// Chain score needed per nuisance unit sent in duel mode
pub const NUISANCE_TARGET_SCORE: u32 = 70;

/// Extra nuisance units an all-clear adds to the next conversion
pub const ALL_CLEAR_NUISANCE: u32 = 30;

/// Most nuisance blocks a board receives in one tick (five full rows)
pub const MAX_NUISANCE_ROWS: usize = 5;

/// Score one resolution wave.
///
/// `chain_number` is the 1-based chain position of the wave, `cleared` the
/// colored blocks removed, `group_sizes` the size of each cleared group and
/// `colors` the number of distinct colors among them.
pub fn wave_score(chain_number: u32, cleared: usize, group_sizes: &[usize], colors: usize) -> u32 {
    if cleared == 0 {
        return 0;
    }
    let chain_power = indexed(&CHAIN_POWERS, chain_number.saturating_sub(1) as usize);
    let color_bonus = indexed(&COLOR_BONUSES, colors.saturating_sub(1));
    let group_bonus: u32 = group_sizes
        .iter()
        .map(|&size| indexed(&GROUP_BONUSES, size.saturating_sub(4)))
        .sum();
    let power = (chain_power + color_bonus + group_bonus).clamp(1, MAX_WAVE_POWER);
    POINTS_PER_BLOCK * cleared as u32 * power
}

/// Convert accumulated chain score into whole nuisance units, carrying the
/// remainder so excess score is never lost between cascades.
pub fn score_to_nuisance(score: u32, carry: u32) -> (u32, u32) {
    let total = score + carry;
    (total / NUISANCE_TARGET_SCORE, total % NUISANCE_TARGET_SCORE)
}

fn indexed(table: &[u32], index: usize) -> u32 {
    table[index.min(table.len() - 1)]
}
