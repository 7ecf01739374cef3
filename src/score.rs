//! Chain scoring
//!
//! Each resolution step scores `10 * cleared * max(1, group + chain + color)`,
//! where the three bonuses come from fixed tables.

use crate::chain::Group;
use std::collections::HashSet;

/// Bonus per group, indexed by group size (15 and above share the last entry)
const GROUP_BONUS: [u32; 16] = [0, 0, 0, 0, 0, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

/// Bonus per chain step, indexed by chain count (18 and above share the last entry)
const CHAIN_BONUS: [u32; 19] = [
    0, 0, 8, 16, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 480,
];

/// Bonus by number of distinct colors cleared in one step
const COLOR_BONUS: [u32; 5] = [0, 0, 3, 6, 12];

fn table_lookup(table: &[u32], index: usize) -> u32 {
    table[index.min(table.len() - 1)]
}

/// How a single step's points were put together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub total_cleared: u32,
    pub group_bonus: u32,
    pub chain_bonus: u32,
    pub color_bonus: u32,
    /// Combined multiplier, never below 1
    pub bonus: u32,
    pub points: u64,
}

/// Score the groups cleared together in one chain step
pub fn score_step(groups: &[Group], chain_count: u32) -> ScoreBreakdown {
    let total_cleared: u32 = groups.iter().map(|g| g.cells.len() as u32).sum();
    let group_bonus: u32 = groups
        .iter()
        .map(|g| table_lookup(&GROUP_BONUS, g.cells.len()))
        .sum();
    let chain_bonus = table_lookup(&CHAIN_BONUS, chain_count as usize);
    let colors: HashSet<_> = groups.iter().map(|g| g.color).collect();
    let color_bonus = table_lookup(&COLOR_BONUS, colors.len());

    let bonus = (group_bonus + chain_bonus + color_bonus).max(1);
    ScoreBreakdown {
        total_cleared,
        group_bonus,
        chain_bonus,
        color_bonus,
        bonus,
        points: 10 * total_cleared as u64 * bonus as u64,
    }
}

/// Points only
pub fn score(groups: &[Group], chain_count: u32) -> u64 {
    score_step(groups, chain_count).points
}

/// Running totals for a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score, never decreases until the session is reset
    pub points: u64,
    /// Longest chain seen this session
    pub max_chain: u32,
    /// Total cells cleared
    pub total_cleared: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved step and return its point delta
    pub fn add_step(&mut self, groups: &[Group], chain_count: u32) -> ScoreBreakdown {
        let step = score_step(groups, chain_count);
        self.points += step.points;
        self.total_cleared += step.total_cleared;
        self.max_chain = self.max_chain.max(chain_count);
        step
    }
}
