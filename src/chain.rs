//! Chain resolution: gravity, group detection, clearing
//!
//! After a pair locks the resolver alternates between two phases until a
//! detection pass finds nothing to clear:
//!
//! 1. Gravity compacts every column downward.
//! 2. Detection flood-fills same-colored regions and clears those of four or
//!    more cells, scoring them as one chain step.
//!
//! Each call to [`ChainResolver::step`] runs exactly one phase so the caller
//! can show intermediate boards at whatever pace it likes.

use crate::board::{Board, Cell, BOARD_WIDTH, TOTAL_HEIGHT};
use crate::score::{Score, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Smallest connected region that clears
pub const MIN_GROUP_SIZE: usize = 4;

const NEIGHBOURS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// How garbage cells react to nearby clears
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum GarbageRule {
    /// Garbage never clears
    #[default]
    Persist,
    /// Garbage touching a cleared cell is removed with it
    ClearAdjacent,
}

/// A connected run of same-colored cells large enough to clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub color: Cell,
    /// (x, y) coordinates
    pub cells: Vec<(i32, i32)>,
}

/// Compact every column so filled cells rest on the floor in their original order.
/// Returns true if any cell moved.
pub fn apply_gravity(board: &mut Board) -> bool {
    let mut moved = false;
    for x in 0..BOARD_WIDTH {
        moved |= board.compact_column(x);
    }
    moved
}

/// Find every group of at least [`MIN_GROUP_SIZE`] cells.
///
/// Empty and garbage cells never seed a search and never join a group.
pub fn find_groups(board: &Board) -> Vec<Group> {
    let mut visited = [[false; BOARD_WIDTH]; TOTAL_HEIGHT];
    let mut groups = Vec::new();

    for y in 0..TOTAL_HEIGHT as i32 {
        for x in 0..BOARD_WIDTH as i32 {
            let color = board.get(x, y);
            if !color.is_color() || visited[y as usize][x as usize] {
                continue;
            }

            let mut cells = Vec::new();
            let mut stack = vec![(x, y)];
            visited[y as usize][x as usize] = true;

            while let Some((cx, cy)) = stack.pop() {
                cells.push((cx, cy));
                for (dx, dy) in NEIGHBOURS {
                    let (nx, ny) = (cx + dx, cy + dy);
                    if !(0..BOARD_WIDTH as i32).contains(&nx) || !(0..TOTAL_HEIGHT as i32).contains(&ny) {
                        continue;
                    }
                    if !visited[ny as usize][nx as usize] && board.get(nx, ny) == color {
                        visited[ny as usize][nx as usize] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if cells.len() >= MIN_GROUP_SIZE {
                groups.push(Group { color, cells });
            }
        }
    }
    groups
}

/// Empty every cell of every group. Returns how many garbage cells went with them.
pub fn clear_groups(board: &mut Board, groups: &[Group], rule: GarbageRule) -> usize {
    let mut garbage = Vec::new();
    for &(x, y) in groups.iter().flat_map(|g| g.cells.iter()) {
        board.set(x, y, Cell::Empty);
        if rule == GarbageRule::ClearAdjacent {
            garbage.extend(
                NEIGHBOURS
                    .iter()
                    .map(|(dx, dy)| (x + dx, y + dy))
                    .filter(|&(nx, ny)| board.get(nx, ny) == Cell::Garbage),
            );
        }
    }
    garbage.sort_unstable();
    garbage.dedup();
    for &(x, y) in &garbage {
        board.set(x, y, Cell::Empty);
    }
    garbage.len()
}

/// Which phase runs on the next step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvePhase {
    #[default]
    Gravity,
    Detect,
}

/// One resolved clear within a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    /// 1 for the first clear after a lock
    pub chain_count: u32,
    pub groups: Vec<Group>,
    pub score: ScoreBreakdown,
    pub garbage_cleared: usize,
}

/// Outcome of advancing the resolver by one phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseResult {
    /// Nothing is resolving
    Idle,
    /// Gravity ran
    Settled { moved: bool },
    /// Groups were found, scored and cleared
    Cleared(ChainStep),
    /// Detection found nothing; the chain is over
    ChainEnded { chain_count: u32 },
}

/// Phase stepper for one lock's chain
#[derive(Debug, Clone, Default)]
pub struct ChainResolver {
    phase: ResolvePhase,
    chain_count: u32,
    rule: GarbageRule,
}

impl ChainResolver {
    pub fn new(rule: GarbageRule) -> Self {
        Self {
            rule,
            ..Self::default()
        }
    }

    /// Start a fresh chain after a lock
    pub fn reset(&mut self) {
        self.phase = ResolvePhase::Gravity;
        self.chain_count = 0;
    }

    pub fn phase(&self) -> ResolvePhase {
        self.phase
    }

    /// Clears so far in the current (or last) chain
    pub fn chain_count(&self) -> u32 {
        self.chain_count
    }

    pub fn rule(&self) -> GarbageRule {
        self.rule
    }

    /// Run one phase
    pub fn step(&mut self, board: &mut Board, score: &mut Score) -> PhaseResult {
        match self.phase {
            ResolvePhase::Gravity => {
                let moved = apply_gravity(board);
                debug!(moved, "gravity settled");
                self.phase = ResolvePhase::Detect;
                PhaseResult::Settled { moved }
            }
            ResolvePhase::Detect => {
                let groups = find_groups(board);
                if groups.is_empty() {
                    debug!(chain = self.chain_count, "chain ended");
                    return PhaseResult::ChainEnded {
                        chain_count: self.chain_count,
                    };
                }

                self.chain_count += 1;
                let breakdown = score.add_step(&groups, self.chain_count);
                let garbage_cleared = clear_groups(board, &groups, self.rule);
                info!(
                    chain = self.chain_count,
                    groups = groups.len(),
                    cleared = breakdown.total_cleared,
                    points = breakdown.points,
                    "chain step"
                );
                self.phase = ResolvePhase::Gravity;
                PhaseResult::Cleared(ChainStep {
                    chain_count: self.chain_count,
                    groups,
                    score: breakdown,
                    garbage_cleared,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&str]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_gravity_compacts_columns() {
        let mut b = board(&["R.....", "......", "B.G...", "....Y."]);
        assert!(apply_gravity(&mut b));
        assert_eq!(b, board(&["R.....", "B.G.Y."]));
    }

    #[test]
    fn test_gravity_is_idempotent() {
        let mut b = board(&["R...B.", "..#...", "G.Y..."]);
        apply_gravity(&mut b);
        let once = b.clone();
        assert!(!apply_gravity(&mut b));
        assert_eq!(b, once);
    }

    #[test]
    fn test_three_never_clears() {
        let b = board(&["RRR..."]);
        assert!(find_groups(&b).is_empty());
    }

    #[test]
    fn test_four_clears_as_one_group() {
        let b = board(&["R.....", "RRR..."]);
        let groups = find_groups(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].color, Cell::Red);
        assert_eq!(groups[0].cells.len(), 4);
    }

    #[test]
    fn test_diagonal_does_not_connect() {
        let b = board(&["..R...", ".R....", "R.....", "R....."]);
        assert!(find_groups(&b).is_empty());
    }

    #[test]
    fn test_garbage_is_never_grouped() {
        let b = board(&["##....", "##...."]);
        assert!(find_groups(&b).is_empty());
    }

    #[test]
    fn test_separate_groups_found() {
        let b = board(&["BB..GG", "BB..GG", "RRRR.."]);
        let mut colors: Vec<_> = find_groups(&b).iter().map(|g| g.color).collect();
        colors.sort_by_key(|c| c.symbol());
        assert_eq!(colors, vec![Cell::Blue, Cell::Green, Cell::Red]);
    }

    #[test]
    fn test_garbage_rules() {
        let start = board(&["#.....", "RRRR#."]);
        let groups = find_groups(&start);

        let mut kept = start.clone();
        assert_eq!(clear_groups(&mut kept, &groups, GarbageRule::Persist), 0);
        assert_eq!(kept, board(&["#.....", "....#."]));

        let mut cleared = start.clone();
        assert_eq!(clear_groups(&mut cleared, &groups, GarbageRule::ClearAdjacent), 2);
        assert!(cleared.is_empty());
    }

    #[test]
    fn test_resolver_runs_a_two_step_chain() {
        // Clearing the reds drops the blue on top onto the three blues below
        let mut b = board(&[".B....", ".R....", ".R....", "BRR..."]);
        b.set(0, 1, Cell::Blue);
        b.set(0, 2, Cell::Blue);
        let mut score = Score::new();
        let mut resolver = ChainResolver::new(GarbageRule::Persist);

        assert_eq!(resolver.step(&mut b, &mut score), PhaseResult::Settled { moved: false });
        assert_eq!(resolver.phase(), ResolvePhase::Detect);
        let PhaseResult::Cleared(first) = resolver.step(&mut b, &mut score) else {
            panic!("expected a clear");
        };
        assert_eq!(first.chain_count, 1);
        assert_eq!(first.groups[0].color, Cell::Red);

        assert_eq!(resolver.step(&mut b, &mut score), PhaseResult::Settled { moved: true });
        let PhaseResult::Cleared(second) = resolver.step(&mut b, &mut score) else {
            panic!("expected a second clear");
        };
        assert_eq!(second.chain_count, 2);
        assert_eq!(second.groups[0].color, Cell::Blue);

        assert_eq!(resolver.step(&mut b, &mut score), PhaseResult::Settled { moved: false });
        assert_eq!(
            resolver.step(&mut b, &mut score),
            PhaseResult::ChainEnded { chain_count: 2 }
        );
        assert!(b.is_empty());
        assert_eq!(score.points, 40 + 320);
        assert_eq!(resolver.chain_count(), 2);
    }
}
