//! Game board representation and collision detection

use crate::error::GameError;
use serde::{Deserialize, Serialize};

/// Board dimensions
pub const BOARD_WIDTH: usize = 6;
pub const TOTAL_HEIGHT: usize = 14;
/// Hidden rows at the top of the board, only used to detect game over
pub const BUFFER_HEIGHT: usize = 2;
/// First row of the hidden buffer
pub const BUFFER_ROW: i32 = (TOTAL_HEIGHT - BUFFER_HEIGHT) as i32;

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Red,
    Blue,
    Green,
    Yellow,
    Garbage,
}

/// The four colors that can be dealt in a pair and matched into groups
pub const NORMAL_COLORS: [Cell; 4] = [Cell::Red, Cell::Blue, Cell::Green, Cell::Yellow];

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// True for the four matchable colors
    pub fn is_color(&self) -> bool {
        matches!(self, Cell::Red | Cell::Blue | Cell::Green | Cell::Yellow)
    }

    /// Single character used in text snapshots and fixtures
    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Red => 'R',
            Cell::Blue => 'B',
            Cell::Green => 'G',
            Cell::Yellow => 'Y',
            Cell::Garbage => '#',
        }
    }

    pub fn from_symbol(c: char) -> Option<Cell> {
        match c.to_ascii_uppercase() {
            '.' => Some(Cell::Empty),
            'R' => Some(Cell::Red),
            'B' => Some(Cell::Blue),
            'G' => Some(Cell::Green),
            'Y' => Some(Cell::Yellow),
            '#' => Some(Cell::Garbage),
            _ => None,
        }
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the floor, row increases upward
    cells: [[Cell; BOARD_WIDTH]; TOTAL_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; TOTAL_HEIGHT],
        }
    }

    /// Build a board from text rows, top row first.
    ///
    /// Missing rows at the top are empty, so a fixture only needs to spell out
    /// the rows it cares about.
    pub fn from_rows(rows: &[&str]) -> Result<Self, GameError> {
        if rows.len() > TOTAL_HEIGHT {
            return Err(GameError::BadRow {
                row: rows.len() - 1,
                reason: format!("board has only {TOTAL_HEIGHT} rows"),
            });
        }
        let mut board = Self::new();
        for (i, line) in rows.iter().enumerate() {
            let y = rows.len() - 1 - i;
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != BOARD_WIDTH {
                return Err(GameError::BadRow {
                    row: y,
                    reason: format!("expected {BOARD_WIDTH} cells, found {}", cells.len()),
                });
            }
            for (x, c) in cells.into_iter().enumerate() {
                let cell = Cell::from_symbol(c).ok_or_else(|| GameError::BadRow {
                    row: y,
                    reason: format!("unknown cell '{c}'"),
                })?;
                board.cells[y][x] = cell;
            }
        }
        Ok(board)
    }

    /// Text rows, top row first
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .rev()
            .map(|row| row.iter().map(Cell::symbol).collect())
            .collect()
    }

    /// True iff `0 <= x < BOARD_WIDTH` and `y >= 0`.
    ///
    /// The ceiling is not checked: space above the board is open for movement
    /// and only the lock rule cares about it.
    pub fn is_in_bounds(x: i32, y: i32) -> bool {
        (0..BOARD_WIDTH as i32).contains(&x) && y >= 0
    }

    /// Get the cell at (x, y). Anything off the stored grid reads as empty.
    pub fn get(&self, x: i32, y: i32) -> Cell {
        if !Self::is_in_bounds(x, y) || y >= TOTAL_HEIGHT as i32 {
            return Cell::Empty;
        }
        self.cells[y as usize][x as usize]
    }

    /// Set a cell. Returns false if the coordinate is off the stored grid.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if !Self::is_in_bounds(x, y) || y >= TOTAL_HEIGHT as i32 {
            return false;
        }
        self.cells[y as usize][x as usize] = cell;
        true
    }

    /// Collision rule for a single coordinate
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        if !Self::is_in_bounds(x, y) {
            return true;
        }
        y < TOTAL_HEIGHT as i32 && !self.cells[y as usize][x as usize].is_empty()
    }

    /// Check that none of the positions collide
    pub fn are_positions_free(&self, positions: &[(i32, i32)]) -> bool {
        positions.iter().all(|&(x, y)| !self.is_occupied(x, y))
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.cells = [[Cell::Empty; BOARD_WIDTH]; TOTAL_HEIGHT];
    }

    /// Number of non-empty cells stacked in a column, counting from the floor
    pub fn column_height(&self, x: usize) -> usize {
        (0..TOTAL_HEIGHT)
            .rev()
            .find(|&y| !self.cells[y][x].is_empty())
            .map_or(0, |y| y + 1)
    }

    pub fn count_filled(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    /// Check if the board is completely empty (for all-clear detection)
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Compact one column downward, keeping the order of its cells.
    /// Returns true if anything moved.
    pub(crate) fn compact_column(&mut self, x: usize) -> bool {
        let mut write_row = 0;
        let mut moved = false;
        for read_row in 0..TOTAL_HEIGHT {
            let cell = self.cells[read_row][x];
            if cell.is_empty() {
                continue;
            }
            if write_row != read_row {
                self.cells[write_row][x] = cell;
                self.cells[read_row][x] = Cell::Empty;
                moved = true;
            }
            write_row += 1;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert_eq!(board.count_filled(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new();
        assert!(board.set(5, 3, Cell::Red));
        assert_eq!(board.get(5, 3), Cell::Red);
        assert!(!board.set(6, 3, Cell::Red));
        assert!(!board.set(0, TOTAL_HEIGHT as i32, Cell::Red));
    }

    #[test]
    fn test_bounds_ignore_ceiling() {
        assert!(Board::is_in_bounds(0, 0));
        assert!(Board::is_in_bounds(5, 100));
        assert!(!Board::is_in_bounds(-1, 0));
        assert!(!Board::is_in_bounds(6, 0));
        assert!(!Board::is_in_bounds(0, -1));
    }

    #[test]
    fn test_occupancy() {
        let mut board = Board::new();
        board.set(2, 0, Cell::Garbage);
        assert!(board.is_occupied(2, 0));
        assert!(!board.is_occupied(2, 1));
        assert!(board.is_occupied(-1, 5));
        assert!(board.is_occupied(3, -1));
        // above the stored grid is always open
        assert!(!board.is_occupied(2, TOTAL_HEIGHT as i32 + 3));
    }

    #[test]
    fn test_from_rows_and_back() {
        let board = Board::from_rows(&["R.....", "RB#..Y"]).unwrap();
        assert_eq!(board.get(0, 1), Cell::Red);
        assert_eq!(board.get(2, 0), Cell::Garbage);
        assert_eq!(board.get(5, 0), Cell::Yellow);
        let rows = board.rows();
        assert_eq!(rows.len(), TOTAL_HEIGHT);
        assert_eq!(rows[TOTAL_HEIGHT - 1], "RB#..Y");
        assert_eq!(rows[TOTAL_HEIGHT - 2], "R.....");
    }

    #[test]
    fn test_from_rows_rejects_bad_input() {
        assert!(Board::from_rows(&["RRR"]).is_err());
        assert!(Board::from_rows(&["RRRRRX"]).is_err());
        let too_tall = vec!["......"; TOTAL_HEIGHT + 1];
        assert!(Board::from_rows(&too_tall).is_err());
    }

    #[test]
    fn test_column_height_and_clear() {
        let mut board = Board::from_rows(&["..R...", "......", "..B..."]).unwrap();
        assert_eq!(board.column_height(2), 3);
        assert_eq!(board.column_height(0), 0);
        board.clear();
        assert!(board.is_empty());
    }
}
