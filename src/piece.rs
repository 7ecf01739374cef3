//! Active falling pair logic

use crate::board::{Board, Cell, BUFFER_ROW};
use crate::puyo::{ColorPair, Orientation, RotationDirection};
use serde::{Deserialize, Serialize};

/// Spawn column of the axis cell
pub const SPAWN_X: i32 = 2;
/// Spawn row of the axis cell, one below the hidden buffer
pub const SPAWN_Y: i32 = BUFFER_ROW - 1;

/// Rotation attempts in order: in place, kick right, kick left
const KICKS: [(i32, i32); 3] = [(0, 0), (1, 0), (-1, 0)];

/// One cell of a pair in board coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceCell {
    pub x: i32,
    pub y: i32,
    pub color: Cell,
}

/// An active falling pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub main_color: Cell,
    pub sub_color: Cell,
    /// Axis position, row 0 is the floor
    pub x: i32,
    pub y: i32,
    pub orientation: Orientation,
}

impl Piece {
    /// Create a new pair at the spawn position
    pub fn new(pair: ColorPair) -> Self {
        Self {
            main_color: pair.main,
            sub_color: pair.sub,
            x: SPAWN_X,
            y: SPAWN_Y,
            orientation: Orientation::Up,
        }
    }

    fn positions_at(x: i32, y: i32, orientation: Orientation) -> [(i32, i32); 2] {
        let (dx, dy) = orientation.offset();
        [(x, y), (x + dx, y + dy)]
    }

    /// Axis then satellite position
    pub fn positions(&self) -> [(i32, i32); 2] {
        Self::positions_at(self.x, self.y, self.orientation)
    }

    /// Axis then satellite cell, with colors
    pub fn cells(&self) -> [PieceCell; 2] {
        let [(ax, ay), (sx, sy)] = self.positions();
        [
            PieceCell { x: ax, y: ay, color: self.main_color },
            PieceCell { x: sx, y: sy, color: self.sub_color },
        ]
    }

    /// True if either cell overlaps something at the current position
    pub fn collides(&self, board: &Board) -> bool {
        !board.are_positions_free(&self.positions())
    }

    /// Move by (dx, dy), optionally switching orientation.
    /// Commits and returns true only if neither resulting cell collides.
    pub fn try_move(
        &mut self,
        board: &Board,
        dx: i32,
        dy: i32,
        orientation: Option<Orientation>,
    ) -> bool {
        let orientation = orientation.unwrap_or(self.orientation);
        let (x, y) = (self.x + dx, self.y + dy);
        if !board.are_positions_free(&Self::positions_at(x, y, orientation)) {
            return false;
        }
        self.x = x;
        self.y = y;
        self.orientation = orientation;
        true
    }

    pub fn move_left(&mut self, board: &Board) -> bool {
        self.try_move(board, -1, 0, None)
    }

    pub fn move_right(&mut self, board: &Board) -> bool {
        self.try_move(board, 1, 0, None)
    }

    pub fn move_down(&mut self, board: &Board) -> bool {
        self.try_move(board, 0, -1, None)
    }

    /// Rotate with a single pass over the kick table
    pub fn rotate(&mut self, direction: RotationDirection, board: &Board) -> bool {
        let target = direction.apply(self.orientation);
        KICKS
            .iter()
            .any(|&(dx, dy)| self.try_move(board, dx, dy, Some(target)))
    }

    /// Hard drop - move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, board: &Board) -> i32 {
        let mut distance = 0;
        while self.move_down(board) {
            distance += 1;
        }
        distance
    }

    /// Where the pair would come to rest if dropped now
    pub fn ghost(&self, board: &Board) -> [PieceCell; 2] {
        let mut ghost = self.clone();
        ghost.hard_drop(board);
        ghost.cells()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_blue() -> Piece {
        Piece::new(ColorPair::new(Cell::Red, Cell::Blue))
    }

    #[test]
    fn test_spawn_position() {
        let piece = red_blue();
        assert_eq!(piece.positions(), [(2, 11), (2, 12)]);
        assert_eq!(piece.cells()[1].color, Cell::Blue);
    }

    #[test]
    fn test_move_into_free_space() {
        let board = Board::new();
        let mut piece = red_blue();
        assert!(piece.move_left(&board));
        assert_eq!(piece.positions(), [(1, 11), (1, 12)]);
        assert!(piece.try_move(&board, 2, -3, Some(Orientation::Right)));
        assert_eq!(piece.positions(), [(3, 8), (4, 8)]);
    }

    #[test]
    fn test_blocked_move_leaves_state() {
        let mut board = Board::new();
        board.set(3, 11, Cell::Garbage);
        let mut piece = red_blue();
        let before = piece.clone();
        assert!(!piece.move_right(&board));
        assert_eq!(piece, before);

        // walls
        let mut piece = red_blue();
        assert!(piece.move_left(&board));
        assert!(piece.move_left(&board));
        assert!(!piece.move_left(&board));
        assert_eq!(piece.x, 0);
    }

    #[test]
    fn test_satellite_above_ceiling_is_open() {
        let board = Board::new();
        let mut piece = red_blue();
        assert!(piece.try_move(&board, 0, 2, None));
        assert_eq!(piece.positions(), [(2, 13), (2, 14)]);
    }

    #[test]
    fn test_rotation_kicks_right_off_left_wall() {
        let board = Board::new();
        let mut piece = red_blue();
        piece.x = 0;
        // Left would put the satellite at x = -1, so the +1 kick applies
        assert!(piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!(piece.orientation, Orientation::Left);
        assert_eq!(piece.x, 1);
    }

    #[test]
    fn test_rotation_kicks_left_off_right_wall() {
        let board = Board::new();
        let mut piece = red_blue();
        piece.x = 5;
        assert!(piece.rotate(RotationDirection::CounterClockwise, &board));
        assert_eq!(piece.orientation, Orientation::Right);
        assert_eq!(piece.x, 4);
    }

    #[test]
    fn test_rotation_fails_when_all_kicks_blocked() {
        // Narrow shaft: both neighbours of the axis and the kick targets are filled
        let mut board = Board::new();
        for x in [0, 1, 3, 4] {
            board.set(x, 11, Cell::Garbage);
        }
        let mut piece = red_blue();
        let before = piece.clone();
        assert!(!piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_hard_drop_and_ghost() {
        let mut board = Board::new();
        board.set(2, 0, Cell::Green);
        let mut piece = red_blue();
        let ghost = piece.ghost(&board);
        assert_eq!((ghost[0].x, ghost[0].y), (2, 1));
        assert_eq!((ghost[1].x, ghost[1].y), (2, 2));
        // ghost does not move the piece
        assert_eq!(piece.y, SPAWN_Y);
        assert_eq!(piece.hard_drop(&board), 10);
        assert_eq!(piece.cells(), ghost);
    }

    #[test]
    fn test_down_orientation_rests_on_satellite() {
        let board = Board::new();
        let mut piece = red_blue();
        assert!(piece.rotate(RotationDirection::Clockwise, &board));
        assert!(piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!(piece.orientation, Orientation::Down);
        piece.hard_drop(&board);
        assert_eq!(piece.positions(), [(2, 1), (2, 0)]);
    }
}
