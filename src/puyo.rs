//! Pair colors and orientations
//!
//! A pair is an axis cell plus a satellite cell. The orientation says where
//! the satellite sits relative to the axis.

use crate::board::Cell;
use serde::{Deserialize, Serialize};

/// Colors of the next pair to be dealt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPair {
    /// Axis color
    pub main: Cell,
    /// Satellite color
    pub sub: Cell,
}

impl ColorPair {
    pub fn new(main: Cell, sub: Cell) -> Self {
        Self { main, sub }
    }
}

/// Satellite position relative to the axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Up, // Spawn state
    Left,
    Down,
    Right,
}

impl Orientation {
    const ALL: [Orientation; 4] = [
        Orientation::Up,
        Orientation::Left,
        Orientation::Down,
        Orientation::Right,
    ];

    pub fn index(&self) -> usize {
        match self {
            Orientation::Up => 0,
            Orientation::Left => 1,
            Orientation::Down => 2,
            Orientation::Right => 3,
        }
    }

    pub fn from_index(index: usize) -> Orientation {
        Self::ALL[index % 4]
    }

    /// Satellite offset (dx, dy) from the axis, y increasing upward
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Orientation::Up => (0, 1),
            Orientation::Left => (-1, 0),
            Orientation::Down => (0, -1),
            Orientation::Right => (1, 0),
        }
    }

    /// Clockwise step: Up → Left → Down → Right → Up
    pub fn cw(&self) -> Orientation {
        Self::from_index(self.index() + 1)
    }

    /// Counter-clockwise step: Up → Right → Down → Left → Up
    pub fn ccw(&self) -> Orientation {
        Self::from_index(self.index() + 3)
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    pub fn apply(&self, orientation: Orientation) -> Orientation {
        match self {
            RotationDirection::Clockwise => orientation.cw(),
            RotationDirection::CounterClockwise => orientation.ccw(),
        }
    }
}
