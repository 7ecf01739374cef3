//! Errors for input arriving from outside the engine (editor, scripts, fixtures)

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("cell ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },
    #[error("board is not in editing mode")]
    NotEditing,
    #[error("cannot start editing while a chain is resolving")]
    EditRefused,
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("bad board row {row}: {reason}")]
    BadRow { row: usize, reason: String },
}
