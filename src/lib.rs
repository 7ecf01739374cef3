//! PUYORS - falling pair puzzle engine
//!
//! Pairs of colored cells fall into a 6 x 14 board. When four or more cells
//! of one color touch they pop, whatever sat above falls, and the new board
//! may pop again. [`GameSession`] owns the whole state and exposes commands,
//! a phase stepper for chain resolution, and read-only queries for whoever
//! draws it.

pub mod board;
pub mod chain;
pub mod error;
pub mod game;
pub mod piece;
pub mod puyo;
pub mod queue;
pub mod score;
pub mod settings;

pub use board::{Board, Cell};
pub use chain::{ChainStep, GarbageRule, PhaseResult};
pub use error::GameError;
pub use game::{Action, GameEvent, GameSession, GameState, Rules, Snapshot, Status};
pub use puyo::ColorPair;
pub use settings::Settings;
