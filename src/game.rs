//! Core game state and logic

use crate::board::{Board, Cell, BUFFER_ROW, TOTAL_HEIGHT};
use crate::chain::{ChainResolver, ChainStep, GarbageRule, PhaseResult};
use crate::error::GameError;
use crate::piece::{Piece, PieceCell};
use crate::puyo::{ColorPair, RotationDirection};
use crate::queue::NextQueue;
use crate::score::Score;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// Rules that change how a session plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rules {
    pub garbage: GarbageRule,
}

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Between a finished chain and the next pair appearing
    Spawning,
    /// A pair is falling and accepts commands
    Falling,
    /// A pair locked and the chain resolver owns the board
    Resolving,
    GameOver,
    /// The board is open for direct edits
    Editing,
}

/// Coarse state for collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Playing,
    Resolving,
    GameOver,
    Editing,
}

/// Player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCW,
    RotateCCW,
    HardDrop,
}

impl FromStr for Action {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Ok(Action::MoveLeft),
            "right" | "r" => Ok(Action::MoveRight),
            "down" | "soft" | "d" => Ok(Action::SoftDrop),
            "cw" | "x" => Ok(Action::RotateCW),
            "ccw" | "z" => Ok(Action::RotateCCW),
            "drop" | "hard" | "space" => Ok(Action::HardDrop),
            other => Err(GameError::UnknownAction(other.to_string())),
        }
    }
}

/// Things that happened, for whoever draws the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    PieceSpawned { pair: ColorPair },
    PieceMoved,
    PieceLocked { cells: [PieceCell; 2] },
    ChainStepResolved {
        groups_cleared: usize,
        score_delta: u64,
        chain_count: u32,
    },
    ChainEnded { chain_count: u32 },
    GameOver,
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Board rows, top first
    pub board: Vec<String>,
    pub piece: Option<[PieceCell; 2]>,
    pub ghost: Option<[PieceCell; 2]>,
    pub next: [ColorPair; 2],
    pub score: u64,
    pub chain: u32,
    pub max_chain: u32,
    pub status: Status,
}

/// One game session: board, falling pair, queue, score and chain state
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    current_piece: Option<Piece>,
    queue: NextQueue,
    score: Score,
    resolver: ChainResolver,
    state: GameState,
    /// Editing was opened on a finished game
    edit_after_game_over: bool,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create a new session with a random seed
    pub fn new(rules: Rules) -> Self {
        Self::with_seed(rules, rand::random())
    }

    /// Create a reproducible session
    pub fn with_seed(rules: Rules, seed: u64) -> Self {
        let mut session = Self {
            board: Board::new(),
            current_piece: None,
            queue: NextQueue::with_seed(seed),
            score: Score::new(),
            resolver: ChainResolver::new(rules.garbage),
            state: GameState::Spawning,
            edit_after_game_over: false,
            events: Vec::new(),
        };
        debug!(seed, "new session");
        session.initialize();
        session
    }

    /// Reset board, score and queue, then spawn the first pair
    pub fn initialize(&mut self) {
        self.board.clear();
        self.current_piece = None;
        self.score = Score::new();
        self.resolver.reset();
        self.queue.reseed();
        self.edit_after_game_over = false;
        self.events.clear();
        self.state = GameState::Spawning;
        self.spawn();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn status(&self) -> Status {
        match self.state {
            GameState::Spawning | GameState::Falling => Status::Playing,
            GameState::Resolving => Status::Resolving,
            GameState::GameOver => Status::GameOver,
            GameState::Editing => Status::Editing,
        }
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn chain_count(&self) -> u32 {
        self.resolver.chain_count()
    }

    pub fn rules(&self) -> Rules {
        Rules {
            garbage: self.resolver.rule(),
        }
    }

    pub fn piece(&self) -> Option<&Piece> {
        self.current_piece.as_ref()
    }

    pub fn piece_cells(&self) -> Option<[PieceCell; 2]> {
        self.current_piece.as_ref().map(Piece::cells)
    }

    pub fn ghost_cells(&self) -> Option<[PieceCell; 2]> {
        self.current_piece.as_ref().map(|p| p.ghost(&self.board))
    }

    /// The next two pairs
    pub fn preview(&self) -> [ColorPair; 2] {
        self.queue.preview()
    }

    /// Hand out everything that happened since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.rows(),
            piece: self.piece_cells(),
            ghost: self.ghost_cells(),
            next: self.preview(),
            score: self.score.points,
            chain: self.chain_count(),
            max_chain: self.score.max_chain,
            status: self.status(),
        }
    }

    /// Process a player command. Ignored unless a pair is falling.
    pub fn process_action(&mut self, action: Action) -> bool {
        if self.state != GameState::Falling {
            return false;
        }
        match action {
            Action::MoveLeft => self.shift(-1, 0),
            Action::MoveRight => self.shift(1, 0),
            Action::SoftDrop => self.shift(0, -1),
            Action::RotateCW => self.rotate(RotationDirection::Clockwise),
            Action::RotateCCW => self.rotate(RotationDirection::CounterClockwise),
            Action::HardDrop => self.hard_drop(),
        }
    }

    /// One step of host-driven gravity: move the pair down, or lock it if it
    /// is resting on something
    pub fn fall(&mut self) -> bool {
        if self.state != GameState::Falling {
            return false;
        }
        if self.shift(0, -1) {
            return true;
        }
        self.lock_piece();
        false
    }

    fn shift(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = &mut self.current_piece else {
            return false;
        };
        let moved = piece.try_move(&self.board, dx, dy, None);
        if moved {
            self.events.push(GameEvent::PieceMoved);
        }
        moved
    }

    fn rotate(&mut self, direction: RotationDirection) -> bool {
        let Some(piece) = &mut self.current_piece else {
            return false;
        };
        let rotated = piece.rotate(direction, &self.board);
        if rotated {
            self.events.push(GameEvent::PieceMoved);
        }
        rotated
    }

    fn hard_drop(&mut self) -> bool {
        let Some(piece) = &mut self.current_piece else {
            return false;
        };
        let distance = piece.hard_drop(&self.board);
        if distance > 0 {
            self.events.push(GameEvent::PieceMoved);
        }
        self.lock_piece();
        true
    }

    /// Write the pair into the board and hand over to the chain resolver
    fn lock_piece(&mut self) {
        let Some(piece) = self.current_piece.take() else {
            return;
        };
        let cells = piece.cells();

        if cells.iter().any(|c| c.y >= BUFFER_ROW) {
            info!(?cells, "pair locked in the hidden rows");
            self.game_over();
            return;
        }

        for cell in &cells {
            if cell.y >= 0 {
                self.board.set(cell.x, cell.y, cell.color);
            }
        }
        debug!(?cells, "pair locked");
        self.events.push(GameEvent::PieceLocked { cells });
        self.resolver.reset();
        self.state = GameState::Resolving;
    }

    /// Run one resolver phase. Spawns the next pair when the chain ends.
    pub fn advance_phase(&mut self) -> PhaseResult {
        if self.state != GameState::Resolving {
            return PhaseResult::Idle;
        }
        let result = self.resolver.step(&mut self.board, &mut self.score);
        match &result {
            PhaseResult::Cleared(step) => {
                self.events.push(GameEvent::ChainStepResolved {
                    groups_cleared: step.groups.len(),
                    score_delta: step.score.points,
                    chain_count: step.chain_count,
                });
            }
            PhaseResult::ChainEnded { chain_count } => {
                self.events.push(GameEvent::ChainEnded {
                    chain_count: *chain_count,
                });
                self.state = GameState::Spawning;
                self.spawn();
            }
            PhaseResult::Settled { .. } | PhaseResult::Idle => {}
        }
        result
    }

    /// Drive the resolver until the chain ends
    pub fn resolve_chain(&mut self) -> Vec<ChainStep> {
        let mut steps = Vec::new();
        loop {
            match self.advance_phase() {
                PhaseResult::Cleared(step) => steps.push(step),
                PhaseResult::Settled { .. } => {}
                PhaseResult::ChainEnded { .. } | PhaseResult::Idle => return steps,
            }
        }
    }

    /// Deal the next pair and place it at the spawn point
    fn spawn(&mut self) {
        let pair = self.queue.deal();
        let piece = Piece::new(pair);
        if piece.collides(&self.board) {
            info!(?pair, "spawn point blocked");
            self.game_over();
            return;
        }
        debug!(?pair, "pair spawned");
        self.current_piece = Some(piece);
        self.events.push(GameEvent::PieceSpawned { pair });
        self.state = GameState::Falling;
    }

    fn game_over(&mut self) {
        self.current_piece = None;
        self.state = GameState::GameOver;
        info!(score = self.score.points, max_chain = self.score.max_chain, "game over");
        self.events.push(GameEvent::GameOver);
    }

    /// Open the board for direct edits. Refused while a chain is resolving.
    /// The falling pair is discarded.
    pub fn begin_edit(&mut self) -> Result<(), GameError> {
        match self.state {
            GameState::Resolving | GameState::Spawning => Err(GameError::EditRefused),
            GameState::Editing => Ok(()),
            GameState::Falling | GameState::GameOver => {
                debug!(from = ?self.state, "editing started");
                self.edit_after_game_over = self.state == GameState::GameOver;
                self.current_piece = None;
                self.state = GameState::Editing;
                Ok(())
            }
        }
    }

    /// Overwrite one cell while editing
    pub fn edit_cell(&mut self, x: i32, y: i32, cell: Cell) -> Result<(), GameError> {
        if self.state != GameState::Editing {
            return Err(GameError::NotEditing);
        }
        if !Board::is_in_bounds(x, y) || y >= TOTAL_HEIGHT as i32 {
            return Err(GameError::OutOfBounds { x, y });
        }
        self.board.set(x, y, cell);
        Ok(())
    }

    /// Replace the whole board from text rows (top first) while editing
    pub fn load_rows(&mut self, rows: &[&str]) -> Result<(), GameError> {
        if self.state != GameState::Editing {
            return Err(GameError::NotEditing);
        }
        self.board = Board::from_rows(rows)?;
        Ok(())
    }

    /// Leave editing and deal a new pair. A finished game stays finished
    /// until [`GameSession::initialize`].
    pub fn end_edit(&mut self) -> Result<(), GameError> {
        if self.state != GameState::Editing {
            return Err(GameError::NotEditing);
        }
        debug!("editing finished");
        self.resolver.reset();
        if std::mem::take(&mut self.edit_after_game_over) {
            self.state = GameState::GameOver;
            return Ok(());
        }
        self.state = GameState::Spawning;
        self.spawn();
        Ok(())
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}
