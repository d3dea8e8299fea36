//! Game state and the minimal rules contract the search relies on.
//!
//! The rules are deliberately simplified:
//! - A stone may be placed on any empty on-board cell (no capture, suicide or ko)
//! - Passing is always legal
//! - Two consecutive passes end the game
//!
//! Moves map onto a fixed action space of size `n * n + 1`: cell `(x, y)` is
//! index `x * n + y` and index `n * n` is reserved for [`Move::Pass`].

use std::fmt;

use thiserror::Error;

use crate::board::{Board, Color};
use crate::constants::{DEFAULT_BOARD_SIZE, PASSES_TO_END};

/// A move: a stone placement at `(x, y)` or a pass.
///
/// Ordered so placements sort row-major before `Pass`, matching action indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Move {
    At(usize, usize),
    Pass,
}

impl Move {
    /// Action-space index of this move on an `n x n` board.
    #[inline]
    pub fn to_index(self, n: usize) -> usize {
        match self {
            Move::At(x, y) => x * n + y,
            Move::Pass => n * n,
        }
    }

    /// Inverse of [`Move::to_index`]. Returns `None` past the pass index.
    pub fn from_index(index: usize, n: usize) -> Option<Move> {
        let cells = n * n;
        if index < cells {
            Some(Move::At(index / n, index % n))
        } else if index == cells {
            Some(Move::Pass)
        } else {
            None
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::At(x, y) => write!(f, "({x}, {y})"),
            Move::Pass => write!(f, "pass"),
        }
    }
}

/// Reason a move could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move: {0} is off the board")]
    OffBoard(Move),
    #[error("illegal move: {0} is not empty")]
    Occupied(Move),
    #[error("game is already over")]
    GameOver,
}

/// A snapshot of a game in progress.
///
/// Cloning produces a fully independent copy, which is how search tree
/// nodes obtain their own state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Color,
    passes: u32,
    terminal: bool,
    history: Vec<Move>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

impl GameState {
    /// Create an empty `size x size` game with Black to move.
    pub fn new(size: usize) -> Self {
        Self {
            board: Board::new(size),
            current_player: Color::Black,
            passes: 0,
            terminal: false,
            history: Vec::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.board.size
    }

    /// Number of actions, `n * n + 1` (the last one is `Pass`).
    #[inline]
    pub fn action_size(&self) -> usize {
        self.size() * self.size() + 1
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn current_player(&self) -> Color {
        self.current_player
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Consecutive passes since the last stone was placed.
    #[inline]
    pub fn consecutive_passes(&self) -> u32 {
        self.passes
    }

    /// Every move applied so far, oldest first.
    pub fn move_history(&self) -> &[Move] {
        &self.history
    }

    pub fn stone_count(&self, color: Color) -> usize {
        self.board.count(color)
    }

    #[inline]
    pub fn move_to_index(&self, mv: Move) -> usize {
        mv.to_index(self.size())
    }

    #[inline]
    pub fn index_to_move(&self, index: usize) -> Option<Move> {
        Move::from_index(index, self.size())
    }

    /// Whether `mv` may be played: passes always, placements on empty cells.
    pub fn is_legal(&self, mv: Move) -> bool {
        match mv {
            Move::Pass => true,
            Move::At(x, y) => self.board.is_empty_at(x, y),
        }
    }

    /// All legal moves, empty cells in row-major order followed by `Pass`.
    pub fn legal_moves(&self) -> Vec<Move> {
        let n = self.size();
        let mut moves = Vec::with_capacity(n * n + 1);
        for x in 0..n {
            for y in 0..n {
                if self.board.is_empty_at(x, y) {
                    moves.push(Move::At(x, y));
                }
            }
        }
        moves.push(Move::Pass);
        moves
    }

    /// Apply a move for the current player.
    ///
    /// On error the state is left exactly as it was.
    pub fn apply(&mut self, mv: Move) -> Result<(), MoveError> {
        if self.terminal {
            return Err(MoveError::GameOver);
        }
        match mv {
            Move::Pass => {
                self.passes += 1;
                if self.passes >= PASSES_TO_END {
                    self.terminal = true;
                }
            }
            Move::At(x, y) => {
                if !self.board.is_on_board(x, y) {
                    return Err(MoveError::OffBoard(mv));
                }
                if !self.board.is_empty_at(x, y) {
                    return Err(MoveError::Occupied(mv));
                }
                self.board.place(x, y, self.current_player);
                self.passes = 0;
            }
        }
        self.current_player = self.current_player.opponent();
        self.history.push(mv);
        Ok(())
    }

    /// Boolean form of [`GameState::apply`]: `false` means nothing changed.
    pub fn try_apply(&mut self, mv: Move) -> bool {
        self.apply(mv).is_ok()
    }

    /// Coarse outcome by stone majority, relative to `perspective`.
    ///
    /// Returns `1.0` if `perspective` has more stones, `-1.0` if fewer and
    /// `0.0` on a tie. This is not area or territory scoring.
    pub fn terminal_outcome(&self, perspective: Color) -> f64 {
        let black = self.board.count(Color::Black);
        let white = self.board.count(Color::White);
        let leader = match black.cmp(&white) {
            std::cmp::Ordering::Greater => Color::Black,
            std::cmp::Ordering::Less => Color::White,
            std::cmp::Ordering::Equal => return 0.0,
        };
        if leader == perspective { 1.0 } else { -1.0 }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)?;
        write!(f, "{} to move", self.current_player)?;
        if self.terminal {
            write!(f, " (game over)")?;
        }
        Ok(())
    }
}
