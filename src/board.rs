//! 2D board representation and stone colors.
//!
//! The board is a plain `n * n` grid of cells. It performs no rule checking
//! of its own beyond bounds; legality lives in [`crate::game::GameState`].

use std::fmt;
use std::ops::Neg;

/// Stone color, also used to denote the player to move.
///
/// Black is the first player and maps to `+1`, White maps to `-1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl Neg for Color {
    type Output = Color;

    fn neg(self) -> Color {
        self.opponent()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// A square grid where each cell is empty (`None`) or holds a stone.
///
/// Cell `(x, y)` is row `x`, column `y`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub size: usize,
    cells: Vec<Option<Color>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        x * self.size + y
    }

    #[inline]
    pub fn is_on_board(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    /// Stone at `(x, y)`, or `None` if the cell is empty or off the board.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if !self.is_on_board(x, y) {
            return None;
        }
        self.cells[self.idx(x, y)]
    }

    #[inline]
    pub fn is_empty_at(&self, x: usize, y: usize) -> bool {
        self.is_on_board(x, y) && self.cells[self.idx(x, y)].is_none()
    }

    /// Place a stone without any legality check. Off-board writes are ignored.
    pub fn place(&mut self, x: usize, y: usize, color: Color) {
        if self.is_on_board(x, y) {
            let i = self.idx(x, y);
            self.cells[i] = Some(color);
        }
    }

    /// Number of stones of `color` on the board.
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|&&c| c == Some(color)).count()
    }

    /// Row-major view of all cells, for feature encoders.
    pub fn cells(&self) -> &[Option<Color>] {
        &self.cells
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in 0..self.size {
            for y in 0..self.size {
                let ch = match self.get(x, y) {
                    Some(Color::Black) => 'B',
                    Some(Color::White) => 'W',
                    None => '.',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
