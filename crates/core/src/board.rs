//! Board module - owns the grid of pieces
//!
//! The board is a `width x height` grid where every cell holds exactly one
//! [`Piece`]. Uses a flat vector in row-major order (`y * width + x`) for cache
//! locality. Coordinates: x ranges `0..width` (left to right), y ranges
//! `0..height` (top to bottom).
//!
//! All grid mutation goes through [`Board::set`], [`Board::spawn`] and
//! [`Board::swap`], which keep each piece's stored position equal to its index.

use std::ops::Index;

use thiserror::Error;

use crate::piece::{Piece, PieceId, PieceKind};
use crate::types::{ColorType, Pos};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("position ({}, {}) is outside the {width}x{height} board", .pos.x, .pos.y)]
    OutOfRange { pos: Pos, width: u16, height: u16 },
    #[error("invalid board fixture: {0}")]
    InvalidFixture(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: u16,
    height: u16,
    /// Flat array of pieces, row-major order (y * width + x)
    cells: Vec<Piece>,
    next_id: u32,
    /// World-space anchor used by [`Board::world_position`].
    origin: (f32, f32),
}

impl Board {
    /// Create a board with every cell holding a fresh EMPTY piece.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. `GameConfig::validate` rejects such
    /// configurations before a board is ever built.
    pub fn new(width: u16, height: u16) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be positive");
        assert!(
            width <= i16::MAX as u16 && height <= i16::MAX as u16,
            "board dimensions must fit in i16 coordinates"
        );

        let mut board = Self {
            width,
            height,
            cells: Vec::with_capacity(width as usize * height as usize),
            next_id: 0,
            origin: (0.0, 0.0),
        };
        for y in 0..height as i16 {
            for x in 0..width as i16 {
                let id = board.alloc_id();
                board
                    .cells
                    .push(Piece::new(id, Pos::new(x, y), PieceKind::Empty));
            }
        }
        board
    }

    /// Set the world-space anchor of the grid.
    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin = (x, y);
        self
    }

    /// Build a board from text rows, one string per row, top row first.
    ///
    /// Letters are color initials (`B G O P R Y A`, case-insensitive) and `.`
    /// is an EMPTY cell. Whitespace is ignored so rows may be spaced out.
    ///
    /// ```
    /// use tui_match3_core::Board;
    /// use tui_match3_core::types::{ColorType, Pos};
    ///
    /// let board = Board::from_rows(&["R R B", ". G G"]).unwrap();
    /// assert_eq!(board.width(), 3);
    /// assert_eq!(board.color_at(Pos::new(2, 0)), Some(ColorType::Blue));
    /// assert!(board[Pos::new(0, 1)].kind().is_empty());
    /// ```
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardError> {
        let parsed: Vec<Vec<char>> = rows
            .iter()
            .map(|row| row.chars().filter(|c| !c.is_whitespace()).collect())
            .collect();

        let height = parsed.len();
        let width = parsed.first().map(|r| r.len()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(BoardError::InvalidFixture("board must not be empty".into()));
        }
        if width > i16::MAX as usize || height > i16::MAX as usize {
            return Err(BoardError::InvalidFixture("board is too large".into()));
        }

        let mut board = Board::new(width as u16, height as u16);
        for (y, row) in parsed.iter().enumerate() {
            if row.len() != width {
                return Err(BoardError::InvalidFixture(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            for (x, &ch) in row.iter().enumerate() {
                let kind = match ch {
                    '.' => PieceKind::Empty,
                    c => match ColorType::from_letter(c) {
                        Some(color) => PieceKind::Normal(color),
                        None => {
                            return Err(BoardError::InvalidFixture(format!(
                                "unknown cell '{}' at ({}, {})",
                                c, x, y
                            )))
                        }
                    },
                };
                board.spawn(Pos::new(x as i16, y as i16), kind)?;
            }
        }
        Ok(board)
    }

    /// Render the board as text rows in the [`Board::from_rows`] format (no spaces).
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height as i16)
            .map(|y| {
                (0..self.width as i16)
                    .map(|x| match self[Pos::new(x, y)].color() {
                        Some(color) => color.letter(),
                        None => '.',
                    })
                    .collect()
            })
            .collect()
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn flat_index(&self, pos: Pos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x as u16 >= self.width || pos.y as u16 >= self.height {
            return None;
        }
        Some((pos.y as usize) * (self.width as usize) + (pos.x as usize))
    }

    fn out_of_range(&self, pos: Pos) -> BoardError {
        BoardError::OutOfRange {
            pos,
            width: self.width,
            height: self.height,
        }
    }

    fn alloc_id(&mut self) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Check if position is inside the board
    pub fn contains(&self, pos: Pos) -> bool {
        self.flat_index(pos).is_some()
    }

    /// Get the piece at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Pos) -> Option<&Piece> {
        self.flat_index(pos).map(|idx| &self.cells[idx])
    }

    /// Color of the piece at `pos`; `None` for EMPTY cells and out of bounds.
    pub fn color_at(&self, pos: Pos) -> Option<ColorType> {
        self.get(pos).and_then(|p| p.color())
    }

    /// Place `piece` at `pos`, updating its stored coordinates.
    ///
    /// Returns the released previous occupant.
    pub fn set(&mut self, pos: Pos, mut piece: Piece) -> Result<Piece, BoardError> {
        let idx = self.flat_index(pos).ok_or_else(|| self.out_of_range(pos))?;
        piece.set_pos(pos);
        Ok(std::mem::replace(&mut self.cells[idx], piece))
    }

    /// Create a fresh piece of `kind` at `pos`, replacing the current occupant.
    pub fn spawn(&mut self, pos: Pos, kind: PieceKind) -> Result<PieceId, BoardError> {
        if !self.contains(pos) {
            return Err(self.out_of_range(pos));
        }
        let id = self.alloc_id();
        self.set(pos, Piece::new(id, pos, kind))?;
        Ok(id)
    }

    /// Exchange the occupants of `a` and `b`.
    pub fn swap(&mut self, a: Pos, b: Pos) -> Result<(), BoardError> {
        let ia = self.flat_index(a).ok_or_else(|| self.out_of_range(a))?;
        let ib = self.flat_index(b).ok_or_else(|| self.out_of_range(b))?;
        self.cells.swap(ia, ib);
        self.cells[ia].set_pos(a);
        self.cells[ib].set_pos(b);
        Ok(())
    }

    /// Flag the piece at `pos` as being cleared.
    pub(crate) fn mark_being_cleared(&mut self, pos: Pos) -> Result<(), BoardError> {
        let idx = self.flat_index(pos).ok_or_else(|| self.out_of_range(pos))?;
        self.cells[idx].mark_being_cleared();
        Ok(())
    }

    /// Four-directional adjacency of two positions.
    pub fn is_adjacent(&self, a: Pos, b: Pos) -> bool {
        a.is_adjacent(b)
    }

    /// World-space position of a cell's center.
    ///
    /// Rows grow downwards on screen, so `y` is subtracted.
    pub fn world_position(&self, pos: Pos) -> (f32, f32) {
        (
            self.origin.0 - self.width as f32 / 2.5 + pos.x as f32,
            self.origin.1 + self.height as f32 / 2.5 - pos.y as f32,
        )
    }

    /// All pieces in row-major order.
    pub fn cells(&self) -> &[Piece] {
        &self.cells
    }

    /// Number of EMPTY cells.
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|p| p.kind().is_empty()).count()
    }

    /// Write the color grid (row-major) into `out`, reusing its allocation.
    pub fn write_color_grid(&self, out: &mut Vec<Option<ColorType>>) {
        out.clear();
        out.extend(self.cells.iter().map(|p| p.color()));
    }

    /// Replace every cell with a fresh EMPTY piece.
    pub fn clear(&mut self) {
        for idx in 0..self.cells.len() {
            let pos = self.cells[idx].pos();
            let id = self.alloc_id();
            self.cells[idx] = Piece::new(id, pos, PieceKind::Empty);
        }
    }
}

impl Index<Pos> for Board {
    type Output = Piece;

    /// # Panics
    ///
    /// Panics when `pos` is outside the board.
    fn index(&self, pos: Pos) -> &Piece {
        match self.get(pos) {
            Some(piece) => piece,
            None => panic!("{}", self.out_of_range(pos)),
        }
    }
}
