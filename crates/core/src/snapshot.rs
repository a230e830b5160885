use serde::{Deserialize, Serialize};

use crate::cascade::CascadePhase;
use crate::types::{ColorType, Pos};

/// Result of the most recent swap attempt, as shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapFeedback {
    Accepted,
    Rejected,
}

/// Plain, renderer-facing copy of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub width: u16,
    pub height: u16,
    /// Row-major colors; `None` for EMPTY cells.
    pub cells: Vec<Option<ColorType>>,
    /// FNV-1a 64 of the color grid.
    pub board_hash: u64,
    pub score: u32,
    pub moves: u32,
    pub phase: CascadePhase,
    pub cursor: Pos,
    pub selected: Option<Pos>,
    /// Cells cleared by the latest matching pass, while their flash lasts.
    pub flash: Vec<Pos>,
    pub last_swap: Option<SwapFeedback>,
    pub episode_id: u32,
    pub seed: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.width = 0;
        self.height = 0;
        self.cells.clear();
        self.board_hash = fnv1a64_cells(&self.cells);
        self.score = 0;
        self.moves = 0;
        self.phase = CascadePhase::Idle;
        self.cursor = Pos::new(0, 0);
        self.selected = None;
        self.flash.clear();
        self.last_swap = None;
        self.episode_id = 0;
        self.seed = 0;
    }

    /// Color at `(x, y)`; `None` for EMPTY or out of range.
    pub fn color_at(&self, x: u16, y: u16) -> Option<ColorType> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .flatten()
    }

    /// Text rows in the `Board::from_rows` format.
    pub fn rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.color_at(x, y).map(|c| c.letter()).unwrap_or('.'))
                    .collect()
            })
            .collect()
    }

    /// Input is accepted only while the board is settled.
    pub fn playable(&self) -> bool {
        self.phase == CascadePhase::Idle
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
            board_hash: 0,
            score: 0,
            moves: 0,
            phase: CascadePhase::Idle,
            cursor: Pos::new(0, 0),
            selected: None,
            flash: Vec::new(),
            last_swap: None,
            episode_id: 0,
            seed: 0,
        };
        s.clear();
        s
    }
}

/// Byte code of a cell for hashing: 0 for EMPTY, 1.. for colors.
pub fn cell_code(cell: Option<ColorType>) -> u8 {
    match cell {
        None => 0,
        Some(color) => ColorType::ALL
            .iter()
            .position(|c| *c == color)
            .map(|i| i as u8 + 1)
            .unwrap_or(0),
    }
}

/// FNV-1a 64-bit over the cell codes.
pub fn fnv1a64_cells(cells: &[Option<ColorType>]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for cell in cells {
        h ^= cell_code(*cell) as u64;
        h = h.wrapping_mul(0x00000100000001B3);
    }
    h
}
