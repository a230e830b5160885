//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are plain data with no game logic, making them usable in any
//! context (core engine, terminal rendering, headless simulation).
//!
//! # Board Coordinates
//!
//! - **x**: column, `0..width` (left to right)
//! - **y**: row, `0..height` (top to bottom)
//! - Gravity pulls pieces towards larger `y`.
//! - New pieces enter from the virtual row `y = -1` and slide into row 0.
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `DEFAULT_FILL_TIME_MS` | 100 | Delay between two drop sweeps |
//! | `CLEAR_FLASH_MS` | 120 | Flash duration for freshly cleared cells |
//!
//! # Examples
//!
//! ```
//! use tui_match3_types::{ColorType, GameAction, Pos};
//!
//! // Parse a color (case-insensitive)
//! assert_eq!(ColorType::from_str("red"), Some(ColorType::Red));
//! assert_eq!(ColorType::from_letter('B'), Some(ColorType::Blue));
//!
//! // Four-directional adjacency
//! assert!(Pos::new(2, 2).is_adjacent(Pos::new(3, 2)));
//! assert!(!Pos::new(2, 2).is_adjacent(Pos::new(3, 3)));
//!
//! // Parse game action
//! assert_eq!(GameAction::from_str("select"), Some(GameAction::Select));
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in cells
pub const DEFAULT_WIDTH: u16 = 8;

/// Default board height in cells
pub const DEFAULT_HEIGHT: u16 = 8;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Default delay between two drop sweeps of a cascade session.
pub const DEFAULT_FILL_TIME_MS: u32 = 100;

/// Flash duration for cells cleared by the last matching pass.
pub const CLEAR_FLASH_MS: u32 = 120;

/// Row index new pieces are spawned at before sliding into row 0.
pub const SPAWN_ROW: i16 = -1;


/// Piece colors.
///
/// `Any` exists for completeness of the color set but is never part of a
/// spawn palette; it only ever matches another `Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorType {
    Blue,
    Green,
    Orange,
    Purple,
    Red,
    Yellow,
    Any,
}

impl ColorType {
    /// Every color, including `Any`.
    pub const ALL: [ColorType; 7] = [
        ColorType::Blue,
        ColorType::Green,
        ColorType::Orange,
        ColorType::Purple,
        ColorType::Red,
        ColorType::Yellow,
        ColorType::Any,
    ];

    /// The six regular colors used as the default spawn palette.
    pub const PALETTE: [ColorType; 6] = [
        ColorType::Blue,
        ColorType::Green,
        ColorType::Orange,
        ColorType::Purple,
        ColorType::Red,
        ColorType::Yellow,
    ];

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_match3_types::ColorType;
    ///
    /// assert_eq!(ColorType::from_str("Purple"), Some(ColorType::Purple));
    /// assert_eq!(ColorType::from_str("magenta"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blue" => Some(ColorType::Blue),
            "green" => Some(ColorType::Green),
            "orange" => Some(ColorType::Orange),
            "purple" => Some(ColorType::Purple),
            "red" => Some(ColorType::Red),
            "yellow" => Some(ColorType::Yellow),
            "any" => Some(ColorType::Any),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorType::Blue => "blue",
            ColorType::Green => "green",
            ColorType::Orange => "orange",
            ColorType::Purple => "purple",
            ColorType::Red => "red",
            ColorType::Yellow => "yellow",
            ColorType::Any => "any",
        }
    }

    /// Single uppercase letter used by board fixtures and the side panel.
    pub fn letter(&self) -> char {
        match self {
            ColorType::Blue => 'B',
            ColorType::Green => 'G',
            ColorType::Orange => 'O',
            ColorType::Purple => 'P',
            ColorType::Red => 'R',
            ColorType::Yellow => 'Y',
            ColorType::Any => 'A',
        }
    }

    /// Inverse of [`ColorType::letter`] (case-insensitive).
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'B' => Some(ColorType::Blue),
            'G' => Some(ColorType::Green),
            'O' => Some(ColorType::Orange),
            'P' => Some(ColorType::Purple),
            'R' => Some(ColorType::Red),
            'Y' => Some(ColorType::Yellow),
            'A' => Some(ColorType::Any),
            _ => None,
        }
    }
}

/// A grid coordinate.
///
/// Signed so the spawn row (`y = -1`) can be expressed in move notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i16,
    pub y: i16,
}

impl Pos {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Position shifted by `(dx, dy)`.
    pub fn offset(self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// True iff `self` and `other` differ by exactly one step along a single axis.
    ///
    /// Diagonal neighbours are not adjacent.
    pub fn is_adjacent(self, other: Pos) -> bool {
        let dx = (self.x as i32 - other.x as i32).abs();
        let dy = (self.y as i32 - other.y as i32).abs();
        (dx == 0 && dy == 1) || (dy == 0 && dx == 1)
    }
}

/// Player actions that can be applied to a running game.
///
/// Mouse/touch hosts resolve clicks to a board position upstream and call
/// `GameState::select` directly; keyboard hosts drive a cursor with these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move the cursor one cell up
    CursorUp,
    /// Move the cursor one cell down
    CursorDown,
    /// Move the cursor one cell left
    CursorLeft,
    /// Move the cursor one cell right
    CursorRight,
    /// Select the piece under the cursor (first or second pick)
    Select,
    /// Drop the pending first selection
    Cancel,
    /// Rebuild the board and start a fresh session
    Restart,
}

impl GameAction {
    /// Parse action from string
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_match3_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("cursorLeft"), Some(GameAction::CursorLeft));
    /// assert_eq!(GameAction::from_str("restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cursorup" => Some(GameAction::CursorUp),
            "cursordown" => Some(GameAction::CursorDown),
            "cursorleft" => Some(GameAction::CursorLeft),
            "cursorright" => Some(GameAction::CursorRight),
            "select" => Some(GameAction::Select),
            "cancel" => Some(GameAction::Cancel),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::CursorUp => "cursorUp",
            GameAction::CursorDown => "cursorDown",
            GameAction::CursorLeft => "cursorLeft",
            GameAction::CursorRight => "cursorRight",
            GameAction::Select => "select",
            GameAction::Cancel => "cancel",
            GameAction::Restart => "restart",
        }
    }
}
