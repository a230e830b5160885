//! Session configuration
//!
//! Validated once at startup so that a bad palette or board size fails before
//! the first piece is spawned, never in the middle of a cascade.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ColorType, DEFAULT_FILL_TIME_MS, DEFAULT_HEIGHT, DEFAULT_WIDTH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board dimensions must be positive (got {width}x{height})")]
    ZeroSize { width: u16, height: u16 },
    #[error("board dimensions {width}x{height} exceed the supported maximum of {max}")]
    TooLarge { width: u16, height: u16, max: u16 },
    #[error("spawn palette is empty")]
    EmptyPalette,
    #[error("a {width}x{height} board needs at least {min} spawn colors (got {got})")]
    PaletteTooSmall {
        width: u16,
        height: u16,
        min: usize,
        got: usize,
    },
    #[error("spawn palette lists {0:?} more than once")]
    DuplicateColor(ColorType),
    #[error("spawn palette may not contain {0:?}")]
    UnspawnableColor(ColorType),
}

/// Largest supported board side.
pub const MAX_DIMENSION: u16 = 256;

/// Fewest spawn colors a board that can hold a run needs.
pub const MIN_PALETTE_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    /// Delay between two drop sweeps, in milliseconds.
    pub fill_time_ms: u32,
    /// Colors spawned pieces are drawn from, uniformly.
    pub palette: Vec<ColorType>,
    pub seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fill_time_ms: DEFAULT_FILL_TIME_MS,
            palette: ColorType::PALETTE.to_vec(),
            seed: 1,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(ConfigError::TooLarge {
                width: self.width,
                height: self.height,
                max: MAX_DIMENSION,
            });
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        // With a single color every full row or column is a run, so refills never stop.
        if self.palette.len() < MIN_PALETTE_LEN && (self.width >= 3 || self.height >= 3) {
            return Err(ConfigError::PaletteTooSmall {
                width: self.width,
                height: self.height,
                min: MIN_PALETTE_LEN,
                got: self.palette.len(),
            });
        }
        for (i, color) in self.palette.iter().enumerate() {
            if *color == ColorType::Any {
                return Err(ConfigError::UnspawnableColor(*color));
            }
            if self.palette[..i].contains(color) {
                return Err(ConfigError::DuplicateColor(*color));
            }
        }
        Ok(())
    }
}
