//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` events into [`crate::types::GameAction`]s and board
//! clicks. Resolving a click to a board cell is the view's job; this crate only
//! reports the terminal cell that was pressed.

pub mod handler;
pub mod map;

pub use tui_match3_types as types;

pub use handler::{InputEvent, InputHandler};
pub use map::{handle_key_event, should_quit};
