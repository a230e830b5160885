//! Core game logic module - pure, deterministic, and testable
//!
//! This crate holds the match-3 rules and the cascade simulation. It does no
//! I/O and never waits: animation and display are driven from the outside
//! through the [`Presenter`] and [`ScoreSink`] traits.
//!
//! # Module Structure
//!
//! - [`board`]: rectangular grid of pieces, row 0 at the top
//! - [`piece`]: piece identity, color and clearing flag
//! - [`matcher`]: run detection with perpendicular branches (T/L shapes)
//! - [`swap`]: swap validation with rollback
//! - [`cascade`]: tick-driven gravity, refill and clearing state machine
//! - [`score`]: one point per cleared piece
//! - [`rng`]: spawn color sources
//! - [`events`]: presenter and score notification boundary
//! - [`config`]: validated session configuration
//! - [`game_state`]: a playable session with selection and timing
//! - [`snapshot`]: plain, serializable view of a session
//!
//! # Game Rules
//!
//! - A run is three or more same-colored clearable pieces in a row or column.
//!   Pieces of two or more extending perpendicular from any run member join it.
//! - A swap of two adjacent pieces stands only if it completes a run.
//! - After a swap the board clears, drops and refills until no run remains.
//!
//! # Example
//!
//! ```
//! use tui_match3_core::{GameConfig, GameState};
//!
//! let mut game = GameState::new(GameConfig::default()).unwrap();
//! game.start();
//! game.settle();
//!
//! assert!(game.is_playable());
//! assert_eq!(game.board().empty_count(), 0);
//! ```
//!
//! # Timing
//!
//! Call [`GameState::tick`](game_state::GameState::tick) every frame with the
//! elapsed time. The cascade advances one step per configured fill interval.

pub mod board;
pub mod cascade;
pub mod config;
pub mod events;
pub mod game_state;
pub mod matcher;
pub mod piece;
pub mod rng;
pub mod score;
pub mod snapshot;
pub mod swap;

pub use tui_match3_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError};
pub use cascade::{CascadeContext, CascadeEngine, CascadePhase, StepReport, SweepReport};
pub use config::{ConfigError, GameConfig};
pub use events::{BoardEvent, EventLog, NullPresenter, Presenter, ScoreSink};
pub use game_state::{GameState, SelectOutcome};
pub use matcher::{board_has_match, find_match, Axis, Match, MIN_BRANCH_LEN, MIN_MATCH_LEN};
pub use piece::{Piece, PieceId, PieceKind};
pub use rng::{RandomSource, SequenceRng, SimpleRng};
pub use score::ScoreTracker;
pub use snapshot::{GameSnapshot, SwapFeedback};
pub use swap::{attempt_swap, find_swap_candidate, Move, RejectReason, SwapOutcome};
