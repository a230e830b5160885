//! TUI Match-3 (workspace facade crate).
//!
//! Re-exports `tui_match3::{core,input,term,types}` while the implementation
//! lives in dedicated crates under `crates/`.

pub use tui_match3_core as core;
pub use tui_match3_input as input;
pub use tui_match3_term as term;
pub use tui_match3_types as types;
