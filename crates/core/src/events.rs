//! Presentation boundary
//!
//! The engine reports what happened through [`Presenter`] and [`ScoreSink`]
//! and never waits on them. Durations are hints for animation only.

use crate::piece::Piece;
use crate::types::Pos;

/// Receives fire-and-forget notifications about board changes.
///
/// Every method has a no-op default so hosts only implement what they draw.
pub trait Presenter {
    fn piece_moved(&mut self, _piece: &Piece, _from: Pos, _to: Pos, _duration_ms: u32) {}
    fn piece_cleared(&mut self, _piece: &Piece) {}
    fn piece_spawned(&mut self, _piece: &Piece, _pos: Pos) {}
    fn swap_rejected(&mut self, _a: &Piece, _b: &Piece) {}
}

/// Receives score changes for display. The engine never reads back.
pub trait ScoreSink {
    fn score_changed(&mut self, delta: u32, total: u32);
}

/// Presenter that ignores everything (headless runs, benchmarks).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

/// A recorded presenter notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    Moved {
        piece: Piece,
        from: Pos,
        to: Pos,
        duration_ms: u32,
    },
    Cleared {
        piece: Piece,
    },
    Spawned {
        piece: Piece,
        pos: Pos,
    },
    SwapRejected {
        a: Piece,
        b: Piece,
    },
}

/// Presenter that records every notification in order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<BoardEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[BoardEvent] {
        &self.events
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn cleared_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BoardEvent::Cleared { .. }))
            .count()
    }

    pub fn spawned_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BoardEvent::Spawned { .. }))
            .count()
    }
}

impl Presenter for EventLog {
    fn piece_moved(&mut self, piece: &Piece, from: Pos, to: Pos, duration_ms: u32) {
        self.events.push(BoardEvent::Moved {
            piece: *piece,
            from,
            to,
            duration_ms,
        });
    }

    fn piece_cleared(&mut self, piece: &Piece) {
        self.events.push(BoardEvent::Cleared { piece: *piece });
    }

    fn piece_spawned(&mut self, piece: &Piece, pos: Pos) {
        self.events.push(BoardEvent::Spawned { piece: *piece, pos });
    }

    fn swap_rejected(&mut self, a: &Piece, b: &Piece) {
        self.events.push(BoardEvent::SwapRejected { a: *a, b: *b });
    }
}
