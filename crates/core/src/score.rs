//! Scoring module - one point per cleared piece
//!
//! The tracker owns only a counter. Each cleared piece adds exactly one point;
//! the clearing pass guarantees a piece is never reported twice.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreTracker {
    score: u32,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one point for a cleared piece. Returns the new total.
    pub fn on_piece_cleared(&mut self) -> u32 {
        self.score = self.score.saturating_add(1);
        self.score
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }
}
