//! Match finding - straight runs with perpendicular branches
//!
//! A match is found in two passes. The horizontal pass collects the contiguous
//! same-color run through the origin; if it is at least [`MIN_MATCH_LEN`] long,
//! every member contributes itself plus any vertical branch of at least
//! [`MIN_BRANCH_LEN`] pieces (which makes T and L shapes). Only when the
//! horizontal pass yields nothing is the vertical pass tried, with axes swapped.
//!
//! Speculative lookups skip the branch search: they only answer "would a piece
//! of this color at this position complete a run", which is what swap
//! validation needs.

use crate::board::Board;
use crate::piece::Piece;
use crate::types::{ColorType, Pos};

/// Minimum length of a primary run.
pub const MIN_MATCH_LEN: usize = 3;

/// Minimum branch length, not counting the run member it grows from.
pub const MIN_BRANCH_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn step(self) -> (i16, i16) {
        match self {
            Axis::Horizontal => (1, 0),
            Axis::Vertical => (0, 1),
        }
    }

    fn perpendicular(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// A set of matched positions, in discovery order and without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    positions: Vec<Pos>,
    axis: Option<Axis>,
}

impl Match {
    fn insert(&mut self, pos: Pos) {
        if !self.positions.contains(&pos) {
            self.positions.push(pos);
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.positions.contains(&pos)
    }

    pub fn positions(&self) -> &[Pos] {
        &self.positions
    }

    /// Axis of the primary run.
    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    /// Positions sorted row-major; handy for comparisons.
    pub fn sorted(&self) -> Vec<Pos> {
        let mut v = self.positions.clone();
        v.sort_by_key(|p| (p.y, p.x));
        v
    }
}

/// Find the match `piece` would form if it sat at `at`.
///
/// The cell at `at` itself is never read: `piece` stands in for it, so this
/// works both for the piece's real position and for a hypothetical one.
/// Returns `None` for uncolored pieces and when fewer than
/// [`MIN_MATCH_LEN`] pieces line up.
pub fn find_match(board: &Board, piece: &Piece, at: Pos, speculative: bool) -> Option<Match> {
    let color = piece.color()?;

    for axis in [Axis::Horizontal, Axis::Vertical] {
        let mut run = vec![at];
        run.extend(collect_arms(board, at, axis, color));
        if run.len() < MIN_MATCH_LEN {
            continue;
        }

        let mut found = Match {
            positions: Vec::with_capacity(run.len()),
            axis: Some(axis),
        };
        for &member in &run {
            found.insert(member);
            if speculative {
                continue;
            }
            let branch = collect_arms(board, member, axis.perpendicular(), color);
            if branch.len() >= MIN_BRANCH_LEN {
                for pos in branch {
                    found.insert(pos);
                }
            }
        }

        if found.len() >= MIN_MATCH_LEN {
            return Some(found);
        }
    }

    None
}

/// Collect contiguous same-color positions on both sides of `origin` along
/// `axis`, backwards first. `origin` is not included.
fn collect_arms(board: &Board, origin: Pos, axis: Axis, color: ColorType) -> Vec<Pos> {
    let (dx, dy) = axis.step();
    let mut out = Vec::new();
    for sign in [-1i16, 1] {
        let mut cur = origin.offset(dx * sign, dy * sign);
        while board.color_at(cur) == Some(color) {
            out.push(cur);
            cur = cur.offset(dx * sign, dy * sign);
        }
    }
    out
}

/// True if any clearable piece on the board is part of a match.
pub fn board_has_match(board: &Board) -> bool {
    board
        .cells()
        .iter()
        .filter(|p| p.is_clearable())
        .any(|p| find_match(board, p, p.pos(), true).is_some())
}
