//! Swap validation
//!
//! A swap exchanges two adjacent movable pieces and is kept only if, in the
//! swapped arrangement, either piece completes a run. Otherwise the exchange is
//! undone and the board is left exactly as it was.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::events::Presenter;
use crate::matcher::find_match;
use crate::piece::PieceId;
use crate::types::Pos;

/// A committed piece movement, for the animation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub piece: PieceId,
    pub from: Pos,
    pub to: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    OutOfRange,
    NotMovable,
    NotAdjacent,
    NoMatch,
    /// A cascade is still running. Only hosts report this; the board is untouched.
    CascadeActive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The swap stands; the two resulting moves, first piece first.
    Accepted(ArrayVec<Move, 2>),
    Rejected(RejectReason),
}

impl SwapOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SwapOutcome::Accepted(_))
    }
}

/// Try to swap the pieces at `a` and `b`.
///
/// On acceptance the board keeps the swapped arrangement and both moves are
/// reported to `presenter`. A swap that forms no match is rolled back and
/// reported through `Presenter::swap_rejected`. Invalid requests (out of range,
/// immovable, not adjacent) are rejected without touching the board or the
/// presenter.
pub fn attempt_swap(
    board: &mut Board,
    a: Pos,
    b: Pos,
    move_ms: u32,
    presenter: &mut dyn Presenter,
) -> SwapOutcome {
    let (first, second) = match (board.get(a), board.get(b)) {
        (Some(first), Some(second)) => (*first, *second),
        _ => return SwapOutcome::Rejected(RejectReason::OutOfRange),
    };
    if !first.is_movable() || !second.is_movable() {
        return SwapOutcome::Rejected(RejectReason::NotMovable);
    }
    if !board.is_adjacent(a, b) {
        return SwapOutcome::Rejected(RejectReason::NotAdjacent);
    }

    if !try_swap(board, a, b) {
        tracing::debug!(?a, ?b, "swap rejected: no match");
        presenter.swap_rejected(&first, &second);
        return SwapOutcome::Rejected(RejectReason::NoMatch);
    }

    tracing::debug!(?a, ?b, "swap accepted");
    presenter.piece_moved(&board[b], a, b, move_ms);
    presenter.piece_moved(&board[a], b, a, move_ms);

    let mut moves = ArrayVec::new();
    moves.push(Move {
        piece: first.id(),
        from: a,
        to: b,
    });
    moves.push(Move {
        piece: second.id(),
        from: b,
        to: a,
    });
    SwapOutcome::Accepted(moves)
}

/// Swap in place and keep it only if it forms a match. Returns whether it was kept.
fn try_swap(board: &mut Board, a: Pos, b: Pos) -> bool {
    if board.swap(a, b).is_err() {
        return false;
    }
    let moved_to_b = board[b];
    let moved_to_a = board[a];
    let matched = find_match(board, &moved_to_b, b, true).is_some()
        || find_match(board, &moved_to_a, a, true).is_some();
    if !matched {
        // Both positions were validated by the first swap.
        let _ = board.swap(a, b);
    }
    matched
}

/// Find the first swap, scanning row-major and trying right then down, that
/// would be accepted.
pub fn find_swap_candidate(board: &Board) -> Option<(Pos, Pos)> {
    let mut scratch = board.clone();
    for y in 0..board.height() as i16 {
        for x in 0..board.width() as i16 {
            let a = Pos::new(x, y);
            for b in [a.offset(1, 0), a.offset(0, 1)] {
                let movable = match (scratch.get(a), scratch.get(b)) {
                    (Some(p), Some(q)) => p.is_movable() && q.is_movable(),
                    _ => false,
                };
                if movable && try_swap(&mut scratch, a, b) {
                    return Some((a, b));
                }
            }
        }
    }
    None
}
