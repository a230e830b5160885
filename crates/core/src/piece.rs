//! Piece module - the logical state of a single grid cell
//!
//! A cell is never vacant: "nothing here yet" is itself a piece of kind
//! [`PieceKind::Empty`]. Capabilities (movable, clearable, colored) are derived
//! from the kind by exhaustive matching rather than attached components.

use crate::types::{ColorType, Pos};

/// Board-unique identity assigned when a piece is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

/// What occupies a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// Placeholder with no color; neither movable nor clearable.
    Empty,
    /// A regular colored piece.
    Normal(ColorType),
}

impl PieceKind {
    pub fn is_empty(&self) -> bool {
        matches!(self, PieceKind::Empty)
    }

    pub fn color(&self) -> Option<ColorType> {
        match self {
            PieceKind::Empty => None,
            PieceKind::Normal(color) => Some(*color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    id: PieceId,
    pos: Pos,
    kind: PieceKind,
    being_cleared: bool,
}

impl Piece {
    pub(crate) fn new(id: PieceId, pos: Pos, kind: PieceKind) -> Self {
        Self {
            id,
            pos,
            kind,
            being_cleared: false,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn x(&self) -> i16 {
        self.pos.x
    }

    pub fn y(&self) -> i16 {
        self.pos.y
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn color(&self) -> Option<ColorType> {
        self.kind.color()
    }

    pub fn is_being_cleared(&self) -> bool {
        self.being_cleared
    }

    /// Gravity may reposition any non-empty piece.
    pub fn is_movable(&self) -> bool {
        match self.kind {
            PieceKind::Empty => false,
            PieceKind::Normal(_) => true,
        }
    }

    pub fn is_clearable(&self) -> bool {
        match self.kind {
            PieceKind::Empty => false,
            PieceKind::Normal(_) => true,
        }
    }

    pub fn is_colored(&self) -> bool {
        self.color().is_some()
    }

    /// True when both pieces are colored with the same color.
    pub fn matches_color(&self, color: ColorType) -> bool {
        self.color() == Some(color)
    }

    /// Only the board moves pieces, so coordinates stay in sync with `cells`.
    pub(crate) fn set_pos(&mut self, pos: Pos) {
        self.pos = pos;
    }

    pub(crate) fn mark_being_cleared(&mut self) {
        self.being_cleared = true;
    }
}
