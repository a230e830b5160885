//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{CascadePhase, GameSnapshot, SwapFeedback};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{ColorType, Pos};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Where the board frame lands in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub start_x: u16,
    pub start_y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
}

const PLAY_BG: Rgb = Rgb::new(30, 30, 40);
const CURSOR_BG: Rgb = Rgb::new(70, 70, 90);
const SELECTED_BG: Rgb = Rgb::new(150, 150, 170);

/// A lightweight terminal renderer for the match-3 board.
#[derive(Debug, Clone)]
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    pub fn layout(&self, board_w: u16, board_h: u16, viewport: Viewport) -> BoardLayout {
        let frame_w = board_w.saturating_mul(self.cell_w).saturating_add(2);
        let frame_h = board_h.saturating_mul(self.cell_h).saturating_add(2);
        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };
        BoardLayout {
            start_x,
            start_y,
            frame_w,
            frame_h,
        }
    }

    /// Resolve a terminal cell to the board cell drawn there, if any.
    pub fn hit_test(&self, snap: &GameSnapshot, viewport: Viewport, column: u16, row: u16) -> Option<Pos> {
        let l = self.layout(snap.width, snap.height, viewport);
        let x0 = l.start_x + 1;
        let y0 = l.start_y + 1;
        if column < x0 || row < y0 {
            return None;
        }
        let x = (column - x0) / self.cell_w;
        let y = (row - y0) / self.cell_h;
        if x >= snap.width || y >= snap.height {
            return None;
        }
        Some(Pos::new(x as i16, y as i16))
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));
        if snap.width == 0 || snap.height == 0 {
            return;
        }

        let l = self.layout(snap.width, snap.height, viewport);
        let play = CellStyle::fg(Rgb::new(80, 80, 90), PLAY_BG);
        let border = CellStyle::fg(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        fb.fill_rect(
            l.start_x + 1,
            l.start_y + 1,
            l.frame_w - 2,
            l.frame_h - 2,
            ' ',
            play,
        );
        fb.draw_box(l.start_x, l.start_y, l.frame_w, l.frame_h, border);

        for y in 0..snap.height {
            for x in 0..snap.width {
                let pos = Pos::new(x as i16, y as i16);
                let bg = if snap.selected == Some(pos) {
                    SELECTED_BG
                } else if snap.cursor == pos && snap.playable() {
                    CURSOR_BG
                } else {
                    PLAY_BG
                };
                let (ch, style) = if snap.flash.contains(&pos) {
                    ('✶', CellStyle::fg(Rgb::new(255, 255, 255), bg).bold())
                } else {
                    match snap.color_at(x, y) {
                        Some(color) => ('●', CellStyle::fg(color_rgb(color), bg).bold()),
                        None => ('·', CellStyle::fg(Rgb::new(90, 90, 100), bg).dim()),
                    }
                };
                self.draw_cell(fb, &l, x, y, ch, style);
            }
        }

        self.draw_side_panel(fb, snap, viewport, &l);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    /// Glyph in the first column of the cell, background across all of it.
    fn draw_cell(&self, fb: &mut FrameBuffer, l: &BoardLayout, x: u16, y: u16, ch: char, style: CellStyle) {
        let px = l.start_x + 1 + x * self.cell_w;
        let py = l.start_y + 1 + y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', style);
        fb.put_char(px + (self.cell_w - 1) / 2, py + (self.cell_h - 1) / 2, ch, style);
    }

    fn draw_side_panel(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, viewport: Viewport, l: &BoardLayout) {
        let panel_x = l.start_x.saturating_add(l.frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::fg(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let mut y = l.start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        fb.put_u32(panel_x, y + 1, snap.score, value);
        y = y.saturating_add(3);

        fb.put_str(panel_x, y, "MOVES", label);
        fb.put_u32(panel_x, y + 1, snap.moves, value);
        y = y.saturating_add(3);

        fb.put_str(panel_x, y, "PHASE", label);
        let phase_style = if snap.phase == CascadePhase::Idle {
            value
        } else {
            value.dim()
        };
        fb.put_str(panel_x, y + 1, snap.phase.as_str(), phase_style);
        y = y.saturating_add(3);

        if let Some(feedback) = snap.last_swap {
            let (text, fg) = match feedback {
                SwapFeedback::Accepted => ("MATCH", Rgb::new(100, 220, 120)),
                SwapFeedback::Rejected => ("NO MATCH", Rgb::new(220, 80, 80)),
            };
            fb.put_str(panel_x, y, text, CellStyle::fg(fg, Rgb::new(0, 0, 0)).bold());
        }
        y = y.saturating_add(2);

        let help = value.dim();
        for line in ["arrows move", "space select", "esc cancel", "r restart", "q quit"] {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, line, help);
            y = y.saturating_add(1);
        }
    }
}

pub fn color_rgb(color: ColorType) -> Rgb {
    match color {
        ColorType::Blue => Rgb::new(80, 120, 230),
        ColorType::Green => Rgb::new(100, 220, 120),
        ColorType::Orange => Rgb::new(255, 165, 0),
        ColorType::Purple => Rgb::new(190, 110, 230),
        ColorType::Red => Rgb::new(230, 70, 70),
        ColorType::Yellow => Rgb::new(240, 220, 80),
        ColorType::Any => Rgb::new(245, 245, 245),
    }
}
