//! Event handler for terminal environments.
//!
//! Turns raw `crossterm` events into [`InputEvent`]s. Key releases are dropped;
//! auto-repeat only moves the cursor. A left-button press is a click, and
//! releasing the button on a different terminal cell is reported as a drag so
//! hosts can swap by dragging one piece onto its neighbour.

use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

use crate::map::{handle_key_event, should_quit};
use crate::types::GameAction;

/// Host-level input, in terminal coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Action(GameAction),
    /// Left button pressed at a terminal cell.
    Click { column: u16, row: u16 },
    /// Left button released away from where it was pressed.
    Drag {
        from: (u16, u16),
        to: (u16, u16),
    },
    Resize { width: u16, height: u16 },
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    pressed_at: Option<(u16, u16)>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<InputEvent> {
        match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            Event::Resize(width, height) => Some(InputEvent::Resize {
                width: *width,
                height: *height,
            }),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<InputEvent> {
        match key.kind {
            KeyEventKind::Release => None,
            KeyEventKind::Press => {
                if should_quit(key) {
                    return Some(InputEvent::Quit);
                }
                handle_key_event(key).map(InputEvent::Action)
            }
            KeyEventKind::Repeat => match handle_key_event(key)? {
                action @ (GameAction::CursorUp
                | GameAction::CursorDown
                | GameAction::CursorLeft
                | GameAction::CursorRight) => Some(InputEvent::Action(action)),
                _ => None,
            },
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<InputEvent> {
        let at = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed_at = Some(at);
                Some(InputEvent::Click {
                    column: mouse.column,
                    row: mouse.row,
                })
            }
            MouseEventKind::Up(MouseButton::Left) => match self.pressed_at.take() {
                Some(from) if from != at => Some(InputEvent::Drag { from, to: at }),
                _ => None,
            },
            _ => None,
        }
    }
}
