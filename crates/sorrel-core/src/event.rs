use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

/// Input events delivered by the runtime.
///
/// Every event read from the terminal is published once on the
/// [`InputBus`](crate::bus::InputBus). Document-level listeners (see
/// [`document_events`](crate::subscriptions::document_events)) receive every
/// event while they are active; element-level routing is done by the page,
/// which forwards the events it cares about to the widget that owns the
/// targeted area.
///
/// Each variant wraps the corresponding [`crossterm::event::Event`] payload, so
/// you can pattern-match on key codes, modifiers and mouse buttons with the
/// full crossterm API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A keyboard event.
    Key(KeyEvent),
    /// A pointer (mouse) event.
    Pointer(MouseEvent),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Terminal window gained focus.
    FocusGained,
    /// Terminal window lost focus.
    FocusLost,
    /// Bracketed paste content.
    Paste(String),
}

impl InputEvent {
    /// Whether this is a press of the escape key.
    pub fn is_escape(&self) -> bool {
        matches!(
            self,
            InputEvent::Key(KeyEvent {
                code: KeyCode::Esc,
                kind: KeyEventKind::Press,
                ..
            })
        )
    }

    /// The cell of a primary-button press, if this is one.
    pub fn pointer_press(&self) -> Option<Position> {
        match self {
            InputEvent::Pointer(mouse) => press_position(mouse),
            _ => None,
        }
    }
}

impl From<crossterm::event::Event> for InputEvent {
    fn from(event: crossterm::event::Event) -> Self {
        match event {
            crossterm::event::Event::Key(k) => InputEvent::Key(k),
            crossterm::event::Event::Mouse(m) => InputEvent::Pointer(m),
            crossterm::event::Event::Resize(w, h) => InputEvent::Resize(w, h),
            crossterm::event::Event::FocusGained => InputEvent::FocusGained,
            crossterm::event::Event::FocusLost => InputEvent::FocusLost,
            crossterm::event::Event::Paste(s) => InputEvent::Paste(s),
        }
    }
}

/// The cell of a left-button press, or `None` for any other pointer event.
pub fn press_position(mouse: &MouseEvent) -> Option<Position> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Position::new(mouse.column, mouse.row)),
        _ => None,
    }
}

/// Whether the pointer event happened inside `area`.
pub fn hits(area: Rect, mouse: &MouseEvent) -> bool {
    area.contains(Position::new(mouse.column, mouse.row))
}

/// Whether `position` lies inside any of `areas`.
pub fn inside_any(areas: &[Rect], position: Position) -> bool {
    areas.iter().any(|area| area.contains(position))
}
