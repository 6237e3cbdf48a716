//! Floating content: the open/close state machine, its scoped dismissal
//! listener, and positioning helpers.
//!
//! An [`Overlay`] starts closed. Activating its trigger opens it; it closes
//! again on a press outside its regions, on Escape, on a widget-specific
//! commit, on trigger reactivation, or when the owner closes it directly.
//!
//! While open, [`Overlay::listener`] yields a document-level subscription
//! keyed by the overlay's id. The owner returns it from `subscriptions()`,
//! so the runtime attaches the listener on entry to the open state and
//! detaches it on every way out, including the owner being dropped.
//!
//! The listener itself only forwards candidate events. The owner classifies
//! each one with [`Overlay::dismissal`] against the regions it rendered last,
//! since only the owner knows where its trigger and content are.

use crate::disclosure::DataState;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Clear};
use ratatui::Frame;
use sorrel_core::event::InputEvent;
use sorrel_core::subscription::Subscription;
use sorrel_core::subscriptions::{document_events, listener_key};

/// Process-unique identity of one overlay instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(u64);

impl OverlayId {
    /// Allocate a fresh id.
    pub fn new() -> Self {
        Self(listener_key())
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

/// Why an overlay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// A press landed outside the trigger and the floating content.
    OutsideInteraction,
    /// The escape key was pressed.
    Escape,
    /// The widget committed (a value was chosen, an item activated).
    Commit,
    /// The trigger was activated again.
    Trigger,
    /// The owner closed it directly.
    Programmatic,
}

/// Horizontal placement of floating content relative to its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Left edges line up.
    Start,
    /// Centred under the trigger.
    #[default]
    Center,
    /// Right edges line up.
    End,
}

/// Open/closed state of one floating container.
#[derive(Debug)]
pub struct Overlay {
    id: OverlayId,
    open: bool,
}

impl Overlay {
    /// A closed overlay with a fresh id.
    pub fn new() -> Self {
        Self {
            id: OverlayId::new(),
            open: false,
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn data_state(&self) -> DataState {
        DataState::from_open(self.open)
    }

    /// Enter the open state. Returns `false` if it was already open.
    pub fn open(&mut self) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        tracing::debug!(overlay = self.id.0, "overlay opened");
        true
    }

    /// Enter the closed state. Returns `false` if it was already closed.
    pub fn close(&mut self, reason: DismissReason) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        tracing::debug!(overlay = self.id.0, ?reason, "overlay closed");
        true
    }

    /// Trigger activation: open when closed, close with
    /// [`DismissReason::Trigger`] when open. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.open {
            self.close(DismissReason::Trigger);
        } else {
            self.open();
        }
        self.open
    }

    /// The dismissal listener, present only while open.
    ///
    /// Forwards escape presses and every pointer event to `map`. Pointer
    /// motion is included so owners with hover behavior (submenus) can track
    /// the pointer while open.
    pub fn listener<Msg: Send + 'static>(
        &self,
        map: impl Fn(InputEvent) -> Msg + Send + Sync + 'static,
    ) -> Option<Subscription<Msg>> {
        if !self.open {
            return None;
        }
        Some(document_events(self.id.0, move |event| match event {
            InputEvent::Pointer(_) => Some(map(event)),
            _ if event.is_escape() => Some(map(event)),
            _ => None,
        }))
    }

    /// Classify a document event against the regions that count as inside.
    ///
    /// Escape maps to [`DismissReason::Escape`]; a primary press outside every
    /// rect in `inside` maps to [`DismissReason::OutsideInteraction`];
    /// everything else is not a dismissal.
    pub fn dismissal(event: &InputEvent, inside: &[Rect]) -> Option<DismissReason> {
        if event.is_escape() {
            return Some(DismissReason::Escape);
        }
        let position = event.pointer_press()?;
        if sorrel_core::event::inside_any(inside, position) {
            None
        } else {
            Some(DismissReason::OutsideInteraction)
        }
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

/// Place content of `width` x `height` below `trigger`, aligned horizontally
/// per `align` and kept inside `bounds`.
///
/// Flips above the trigger when there is more room there than below.
pub fn anchor(trigger: Rect, width: u16, height: u16, align: Align, bounds: Rect) -> Rect {
    let width = width.min(bounds.width);

    let below = bounds.bottom().saturating_sub(trigger.bottom());
    let above = trigger.y.saturating_sub(bounds.y);
    let (y, height) = if height <= below || below >= above {
        (trigger.bottom(), height.min(below))
    } else {
        let h = height.min(above);
        (trigger.y - h, h)
    };

    let desired = match align {
        Align::Start => i32::from(trigger.x),
        Align::Center => i32::from(trigger.x) + (i32::from(trigger.width) - i32::from(width)) / 2,
        Align::End => i32::from(trigger.right()) - i32::from(width),
    };
    let max_x = i32::from(bounds.right()) - i32::from(width);
    let x = desired.clamp(i32::from(bounds.x), max_x.max(i32::from(bounds.x)));

    Rect::new(x as u16, y, width, height)
}

/// Compute a centered sub-rect with fixed dimensions, clamped to `area`.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

/// Clear the overlay area and optionally render a block border.
///
/// Returns the inner area (after block padding, if any).
pub fn render_overlay(frame: &mut Frame, area: Rect, block: Option<&Block>) -> Rect {
    frame.render_widget(Clear, area);
    if let Some(block) = block {
        let inner = block.inner(area);
        frame.render_widget(block.clone(), area);
        inner
    } else {
        area
    }
}
