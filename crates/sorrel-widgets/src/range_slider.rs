//! Two-thumb range slider.
//!
//! The range is owned by the parent: [`RangeSlider`] implements
//! [`ControlledComponent`] with `Value = SliderRange`. Every accepted change
//! is reported as [`Message::Changed`] carrying the full new pair.
//!
//! A drag starts with a press on a thumb. While it lasts the slider declares
//! a document listener for pointer motion and release; the release ends the
//! drag and the listener goes away with it. Values are always clamped, never
//! rejected, and the moving thumb stops at the other one instead of crossing.

use crate::error::WidgetError;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use sorrel_core::command::Command;
use sorrel_core::component::ControlledComponent;
use sorrel_core::event::{press_position, InputEvent};
use sorrel_core::subscription::Subscription;
use sorrel_core::subscriptions::{document_events, listener_key};
use std::cell::Cell;

// Absorbs float noise when deciding ties and counting whole steps.
const EPSILON: f64 = 1e-9;

/// The two thumb values, `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub low: f64,
    pub high: f64,
}

impl SliderRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn get(&self, thumb: Thumb) -> f64 {
        match thumb {
            Thumb::Low => self.low,
            Thumb::High => self.high,
        }
    }

    fn with(self, thumb: Thumb, value: f64) -> Self {
        match thumb {
            Thumb::Low => Self { low: value, ..self },
            Thumb::High => Self {
                high: value,
                ..self
            },
        }
    }
}

/// Which thumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumb {
    /// Thumb 0.
    Low,
    /// Thumb 1.
    High,
}

impl Thumb {
    pub fn index(self) -> usize {
        match self {
            Thumb::Low => 0,
            Thumb::High => 1,
        }
    }

    fn other(self) -> Self {
        match self {
            Thumb::Low => Thumb::High,
            Thumb::High => Thumb::Low,
        }
    }
}

/// Messages for the range slider.
#[derive(Debug, Clone)]
pub enum Message {
    /// A pointer event routed to the slider (presses start drags).
    Pointer(MouseEvent),
    /// An event from the drag listener.
    Document(InputEvent),
    /// A key press routed to the slider.
    KeyPress(KeyEvent),
    /// Emitted with the full pair after every accepted change.
    Changed(SliderRange),
}

/// Which thumb a press grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grab {
    Thumb(Thumb),
    /// Both thumbs share the pressed cell; the first motion decides.
    Either,
}

/// Visual style configuration for the [`RangeSlider`].
#[derive(Debug, Clone)]
pub struct SliderStyle {
    pub track: Style,
    /// Segment between the thumbs.
    pub range: Style,
    pub thumb: Style,
    /// The thumb being dragged or holding keyboard focus.
    pub active_thumb: Style,
}

impl Default for SliderStyle {
    fn default() -> Self {
        Self {
            track: Style::default().fg(Color::DarkGray),
            range: Style::default().fg(Color::Blue),
            thumb: Style::default().fg(Color::White),
            active_thumb: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        }
    }
}

/// A controlled slider selecting a sub-range of `[min, max]`.
pub struct RangeSlider {
    id: u64,
    min: f64,
    max: f64,
    step: f64,
    grab: Option<Grab>,
    keyboard_thumb: Thumb,
    focus: bool,
    style: SliderStyle,
    track: Cell<Option<Rect>>,
}

impl RangeSlider {
    /// Create a slider over `[min, max]` moving in multiples of `step`.
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self, WidgetError> {
        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(WidgetError::NonFinite { min, max, step });
        }
        if min >= max {
            return Err(WidgetError::EmptyRange { min, max });
        }
        if step <= 0.0 {
            return Err(WidgetError::InvalidStep(step));
        }
        Ok(Self {
            id: listener_key(),
            min,
            max,
            step,
            grab: None,
            keyboard_thumb: Thumb::Low,
            focus: false,
            style: SliderStyle::default(),
            track: Cell::new(None),
        })
    }

    pub fn with_style(mut self, style: SliderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Whether a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    /// The thumb being dragged, once known.
    pub fn active_thumb(&self) -> Option<Thumb> {
        match self.grab {
            Some(Grab::Thumb(thumb)) => Some(thumb),
            _ => None,
        }
    }

    pub fn focus(&mut self) {
        self.focus = true;
    }

    pub fn blur(&mut self) {
        self.focus = false;
    }

    /// The largest value reachable in whole steps from `min`.
    pub fn max_reachable(&self) -> f64 {
        let steps = ((self.max - self.min) / self.step + EPSILON).floor();
        self.min + steps * self.step
    }

    /// Snap `raw` to the nearest `min + n * step`, ties going to the lower
    /// multiple, then clamp into `[min, max_reachable]`.
    pub fn quantize(&self, raw: f64) -> f64 {
        let n = (raw - self.min) / self.step;
        let lower = n.floor();
        let k = if n - lower > 0.5 + EPSILON {
            lower + 1.0
        } else {
            lower
        };
        (self.min + k * self.step).clamp(self.min, self.max_reachable())
    }

    /// Map a fractional track position to a value. `fraction` is clamped
    /// to `[0, 1]`.
    pub fn value_at_fraction(&self, fraction: f64) -> f64 {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.quantize(self.min + fraction * (self.max - self.min))
    }

    /// The value under `column` of the track last rendered. Columns past
    /// either end clamp to that end.
    pub fn value_at(&self, column: u16) -> Option<f64> {
        let track = self.track.get()?;
        let span = f64::from(track.width.saturating_sub(1).max(1));
        let offset = f64::from(column) - f64::from(track.x);
        Some(self.value_at_fraction(offset / span))
    }

    /// Bring an externally supplied pair onto the grid and into order.
    pub fn normalize(&self, range: SliderRange) -> SliderRange {
        let low = self.quantize(range.low);
        let high = self.quantize(range.high).max(low);
        SliderRange { low, high }
    }

    /// Move `thumb` to `target`, clamped so it never crosses the other one.
    fn constrain(&self, range: SliderRange, thumb: Thumb, target: f64) -> SliderRange {
        let target = self.quantize(target);
        let target = match thumb {
            Thumb::Low => target.min(range.high),
            Thumb::High => target.max(range.low),
        };
        range.with(thumb, target)
    }

    fn commit(&self, current: SliderRange, next: SliderRange) -> Command<Message> {
        if next == current {
            Command::none()
        } else {
            Command::message(Message::Changed(next))
        }
    }

    fn column_of(&self, track: Rect, value: f64) -> u16 {
        let span = f64::from(track.width.saturating_sub(1));
        let fraction = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        track.x + (fraction * span).round() as u16
    }

    fn start_drag(&mut self, mouse: &MouseEvent, range: SliderRange) {
        let Some(at) = press_position(mouse) else {
            return;
        };
        let Some(track) = self.track.get() else {
            return;
        };
        if !track.contains(at) {
            return;
        }
        let range = self.normalize(range);
        let low = self.column_of(track, range.low);
        let high = self.column_of(track, range.high);
        let grab = match (at.x == low, at.x == high) {
            (true, true) => Grab::Either,
            (true, false) => Grab::Thumb(Thumb::Low),
            (false, true) => Grab::Thumb(Thumb::High),
            (false, false) => return,
        };
        tracing::debug!(slider = self.id, ?grab, "drag started");
        self.grab = Some(grab);
        if let Grab::Thumb(thumb) = grab {
            self.keyboard_thumb = thumb;
        }
    }

    fn drag_to(&mut self, column: u16, range: SliderRange) -> Command<Message> {
        let Some(target) = self.value_at(column) else {
            return Command::none();
        };
        let range = self.normalize(range);
        let thumb = match self.grab {
            Some(Grab::Thumb(thumb)) => thumb,
            Some(Grab::Either) => {
                let thumb = if target > range.high {
                    Thumb::High
                } else if target < range.low {
                    Thumb::Low
                } else {
                    return Command::none();
                };
                self.grab = Some(Grab::Thumb(thumb));
                self.keyboard_thumb = thumb;
                thumb
            }
            None => return Command::none(),
        };
        self.commit(range, self.constrain(range, thumb, target))
    }

    /// Apply motion or release to an active drag. The page may deliver the
    /// release directly when it lands before the listener is attached.
    fn follow(&mut self, mouse: &MouseEvent, range: SliderRange) -> Command<Message> {
        if self.grab.is_none() {
            return Command::none();
        }
        match mouse.kind {
            MouseEventKind::Drag(MouseButton::Left) => self.drag_to(mouse.column, range),
            MouseEventKind::Up(_) => {
                let cmd = self.drag_to(mouse.column, range);
                self.end_drag();
                cmd
            }
            _ => Command::none(),
        }
    }

    fn end_drag(&mut self) {
        if self.grab.take().is_some() {
            tracing::debug!(slider = self.id, "drag ended");
        }
    }

    fn handle_key(&mut self, key: KeyEvent, range: SliderRange) -> Command<Message> {
        let range = self.normalize(range);
        let thumb = self.keyboard_thumb;
        let current = range.get(thumb);
        let target = match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.keyboard_thumb = thumb.other();
                return Command::none();
            }
            KeyCode::Left | KeyCode::Down => current - self.step,
            KeyCode::Right | KeyCode::Up => current + self.step,
            KeyCode::Home => self.min,
            KeyCode::End => self.max,
            _ => return Command::none(),
        };
        self.commit(range, self.constrain(range, thumb, target))
    }
}

impl ControlledComponent for RangeSlider {
    type Message = Message;
    type Value = SliderRange;

    fn update(&mut self, msg: Message, range: &SliderRange) -> Command<Message> {
        match msg {
            Message::Pointer(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    self.start_drag(&mouse, *range);
                    Command::none()
                }
                _ => self.follow(&mouse, *range),
            },
            Message::Document(InputEvent::Pointer(mouse)) => self.follow(&mouse, *range),
            Message::KeyPress(key) if self.focus => self.handle_key(key, *range),
            _ => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, range: &SliderRange) {
        // keep one cell free on each side so thumbs at the ends stay visible
        let track = Rect::new(
            area.x.saturating_add(1),
            area.y,
            area.width.saturating_sub(2).max(1),
            area.height.min(1),
        );
        self.track.set(Some(track));
        if track.height == 0 {
            return;
        }

        let range = self.normalize(*range);
        let low = self.column_of(track, range.low);
        let high = self.column_of(track, range.high);
        let active = self
            .active_thumb()
            .or(self.focus.then_some(self.keyboard_thumb));

        let spans: Vec<Span> = (track.x..track.right())
            .map(|x| {
                if x == low || x == high {
                    let thumb = if x == low { Thumb::Low } else { Thumb::High };
                    let style = if active == Some(thumb) {
                        self.style.active_thumb
                    } else {
                        self.style.thumb
                    };
                    Span::styled("●", style)
                } else if x > low && x < high {
                    Span::styled("━", self.style.range)
                } else {
                    Span::styled("─", self.style.track)
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), track);
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        if self.grab.is_none() {
            return vec![];
        }
        vec![document_events(self.id, |event| {
            let gesture = matches!(
                &event,
                InputEvent::Pointer(mouse) if matches!(
                    mouse.kind,
                    MouseEventKind::Drag(_) | MouseEventKind::Up(_)
                )
            );
            gesture.then_some(Message::Document(event))
        })]
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use proptest::prelude::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    // Track of 101 columns at x = 1 maps column c to value c - 1.
    fn slider() -> RangeSlider {
        let slider = RangeSlider::new(0.0, 100.0, 10.0).unwrap();
        render(&slider, SliderRange::new(20.0, 80.0));
        slider
    }

    fn render(slider: &RangeSlider, range: SliderRange) -> String {
        let mut terminal = Terminal::new(TestBackend::new(103, 1)).unwrap();
        terminal
            .draw(|frame| slider.view(frame, frame.area(), &range))
            .unwrap();
        sorrel_core::testing::buffer_to_string(terminal.backend().buffer())
    }

    fn mouse(kind: MouseEventKind, column: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn press(column: u16) -> Message {
        Message::Pointer(mouse(MouseEventKind::Down(MouseButton::Left), column))
    }

    fn drag(column: u16) -> Message {
        Message::Document(InputEvent::Pointer(mouse(
            MouseEventKind::Drag(MouseButton::Left),
            column,
        )))
    }

    fn release(column: u16) -> Message {
        Message::Document(InputEvent::Pointer(mouse(
            MouseEventKind::Up(MouseButton::Left),
            column,
        )))
    }

    fn changed(cmd: Command<Message>) -> Option<SliderRange> {
        match cmd.into_message() {
            Some(Message::Changed(range)) => Some(range),
            _ => None,
        }
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert_eq!(
            RangeSlider::new(5.0, 5.0, 1.0).err(),
            Some(WidgetError::EmptyRange { min: 5.0, max: 5.0 })
        );
        assert_eq!(
            RangeSlider::new(0.0, 1.0, 0.0).err(),
            Some(WidgetError::InvalidStep(0.0))
        );
        assert!(matches!(
            RangeSlider::new(0.0, f64::INFINITY, 1.0),
            Err(WidgetError::NonFinite { .. })
        ));
    }

    #[test]
    fn quantize_ties_go_down() {
        let s = RangeSlider::new(0.0, 100.0, 10.0).unwrap();
        assert_eq!(s.quantize(55.0), 50.0);
        assert_eq!(s.quantize(55.000001), 60.0);
        assert_eq!(s.quantize(54.0), 50.0);
        assert_eq!(s.quantize(-20.0), 0.0);
        assert_eq!(s.quantize(140.0), 100.0);
        assert_eq!(s.value_at_fraction(0.55), 50.0);
    }

    #[test]
    fn max_reachable_stays_on_grid() {
        let s = RangeSlider::new(0.0, 95.0, 10.0).unwrap();
        assert_eq!(s.max_reachable(), 90.0);
        assert_eq!(s.quantize(95.0), 90.0);
    }

    #[test]
    fn dragging_low_thumb_to_55_commits_50() {
        let mut s = slider();
        let range = SliderRange::new(20.0, 80.0);
        s.update(press(21), &range);
        assert_eq!(s.active_thumb(), Some(Thumb::Low));
        assert_eq!(
            changed(s.update(drag(56), &range)),
            Some(SliderRange::new(50.0, 80.0))
        );
    }

    #[test]
    fn low_thumb_stops_at_high() {
        let mut s = slider();
        let range = SliderRange::new(20.0, 60.0);
        render(&s, range);
        s.update(press(21), &range);
        assert_eq!(
            changed(s.update(drag(95), &range)),
            Some(SliderRange::new(60.0, 60.0))
        );
    }

    #[test]
    fn high_thumb_stops_at_low() {
        let mut s = slider();
        let range = SliderRange::new(20.0, 80.0);
        s.update(press(81), &range);
        assert_eq!(
            changed(s.update(drag(0), &range)),
            Some(SliderRange::new(20.0, 20.0))
        );
    }

    #[test]
    fn positions_past_the_track_clamp() {
        let mut s = slider();
        let range = SliderRange::new(20.0, 80.0);
        s.update(press(81), &range);
        assert_eq!(
            changed(s.update(drag(200), &range)),
            Some(SliderRange::new(20.0, 100.0))
        );
    }

    #[test]
    fn unchanged_value_emits_nothing() {
        let mut s = slider();
        let range = SliderRange::new(20.0, 80.0);
        s.update(press(21), &range);
        assert!(s.update(drag(22), &range).is_none());
    }

    #[test]
    fn listener_scoped_to_drag() {
        let mut s = slider();
        let range = SliderRange::new(20.0, 80.0);
        assert!(s.subscriptions().is_empty());
        s.update(press(21), &range);
        assert_eq!(s.subscriptions().len(), 1);
        s.update(release(21), &range);
        assert!(!s.is_dragging());
        assert!(s.subscriptions().is_empty());
    }

    #[test]
    fn release_routed_by_the_page_ends_the_drag() {
        let mut s = slider();
        let range = SliderRange::new(20.0, 80.0);
        s.update(press(21), &range);
        let up = Message::Pointer(mouse(MouseEventKind::Up(MouseButton::Left), 21));
        s.update(up, &range);
        assert!(!s.is_dragging());
        assert!(s.subscriptions().is_empty());

        // hovering with no button held moves nothing
        let hover = Message::Document(InputEvent::Pointer(mouse(MouseEventKind::Moved, 61)));
        assert!(s.update(hover, &range).is_none());
    }

    #[test]
    fn buttonless_motion_during_drag_is_ignored() {
        let mut s = slider();
        let range = SliderRange::new(20.0, 80.0);
        s.update(press(21), &range);
        let hover = Message::Document(InputEvent::Pointer(mouse(MouseEventKind::Moved, 41)));
        assert!(s.update(hover, &range).is_none());
        assert!(s.is_dragging());
    }

    #[test]
    fn press_off_thumb_does_not_start_drag() {
        let mut s = slider();
        let range = SliderRange::new(20.0, 80.0);
        s.update(press(50), &range);
        assert!(!s.is_dragging());
        // motion without a drag is ignored
        assert!(s.update(drag(60), &range).is_none());
    }

    #[test]
    fn touching_thumbs_split_by_direction() {
        let mut s = slider();
        let range = SliderRange::new(50.0, 50.0);
        render(&s, range);
        s.update(press(51), &range);
        assert!(s.is_dragging());
        assert_eq!(s.active_thumb(), None);
        assert_eq!(
            changed(s.update(drag(71), &range)),
            Some(SliderRange::new(50.0, 70.0))
        );
        assert_eq!(s.active_thumb(), Some(Thumb::High));
    }

    #[test]
    fn keyboard_steps_and_bounds() {
        let mut s = slider();
        s.focus();
        let range = SliderRange::new(20.0, 80.0);
        let key = |code| Message::KeyPress(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(
            changed(s.update(key(KeyCode::Right), &range)),
            Some(SliderRange::new(30.0, 80.0))
        );
        assert_eq!(
            changed(s.update(key(KeyCode::End), &range)),
            Some(SliderRange::new(80.0, 80.0))
        );
        s.update(key(KeyCode::Tab), &range);
        assert_eq!(
            changed(s.update(key(KeyCode::Home), &range)),
            Some(SliderRange::new(20.0, 20.0))
        );
    }

    #[test]
    fn view_draws_thumbs_and_range() {
        let s = slider();
        let screen = render(&s, SliderRange::new(20.0, 80.0));
        let chars: Vec<char> = screen.chars().collect();
        assert_eq!(chars[21], '●');
        assert_eq!(chars[81], '●');
        assert_eq!(chars[50], '━');
        assert_eq!(chars[10], '─');
    }

    fn on_grid(s: &RangeSlider, v: f64) -> bool {
        let n = (v - s.min()) / s.step();
        (n - n.round()).abs() < 1e-6
    }

    proptest! {
        #[test]
        fn drags_preserve_order_bounds_and_grid(
            min in -50i32..50,
            width in 1i32..200,
            step in 1i32..40,
            start in (0u16..120, 0u16..120),
            grab_high in prop::bool::ANY,
            moves in prop::collection::vec(0u16..140, 1..30),
        ) {
            let (min, max, step) = (f64::from(min), f64::from(min + width), f64::from(step));
            let mut s = RangeSlider::new(min, max, step).unwrap();
            let mut range = s.normalize(SliderRange::new(
                min + f64::from(start.0.min(start.1)),
                min + f64::from(start.0.max(start.1)),
            ));
            render(&s, range);
            let thumb = if grab_high { Thumb::High } else { Thumb::Low };
            s.grab = Some(Grab::Thumb(thumb));

            for column in moves {
                if let Some(next) = changed(s.update(drag(column), &range)) {
                    range = next;
                }
                prop_assert!(min <= range.low);
                prop_assert!(range.low <= range.high);
                prop_assert!(range.high <= max);
                prop_assert!(on_grid(&s, range.low));
                prop_assert!(on_grid(&s, range.high));
            }
        }
    }
}
