//! Transient notifications with per-entry expiry.
//!
//! One [`Toaster`] per application, owned by the root model, so every
//! notification lands in the same corner of the screen no matter which page
//! raised it. Entries keep insertion order; removing one never reorders the
//! rest.
//!
//! Every entry holds an [`ExpiryTimer`]. The toaster declares one keyed
//! timer subscription per live entry, so removing an entry by either path
//! also stops declaring its timer and the runtime aborts it on the next
//! reconcile. An expiry that still arrives for an entry that is gone, or
//! before its deadline, changes nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! // from anywhere with a ProgramHandle
//! handle.send(Msg::Toasts(toast::Message::Push(
//!     Toast::new().title("Saved").description("Draft stored."),
//! )));
//! ```

use crossterm::event::MouseEvent;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use sorrel_core::command::Command;
use sorrel_core::component::Component;
use sorrel_core::event::press_position;
use sorrel_core::subscription::{subscribe, Subscription};
use sorrel_core::subscriptions::After;
use std::cell::RefCell;
use std::fmt;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

use crate::overlay::render_overlay;

/// How long an entry stays up unless dismissed first.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

/// Identity of one notification. Never reused within a [`Toaster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

/// Content of a notification before it is pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toast {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Label of an optional action button, shown under the text.
    pub action: Option<String>,
    pub variant: Variant,
}

impl Toast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an action button. Pressing it reports [`Message::Action`]; the
    /// entry stays up until the parent dismisses it.
    pub fn action(mut self, label: impl Into<String>) -> Self {
        self.action = Some(label.into());
        self
    }

    pub fn destructive(mut self) -> Self {
        self.variant = Variant::Destructive;
        self
    }
}

/// The pending expiry of one entry.
///
/// Holding the handle is what keeps the timer alive: the toaster declares
/// its subscription only while the entry exists.
#[derive(Debug)]
pub struct ExpiryTimer {
    id: ToastId,
    duration: Duration,
    deadline: Instant,
}

impl ExpiryTimer {
    fn start(id: ToastId, duration: Duration, now: Instant) -> Self {
        Self {
            id,
            duration,
            deadline: now + duration,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether a firing at `at` is on time.
    pub fn is_due(&self, at: Instant) -> bool {
        at >= self.deadline
    }

    fn subscription(&self) -> Subscription<Message> {
        let id = self.id;
        subscribe(After::new(self.duration).keyed(id.0)).map(move |at| Message::Expired { id, at })
    }
}

/// A live notification.
#[derive(Debug)]
pub struct ToastEntry {
    id: ToastId,
    toast: Toast,
    created_at: Instant,
    timer: ExpiryTimer,
}

impl ToastEntry {
    pub fn id(&self) -> ToastId {
        self.id
    }

    pub fn toast(&self) -> &Toast {
        &self.toast
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn timer(&self) -> &ExpiryTimer {
        &self.timer
    }
}

/// Messages for the toaster.
#[derive(Debug, Clone)]
pub enum Message {
    /// Append a notification.
    Push(Toast),
    /// Remove a notification now.
    Dismiss(ToastId),
    /// An entry's timer fired at `at`.
    Expired { id: ToastId, at: Instant },
    /// A pointer event routed to the toaster (close and action buttons).
    Pointer(MouseEvent),
    /// The entry's action button was pressed.
    Action(ToastId),
}

/// Visual style configuration for the [`Toaster`].
#[derive(Debug, Clone)]
pub struct ToastStyle {
    pub border: Style,
    pub destructive_border: Style,
    pub title: Style,
    pub description: Style,
    pub close: Style,
    pub action: Style,
}

impl Default for ToastStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::Gray),
            destructive_border: Style::default().fg(Color::Red),
            title: Style::default().add_modifier(Modifier::BOLD),
            description: Style::default().fg(Color::Gray),
            close: Style::default().fg(Color::DarkGray),
            action: Style::default().add_modifier(Modifier::REVERSED),
        }
    }
}

/// The application-wide notification queue.
pub struct Toaster {
    entries: Vec<ToastEntry>,
    next_id: u64,
    duration: Duration,
    width: u16,
    style: ToastStyle,
    close_buttons: RefCell<Vec<(ToastId, Rect)>>,
    action_buttons: RefCell<Vec<(ToastId, Rect)>>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            duration: DEFAULT_DURATION,
            width: 40,
            style: ToastStyle::default(),
            close_buttons: RefCell::new(Vec::new()),
            action_buttons: RefCell::new(Vec::new()),
        }
    }

    /// Set how long entries stay up.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the width of each notification box.
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width.max(8);
        self
    }

    pub fn with_style(mut self, style: ToastStyle) -> Self {
        self.style = style;
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Live entries, oldest first.
    pub fn entries(&self) -> &[ToastEntry] {
        &self.entries
    }

    pub fn get(&self, id: ToastId) -> Option<&ToastEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `toast` and start its timer.
    pub fn push(&mut self, toast: Toast) -> ToastId {
        let id = ToastId(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, title = ?toast.title, "toast pushed");
        let now = Instant::now();
        self.entries.push(ToastEntry {
            id,
            toast,
            created_at: now,
            timer: ExpiryTimer::start(id, self.duration, now),
        });
        id
    }

    /// Remove the entry now, dropping its timer. Returns `false` if no such
    /// entry exists.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        match self.remove(id) {
            Some(_) => {
                tracing::debug!(%id, "toast dismissed");
                true
            }
            None => false,
        }
    }

    /// Apply a timer firing. Returns whether the entry was removed.
    pub fn expire(&mut self, id: ToastId, at: Instant) -> bool {
        let due = self.get(id).is_some_and(|e| e.timer.is_due(at));
        if due {
            self.remove(id);
            tracing::debug!(%id, "toast expired");
        }
        due
    }

    fn remove(&mut self, id: ToastId) -> Option<ToastEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    fn box_height(toast: &Toast) -> u16 {
        let lines = toast.title.iter().count()
            + toast
                .description
                .as_deref()
                .map_or(0, |d| d.lines().count())
            + toast.action.iter().count();
        u16::try_from(lines.max(1))
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    }

    fn button_at(buttons: &RefCell<Vec<(ToastId, Rect)>>, at: Position) -> Option<ToastId> {
        buttons
            .borrow()
            .iter()
            .find(|(_, rect)| rect.contains(at))
            .map(|(id, _)| *id)
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Toaster {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Push(toast) => {
                self.push(toast);
            }
            Message::Dismiss(id) => {
                self.dismiss(id);
            }
            Message::Expired { id, at } => {
                self.expire(id, at);
            }
            Message::Pointer(mouse) => {
                let Some(at) = press_position(&mouse) else {
                    return Command::none();
                };
                if let Some(id) = Self::button_at(&self.close_buttons, at) {
                    self.dismiss(id);
                } else if let Some(id) = Self::button_at(&self.action_buttons, at) {
                    return Command::message(Message::Action(id));
                }
            }
            Message::Action(_) => {}
        }
        Command::none()
    }

    /// Stack entries in the bottom-right corner of `area`, oldest on top.
    /// When they do not all fit, the oldest are left out.
    fn view(&self, frame: &mut Frame, area: Rect) {
        let mut buttons = self.close_buttons.borrow_mut();
        buttons.clear();
        let mut actions = self.action_buttons.borrow_mut();
        actions.clear();

        let width = self.width.min(area.width);
        let mut visible = Vec::new();
        let mut height = 0u16;
        for entry in self.entries.iter().rev() {
            let h = Self::box_height(&entry.toast);
            if height.saturating_add(h) > area.height {
                break;
            }
            height += h;
            visible.push((entry, h));
        }

        let x = area.right() - width;
        let mut y = area.bottom() - height;
        for (entry, h) in visible.into_iter().rev() {
            let rect = Rect::new(x, y, width, h);
            let border = match entry.toast.variant {
                Variant::Default => self.style.border,
                Variant::Destructive => self.style.destructive_border,
            };
            let block = Block::default().borders(Borders::ALL).border_style(border);
            let inner = render_overlay(frame, rect, Some(&block));

            let mut lines = Vec::new();
            if let Some(title) = &entry.toast.title {
                lines.push(Line::styled(title.as_str(), self.style.title));
            }
            if let Some(description) = &entry.toast.description {
                lines.extend(
                    description
                        .lines()
                        .map(|l| Line::styled(l, self.style.description)),
                );
            }
            let text_area = Rect {
                width: inner.width.saturating_sub(2),
                ..inner
            };
            frame.render_widget(Paragraph::new(lines), text_area);

            if let Some(label) = &entry.toast.action {
                let text = format!("[{label}]");
                let text_width = u16::try_from(text.width()).unwrap_or(u16::MAX);
                let button = Rect::new(
                    inner.x,
                    inner.bottom().saturating_sub(1),
                    text_width.min(text_area.width),
                    1,
                );
                frame.render_widget(Paragraph::new(text).style(self.style.action), button);
                actions.push((entry.id, button));
            }

            if inner.width >= 1 {
                let close = Rect::new(inner.right() - 1, inner.y, 1, 1);
                frame.render_widget(Paragraph::new("×").style(self.style.close), close);
                buttons.push((entry.id, close));
            }
            y += h;
        }
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        self.entries.iter().map(|e| e.timer.subscription()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEventKind};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use sorrel_core::testing::buffer_to_string;

    fn titles(toaster: &Toaster) -> Vec<&str> {
        toaster
            .entries()
            .iter()
            .filter_map(|e| e.toast().title.as_deref())
            .collect()
    }

    fn render(toaster: &Toaster) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|frame| toaster.view(frame, frame.area()))
            .unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    #[test]
    fn dismissing_keeps_remaining_order() {
        let mut toaster = Toaster::new();
        toaster.push(Toast::new().title("A"));
        let b = toaster.push(Toast::new().title("B"));
        toaster.push(Toast::new().title("C"));
        assert!(toaster.dismiss(b));
        assert_eq!(titles(&toaster), vec!["A", "C"]);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut toaster = Toaster::new();
        let a = toaster.push(Toast::new());
        toaster.dismiss(a);
        let b = toaster.push(Toast::new());
        assert!(b > a);
    }

    #[test]
    fn dismissing_unknown_id_is_a_noop() {
        let mut toaster = Toaster::new();
        let a = toaster.push(Toast::new().title("A"));
        assert!(toaster.dismiss(a));
        assert!(!toaster.dismiss(a));
        assert!(toaster.is_empty());
    }

    #[test]
    fn expiry_waits_for_the_deadline() {
        let mut toaster = Toaster::new();
        let a = toaster.push(Toast::new().title("A"));
        let deadline = toaster.get(a).unwrap().timer().deadline();
        assert_eq!(
            deadline,
            toaster.get(a).unwrap().created_at() + DEFAULT_DURATION
        );

        assert!(!toaster.expire(a, deadline - Duration::from_millis(1)));
        assert_eq!(toaster.len(), 1);
        assert!(toaster.expire(a, deadline));
        assert!(toaster.is_empty());
    }

    #[test]
    fn late_expiry_after_dismiss_changes_nothing() {
        let mut toaster = Toaster::new();
        let a = toaster.push(Toast::new().title("A"));
        let deadline = toaster.get(a).unwrap().timer().deadline();
        toaster.push(Toast::new().title("B"));
        toaster.dismiss(a);
        toaster.update(Message::Expired {
            id: a,
            at: deadline + Duration::from_secs(1),
        });
        assert_eq!(titles(&toaster), vec!["B"]);
    }

    #[test]
    fn one_keyed_timer_per_live_entry() {
        let mut toaster = Toaster::new().with_duration(Duration::from_secs(2));
        let a = toaster.push(Toast::new());
        let b = toaster.push(Toast::new());
        let ids: Vec<u64> = toaster
            .subscriptions()
            .iter()
            .map(|s| s.id().discriminant())
            .collect();
        assert_eq!(ids, vec![a.get(), b.get()]);

        toaster.dismiss(a);
        let ids: Vec<u64> = toaster
            .subscriptions()
            .iter()
            .map(|s| s.id().discriminant())
            .collect();
        assert_eq!(ids, vec![b.get()]);
    }

    #[test]
    fn push_message_appends() {
        let mut toaster = Toaster::new();
        toaster.update(Message::Push(Toast::new().title("Saved")));
        assert_eq!(titles(&toaster), vec!["Saved"]);
    }

    #[test]
    fn renders_bottom_right_in_insertion_order() {
        let mut toaster = Toaster::new().with_width(20);
        toaster.push(Toast::new().title("First"));
        toaster.push(Toast::new().title("Second").description("details"));
        let screen = render(&toaster);
        let first = screen.find("First").unwrap();
        let second = screen.find("Second").unwrap();
        assert!(first < second);
        assert!(screen.contains("details"));
        assert!(screen.contains('×'));
        let last_row = screen.lines().last().unwrap();
        assert!(last_row.trim_end().ends_with('┘'));
    }

    #[test]
    fn clicking_close_dismisses() {
        let mut toaster = Toaster::new().with_width(20);
        toaster.push(Toast::new().title("Only"));
        render(&toaster);
        // box is 20 wide at the right edge of 60 columns and 3 rows high at the bottom
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 58,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        toaster.update(Message::Pointer(click));
        assert!(toaster.is_empty());
    }

    #[test]
    fn clicking_action_reports_without_dismissing() {
        let mut toaster = Toaster::new().with_width(20);
        let id = toaster.push(Toast::new().title("Deleted").action("Undo"));
        let screen = render(&toaster);
        assert!(screen.contains("[Undo]"));
        // 4 rows high at the bottom: the action sits on row 10 from column 41
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 43,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        let reported = toaster.update(Message::Pointer(click)).into_message();
        assert!(matches!(reported, Some(Message::Action(got)) if got == id));
        assert_eq!(toaster.len(), 1);

        // the close control still dismisses
        let close = MouseEvent {
            column: 58,
            row: 9,
            ..click
        };
        assert!(toaster.update(Message::Pointer(close)).is_none());
        assert!(toaster.is_empty());
    }

    #[test]
    fn huge_description_saturates_instead_of_overflowing() {
        let toast = Toast::new().description("line\n".repeat(70_000));
        assert_eq!(Toaster::box_height(&toast), u16::MAX);

        let mut toaster = Toaster::new().with_width(20);
        toaster.push(Toast::new().title("kept"));
        toaster.push(toast);
        let screen = render(&toaster);
        assert!(!screen.contains("line"));
    }

    #[test]
    fn oldest_entries_drop_out_when_space_runs_out() {
        let mut toaster = Toaster::new().with_width(20);
        for title in ["one", "two", "three", "four", "five"] {
            toaster.push(Toast::new().title(title));
        }
        let screen = render(&toaster);
        assert!(!screen.contains("one"));
        assert!(screen.contains("five"));
        assert!(screen.contains("two"));
    }
}
