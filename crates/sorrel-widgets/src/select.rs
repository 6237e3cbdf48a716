//! Single-value selector with a floating option list.
//!
//! The committed value is owned by the parent: [`Select`] implements
//! [`ControlledComponent`] with `Value = str`, so both `update` and `view`
//! receive the current value and the widget never stores a copy. Choosing an
//! option reports [`Message::ValueChanged`] and closes the list; the trigger
//! only shows the new value once the parent stores it and passes it back.
//!
//! The option list follows the [overlay](crate::overlay) protocol: while it
//! is open the select declares a dismissal listener, and the parent must
//! include it in its own subscriptions.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Page { fruit: String, picker: Select }
//!
//! enum Msg { Picker(select::Message) }
//!
//! fn update(&mut self, msg: Msg) -> Command<Msg> {
//!     match msg {
//!         Msg::Picker(select::Message::ValueChanged(v)) => {
//!             self.fruit = v;
//!             Command::none()
//!         }
//!         Msg::Picker(m) => self.picker.update(m, &self.fruit).map(Msg::Picker),
//!     }
//! }
//! ```

use crate::overlay::{anchor, render_overlay, Align, DismissReason, Overlay};
use crate::selection::Roving;
use crate::disclosure::DataState;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use sorrel_core::command::Command;
use sorrel_core::component::ControlledComponent;
use sorrel_core::event::{press_position, InputEvent};
use sorrel_core::subscription::Subscription;
use std::cell::Cell;
use unicode_width::UnicodeWidthStr;

/// One choice in a [`Select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// The value reported when this option is chosen.
    pub value: String,
    /// The text shown for this option.
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Messages for the select component.
#[derive(Debug, Clone)]
pub enum Message {
    /// Trigger activation: open when closed, close when open.
    Toggle,
    /// Open the option list.
    Open,
    /// Close the option list.
    Close,
    /// Choose the option at this index.
    Activate(usize),
    /// A key press routed to the select.
    KeyPress(KeyEvent),
    /// A pointer event routed to the select.
    Pointer(MouseEvent),
    /// An event from the dismissal listener.
    Document(InputEvent),
    /// Emitted with the chosen option's value.
    ValueChanged(String),
    /// Emitted whenever the option list closes.
    Dismissed(DismissReason),
}

/// Visual style configuration for the [`Select`] component.
#[derive(Debug, Clone)]
pub struct SelectStyle {
    /// Trigger text when a value is shown.
    pub value: Style,
    /// Trigger text when the placeholder is shown.
    pub placeholder: Style,
    /// Option rows.
    pub option: Style,
    /// The highlighted option row.
    pub highlighted: Style,
    /// Border of the option list.
    pub border: Style,
    /// Trigger text while focused.
    pub focused: Style,
}

impl Default for SelectStyle {
    fn default() -> Self {
        Self {
            value: Style::default(),
            placeholder: Style::default().fg(Color::DarkGray),
            option: Style::default(),
            highlighted: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::DarkGray),
            focused: Style::default().add_modifier(Modifier::UNDERLINED),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    trigger: Rect,
    content: Option<Rect>,
    /// Index of the option on the first visible row.
    first: usize,
}

/// A controlled single-value selector.
pub struct Select {
    options: Vec<SelectOption>,
    overlay: Overlay,
    highlight: Roving,
    placeholder: String,
    align: Align,
    style: SelectStyle,
    focus: bool,
    placement: Cell<Option<Placement>>,
}

impl Select {
    /// Create a select over `options`, closed and unfocused.
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            overlay: Overlay::new(),
            highlight: Roving::new(),
            placeholder: "Select...".to_string(),
            align: Align::Start,
            style: SelectStyle::default(),
            focus: false,
            placement: Cell::new(None),
        }
    }

    /// Set the text shown when the committed value is empty.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set where the option list sits relative to the trigger.
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_style(mut self, style: SelectStyle) -> Self {
        self.style = style;
        self
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    pub fn data_state(&self) -> DataState {
        self.overlay.data_state()
    }

    /// Index of the option holding the keyboard highlight, if any.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlight.cursor()
    }

    /// Whether the option at `index` is the committed one.
    pub fn is_selected(&self, index: usize, value: &str) -> bool {
        self.options.get(index).is_some_and(|o| o.value == value)
    }

    /// Give this select keyboard focus.
    pub fn focus(&mut self) {
        self.focus = true;
    }

    /// Remove keyboard focus and close the list if open.
    pub fn blur(&mut self) {
        self.focus = false;
        self.overlay.close(DismissReason::Programmatic);
    }

    fn open(&mut self, value: &str) -> Command<Message> {
        if self.overlay.open() {
            let committed = self.options.iter().position(|o| o.value == value);
            self.highlight.set(committed.or(if self.options.is_empty() {
                None
            } else {
                Some(0)
            }));
        }
        Command::none()
    }

    fn close(&mut self, reason: DismissReason) -> Command<Message> {
        if self.overlay.close(reason) {
            self.highlight.clear();
            Command::message(Message::Dismissed(reason))
        } else {
            Command::none()
        }
    }

    fn activate(&mut self, index: usize) -> Command<Message> {
        let Some(option) = self.options.get(index) else {
            panic!(
                "option index {index} used outside its Select ({} options)",
                self.options.len()
            );
        };
        tracing::debug!(value = %option.value, "select value chosen");
        Command::batch([
            Command::message(Message::ValueChanged(option.value.clone())),
            self.close(DismissReason::Commit),
        ])
    }

    fn handle_key(&mut self, key: KeyEvent, value: &str) -> Command<Message> {
        if !self.overlay.is_open() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down => self.open(value),
                _ => Command::none(),
            };
        }
        let len = self.options.len();
        match key.code {
            KeyCode::Up => {
                self.highlight.prev(len, |_| true);
                Command::none()
            }
            KeyCode::Down => {
                self.highlight.next(len, |_| true);
                Command::none()
            }
            KeyCode::Home => {
                self.highlight.first(len, |_| true);
                Command::none()
            }
            KeyCode::End => {
                self.highlight.last(len, |_| true);
                Command::none()
            }
            KeyCode::Enter | KeyCode::Char(' ') => match self.highlight.cursor() {
                Some(index) => self.activate(index),
                None => Command::none(),
            },
            KeyCode::Esc => self.close(DismissReason::Escape),
            KeyCode::Tab => self.close(DismissReason::Programmatic),
            _ => Command::none(),
        }
    }

    fn handle_pointer(&mut self, mouse: MouseEvent, value: &str) -> Command<Message> {
        let Some(placement) = self.placement.get() else {
            return Command::none();
        };
        let position = Position::new(mouse.column, mouse.row);

        if let Some(at) = press_position(&mouse) {
            if placement.trigger.contains(at) {
                return if self.overlay.is_open() {
                    self.close(DismissReason::Trigger)
                } else {
                    self.open(value)
                };
            }
            if let Some(index) = self.option_at(at) {
                return self.activate(index);
            }
            return Command::none();
        }

        if matches!(mouse.kind, MouseEventKind::Moved) {
            if let Some(index) = self.option_at(position) {
                self.highlight.set(Some(index));
            }
        }
        Command::none()
    }

    fn option_at(&self, position: Position) -> Option<usize> {
        if !self.overlay.is_open() {
            return None;
        }
        let placement = self.placement.get()?;
        let content = placement.content?;
        let inner = Block::default().borders(Borders::ALL).inner(content);
        if !inner.contains(position) {
            return None;
        }
        let index = placement.first + usize::from(position.y - inner.y);
        (index < self.options.len()).then_some(index)
    }

    fn inside_regions(&self) -> Vec<Rect> {
        match self.placement.get() {
            Some(p) => std::iter::once(p.trigger).chain(p.content).collect(),
            None => Vec::new(),
        }
    }

    fn content_size(&self, trigger: Rect) -> (u16, u16) {
        let widest = self
            .options
            .iter()
            .map(|o| o.label.width())
            .max()
            .unwrap_or(0);
        // marker column, padding, borders
        let width = u16::try_from(widest)
            .unwrap_or(u16::MAX)
            .saturating_add(6)
            .max(trigger.width);
        let height = u16::try_from(self.options.len())
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        (width, height)
    }
}

impl ControlledComponent for Select {
    type Message = Message;
    type Value = str;

    fn update(&mut self, msg: Message, value: &str) -> Command<Message> {
        match msg {
            Message::Toggle => {
                if self.overlay.is_open() {
                    self.close(DismissReason::Trigger)
                } else {
                    self.open(value)
                }
            }
            Message::Open => self.open(value),
            Message::Close => self.close(DismissReason::Programmatic),
            Message::Activate(index) => self.activate(index),
            Message::KeyPress(key) if self.focus || self.overlay.is_open() => {
                self.handle_key(key, value)
            }
            Message::Pointer(mouse) => self.handle_pointer(mouse, value),
            Message::Document(event) if self.overlay.is_open() => {
                match Overlay::dismissal(&event, &self.inside_regions()) {
                    Some(reason) => self.close(reason),
                    None => Command::none(),
                }
            }
            _ => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, value: &str) {
        let trigger = Rect { height: area.height.min(1), ..area };

        let shown = self
            .options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
            .or((!value.is_empty()).then_some(value));
        let text = match shown {
            Some(label) => Span::styled(label, self.style.value),
            None => Span::styled(self.placeholder.as_str(), self.style.placeholder),
        };
        let text = if self.focus {
            text.patch_style(self.style.focused)
        } else {
            text
        };
        let arrow = if self.overlay.is_open() { " ▾" } else { " ▸" };
        let line = Line::from(vec![
            text,
            Span::styled(arrow, Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), trigger);

        if !self.overlay.is_open() {
            self.placement.set(Some(Placement {
                trigger,
                content: None,
                first: 0,
            }));
            return;
        }

        let (width, height) = self.content_size(trigger);
        let content = anchor(trigger, width, height, self.align, frame.area());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.style.border);
        let inner = render_overlay(frame, content, Some(&block));

        // scroll so the highlighted option stays on screen
        let visible = usize::from(inner.height);
        let previous = self.placement.get().map_or(0, |p| p.first);
        let first = self
            .highlight
            .window_start(previous, visible, self.options.len());
        for (i, option) in self.options.iter().enumerate().skip(first).take(visible) {
            let row = Rect {
                y: inner.y + (i - first) as u16,
                height: 1,
                ..inner
            };
            let marker = if option.value == value { "✓ " } else { "  " };
            let style = if self.highlight.cursor() == Some(i) {
                self.style.highlighted
            } else {
                self.style.option
            };
            let line = Line::from(vec![
                Span::raw(marker),
                Span::styled(option.label.as_str(), style),
            ]);
            frame.render_widget(Paragraph::new(line), row);
        }

        self.placement.set(Some(Placement {
            trigger,
            content: Some(content),
            first,
        }));
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        self.overlay
            .listener(Message::Document)
            .into_iter()
            .collect()
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use sorrel_core::testing::buffer_to_string;

    fn fruits() -> Select {
        Select::new(vec![
            SelectOption::new("apple", "Apple"),
            SelectOption::new("banana", "Banana"),
            SelectOption::new("cherry", "Cherry"),
        ])
        .with_placeholder("Pick a fruit")
    }

    fn render(select: &Select, value: &str) -> String {
        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        terminal
            .draw(|frame| select.view(frame, Rect::new(2, 1, 16, 1), value))
            .unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    fn key(code: KeyCode) -> Message {
        Message::KeyPress(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        mouse(MouseEventKind::Down(MouseButton::Left), column, row)
    }

    #[test]
    fn placeholder_when_value_empty() {
        let select = fruits();
        assert!(render(&select, "").contains("Pick a fruit"));
        assert!(render(&select, "banana").contains("Banana"));
    }

    #[test]
    fn activation_reports_value_then_closes() {
        let mut select = fruits();
        select.update(Message::Open, "");
        let msgs = select.update(Message::Activate(1), "").into_messages();
        assert!(matches!(&msgs[0], Message::ValueChanged(v) if v == "banana"));
        assert!(matches!(msgs[1], Message::Dismissed(DismissReason::Commit)));
        assert!(!select.is_open());
    }

    #[test]
    fn reselecting_committed_value_still_reports_and_closes() {
        let mut select = fruits();
        select.update(Message::Open, "banana");
        let msgs = select.update(Message::Activate(1), "banana").into_messages();
        assert!(matches!(&msgs[0], Message::ValueChanged(v) if v == "banana"));
        assert!(!select.is_open());
    }

    #[test]
    fn view_never_reflects_an_uncommitted_choice() {
        let mut select = fruits();
        select.update(Message::Open, "apple");
        select.update(Message::Activate(2), "apple");
        // The parent has not stored "cherry" yet.
        let screen = render(&select, "apple");
        assert!(screen.contains("Apple"));
        assert!(!screen.contains("Cherry"));
    }

    #[test]
    fn outside_press_closes_without_value_change() {
        let mut select = fruits();
        select.update(Message::Open, "apple");
        render(&select, "apple");

        let msgs = select
            .update(
                Message::Document(InputEvent::Pointer(click(28, 9))),
                "apple",
            )
            .into_messages();
        assert_eq!(msgs.len(), 1);
        assert!(matches!(
            msgs[0],
            Message::Dismissed(DismissReason::OutsideInteraction)
        ));
        assert!(!select.is_open());
    }

    #[test]
    fn press_inside_content_is_not_a_dismissal() {
        let mut select = fruits();
        select.update(Message::Open, "apple");
        render(&select, "apple");
        let cmd = select.update(Message::Document(InputEvent::Pointer(click(4, 3))), "apple");
        assert!(cmd.is_none());
        assert!(select.is_open());
    }

    #[test]
    fn escape_from_listener_closes() {
        let mut select = fruits();
        select.update(Message::Open, "");
        let esc = InputEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        let msgs = select.update(Message::Document(esc), "").into_messages();
        assert!(matches!(msgs[0], Message::Dismissed(DismissReason::Escape)));
    }

    #[test]
    fn listener_only_while_open() {
        let mut select = fruits();
        assert!(select.subscriptions().is_empty());
        select.update(Message::Toggle, "");
        assert_eq!(select.subscriptions().len(), 1);
        select.update(Message::Toggle, "");
        assert!(select.subscriptions().is_empty());
    }

    #[test]
    fn clicking_trigger_toggles() {
        let mut select = fruits();
        render(&select, "");
        select.update(Message::Pointer(click(3, 1)), "");
        assert!(select.is_open());
        render(&select, "");
        let msgs = select.update(Message::Pointer(click(3, 1)), "").into_messages();
        assert!(matches!(msgs[0], Message::Dismissed(DismissReason::Trigger)));
    }

    #[test]
    fn clicking_an_option_commits_it() {
        let mut select = fruits();
        select.update(Message::Open, "");
        render(&select, "");
        // content starts below the trigger at row 2, first option on row 3
        let msgs = select.update(Message::Pointer(click(5, 5)), "").into_messages();
        assert!(matches!(&msgs[0], Message::ValueChanged(v) if v == "cherry"));
    }

    #[test]
    fn keyboard_flow() {
        let mut select = fruits();
        select.focus();
        select.update(key(KeyCode::Enter), "banana");
        assert!(select.is_open());
        assert_eq!(select.highlighted(), Some(1));
        select.update(key(KeyCode::Down), "banana");
        assert_eq!(select.highlighted(), Some(2));
        let msgs = select.update(key(KeyCode::Enter), "banana").into_messages();
        assert!(matches!(&msgs[0], Message::ValueChanged(v) if v == "cherry"));
        assert!(!select.is_open());
    }

    #[test]
    fn short_list_scrolls_to_keep_the_highlight_visible() {
        let mut select = fruits();
        select.focus();
        select.update(key(KeyCode::Enter), "");
        // five rows leave room for a single option row under the trigger
        let short = |select: &Select| {
            let mut terminal = Terminal::new(TestBackend::new(30, 5)).unwrap();
            terminal
                .draw(|frame| select.view(frame, Rect::new(2, 1, 16, 1), ""))
                .unwrap();
            buffer_to_string(terminal.backend().buffer())
        };
        assert!(short(&select).contains("Apple"));

        select.update(key(KeyCode::Down), "");
        select.update(key(KeyCode::Down), "");
        let screen = short(&select);
        assert!(screen.contains("Cherry"));
        assert!(!screen.contains("Apple"));

        // the visible row maps back to the option it shows
        let msgs = select.update(Message::Pointer(click(5, 3)), "").into_messages();
        assert!(matches!(&msgs[0], Message::ValueChanged(v) if v == "cherry"));
    }

    #[test]
    fn committed_option_is_marked() {
        let mut select = fruits();
        select.update(Message::Open, "banana");
        let screen = render(&select, "banana");
        assert!(screen.contains("✓ Banana"));
        assert!(select.is_selected(1, "banana"));
        assert!(!select.is_selected(0, "banana"));
    }

    #[test]
    #[should_panic(expected = "used outside its Select")]
    fn activating_unknown_option_panics() {
        let mut select = fruits();
        select.update(Message::Activate(9), "");
    }
}
