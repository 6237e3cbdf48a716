//! Tab strip selecting one panel by value.
//!
//! Uncontrolled tabs ([`Tabs::new`]) keep their own selection and report each
//! change with [`Message::Select`]. Controlled tabs ([`Tabs::controlled`])
//! never change their selection on input: they only report the requested
//! value, and the page decides whether to pass it back with
//! [`Tabs::set_value`].
//!
//! ```rust,ignore
//! Msg::Tabs(tabs::Message::Select(v)) if self.locked => Command::none(),
//! Msg::Tabs(tabs::Message::Select(v)) => {
//!     self.tabs.set_value(&v);
//!     Command::none()
//! }
//! ```

use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Tabs as TabStrip};
use ratatui::Frame;
use sorrel_core::command::Command;
use sorrel_core::component::Component;
use sorrel_core::event::press_position;
use std::cell::RefCell;
use unicode_width::UnicodeWidthStr;

/// One tab: the value it selects and the label shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem {
    pub value: String,
    pub label: String,
}

impl TabItem {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Messages for the tabs component.
#[derive(Debug, Clone)]
pub enum Message {
    /// A key press forwarded while focused.
    KeyPress(KeyEvent),
    /// A pointer event forwarded by the page.
    Pointer(MouseEvent),
    /// A tab was requested, carrying its value.
    Select(String),
}

/// Visual style configuration for the [`Tabs`] component.
#[derive(Debug, Clone)]
pub struct TabsStyle {
    pub normal: Style,
    pub selected: Style,
    pub border: Style,
    pub divider: String,
}

impl Default for TabsStyle {
    fn default() -> Self {
        Self {
            normal: Style::default().fg(Color::DarkGray),
            selected: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::DarkGray),
            divider: "|".to_string(),
        }
    }
}

/// A horizontal row of tabs with exactly one active value.
pub struct Tabs {
    items: Vec<TabItem>,
    value: String,
    controlled: bool,
    focus: bool,
    style: TabsStyle,
    hits: RefCell<Vec<Rect>>,
}

impl Tabs {
    /// Uncontrolled tabs starting on the first item.
    pub fn new(items: Vec<TabItem>) -> Self {
        let value = items.first().map(|i| i.value.clone()).unwrap_or_default();
        Self::build(items, value, false)
    }

    /// Controlled tabs showing `value`. Input only emits [`Message::Select`].
    ///
    /// # Panics
    ///
    /// Panics if `value` names no item.
    pub fn controlled(items: Vec<TabItem>, value: impl Into<String>) -> Self {
        let mut tabs = Self::build(items, String::new(), true);
        tabs.set_value(&value.into());
        tabs
    }

    fn build(items: Vec<TabItem>, value: String, controlled: bool) -> Self {
        Self {
            items,
            value,
            controlled,
            focus: false,
            style: TabsStyle::default(),
            hits: RefCell::new(Vec::new()),
        }
    }

    pub fn with_style(mut self, style: TabsStyle) -> Self {
        self.style = style;
        self
    }

    pub fn focus(&mut self) {
        self.focus = true;
    }

    pub fn blur(&mut self) {
        self.focus = false;
    }

    pub fn items(&self) -> &[TabItem] {
        &self.items
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// The active value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the panel for `value` should be shown.
    pub fn is_active(&self, value: &str) -> bool {
        self.value == value
    }

    /// Make `value` active.
    ///
    /// # Panics
    ///
    /// Panics if `value` names no item.
    pub fn set_value(&mut self, value: &str) {
        if self.position(value).is_none() {
            panic!("tab value `{value}` used outside its Tabs");
        }
        if self.value != value {
            tracing::debug!(from = %self.value, to = %value, "tab changed");
            self.value = value.to_string();
        }
    }

    fn position(&self, value: &str) -> Option<usize> {
        self.items.iter().position(|i| i.value == value)
    }

    fn request(&mut self, index: usize) -> Command<Message> {
        let Some(item) = self.items.get(index) else {
            return Command::none();
        };
        if item.value == self.value {
            return Command::none();
        }
        let value = item.value.clone();
        if !self.controlled {
            self.set_value(&value);
        }
        Command::message(Message::Select(value))
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<Message> {
        let len = self.items.len();
        if len == 0 {
            return Command::none();
        }
        let current = self.position(&self.value).unwrap_or(0);
        let target = match key.code {
            KeyCode::Left | KeyCode::Char('h') => (current + len - 1) % len,
            KeyCode::Right | KeyCode::Char('l') => (current + 1) % len,
            KeyCode::Home => 0,
            KeyCode::End => len - 1,
            KeyCode::Char(c) => match c.to_digit(10) {
                Some(n) if n >= 1 && (n as usize) <= len => n as usize - 1,
                _ => return Command::none(),
            },
            _ => return Command::none(),
        };
        self.request(target)
    }
}

impl Component for Tabs {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::KeyPress(key) if self.focus => self.handle_key(key),
            Message::KeyPress(_) => Command::none(),
            Message::Pointer(mouse) => {
                let Some(at) = press_position(&mouse) else {
                    return Command::none();
                };
                let hit = self.hits.borrow().iter().position(|r| r.contains(at));
                match hit {
                    Some(index) => self.request(index),
                    None => Command::none(),
                }
            }
            Message::Select(value) => {
                if !self.controlled {
                    self.set_value(&value);
                }
                Command::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(self.style.border);
        let inner = block.inner(area);

        // Mirror the strip's layout: " label " segments joined by the divider.
        let mut hits = self.hits.borrow_mut();
        hits.clear();
        let divider = self.style.divider.width() as u16;
        let mut x = inner.x;
        for item in &self.items {
            if x >= inner.right() {
                break;
            }
            let width = (item.label.width() as u16 + 2).min(inner.right() - x);
            hits.push(Rect::new(x, inner.y, width, 1));
            x = x.saturating_add(width).saturating_add(divider);
        }

        let titles: Vec<Line> = self.items.iter().map(|i| Line::raw(i.label.as_str())).collect();
        let strip = TabStrip::new(titles)
            .block(block)
            .select(self.position(&self.value).unwrap_or(0))
            .style(self.style.normal)
            .highlight_style(self.style.selected)
            .padding(" ", " ")
            .divider(self.style.divider.as_str());
        frame.render_widget(strip, area);
    }

    fn focused(&self) -> bool {
        self.focus
    }
}
