//! Centered dialog built on the [overlay](crate::overlay) protocol.
//!
//! A [`Modal`] is hidden until [`Modal::show`]. While visible it declares a
//! dismissal listener, so Escape or a press on the backdrop (anywhere outside
//! the dialog box) closes it and reports [`Message::Dismiss`]. Choosing an
//! action closes it with [`Message::Select`].
//!
//! ```rust,ignore
//! let confirm = Modal::new("Discard draft?")
//!     .description("This cannot be undone.")
//!     .body("The draft has unsaved edits.")
//!     .action(Action::new("Discard").with_shortcut('d'))
//!     .action(Action::new("Keep").with_shortcut('k'));
//! ```

use crate::disclosure::DataState;
use crate::overlay::{centered_fixed, render_overlay, DismissReason, Overlay};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use sorrel_core::command::Command;
use sorrel_core::component::Component;
use sorrel_core::event::{press_position, InputEvent};
use sorrel_core::subscription::Subscription;
use std::cell::{Cell, RefCell};
use unicode_width::UnicodeWidthStr;

/// A button in the dialog.
#[derive(Debug, Clone)]
pub struct Action {
    pub label: String,
    pub shortcut: Option<char>,
}

impl Action {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            shortcut: None,
        }
    }

    /// Set a shortcut key, shown before the label.
    pub fn with_shortcut(mut self, key: char) -> Self {
        self.shortcut = Some(key.to_ascii_lowercase());
        self
    }

    fn text(&self) -> String {
        match self.shortcut {
            Some(key) => format!("[{key}] {}", self.label),
            None => self.label.clone(),
        }
    }
}

/// Messages for the modal.
#[derive(Debug, Clone)]
pub enum Message {
    Show,
    Hide,
    /// A key press forwarded by the page while visible.
    KeyPress(KeyEvent),
    /// A pointer event forwarded by the page.
    Pointer(MouseEvent),
    /// An event from the dismissal listener.
    Document(InputEvent),
    /// An action was chosen (by index). The dialog is closed.
    Select(usize),
    /// The dialog was dismissed without choosing an action.
    Dismiss(DismissReason),
}

#[derive(Debug, Clone)]
pub struct ModalStyle {
    pub border: Style,
    pub title: Style,
    pub description: Style,
    pub body: Style,
    pub action: Style,
    pub focused_action: Style,
}

impl Default for ModalStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::Cyan),
            title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            description: Style::default().fg(Color::Gray),
            body: Style::default(),
            action: Style::default().fg(Color::DarkGray),
            focused_action: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        }
    }
}

/// A dialog that floats over the page while visible.
pub struct Modal {
    title: String,
    description: Option<String>,
    body: Vec<Line<'static>>,
    actions: Vec<Action>,
    focused_action: usize,
    overlay: Overlay,
    style: ModalStyle,
    width: u16,
    dialog: Cell<Rect>,
    buttons: RefCell<Vec<Rect>>,
}

impl Modal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            body: Vec::new(),
            actions: Vec::new(),
            focused_action: 0,
            overlay: Overlay::new(),
            style: ModalStyle::default(),
            width: 48,
            dialog: Cell::new(Rect::default()),
            buttons: RefCell::new(Vec::new()),
        }
    }

    /// Secondary line under the title.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn body(mut self, text: impl Into<String>) -> Self {
        let s: String = text.into();
        self.body = s.lines().map(|l| Line::raw(l.to_string())).collect();
        self
    }

    pub fn body_lines(mut self, lines: Vec<Line<'static>>) -> Self {
        self.body = lines;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_style(mut self, style: ModalStyle) -> Self {
        self.style = style;
        self
    }

    /// Dialog width in columns. Height follows the content.
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width.max(10);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn focused_action(&self) -> usize {
        self.focused_action
    }

    pub fn is_visible(&self) -> bool {
        self.overlay.is_open()
    }

    pub fn data_state(&self) -> DataState {
        self.overlay.data_state()
    }

    /// Make the dialog visible with the first action focused.
    pub fn show(&mut self) {
        if self.overlay.open() {
            self.focused_action = 0;
        }
    }

    pub fn hide(&mut self) {
        self.overlay.close(DismissReason::Programmatic);
    }

    fn dismiss(&mut self, reason: DismissReason) -> Command<Message> {
        if self.overlay.close(reason) {
            Command::message(Message::Dismiss(reason))
        } else {
            Command::none()
        }
    }

    fn choose(&mut self, index: usize) -> Command<Message> {
        if index >= self.actions.len() {
            panic!("action index {index} used outside its Modal");
        }
        if self.overlay.close(DismissReason::Commit) {
            Command::message(Message::Select(index))
        } else {
            Command::none()
        }
    }

    fn step(&mut self, forward: bool) {
        let len = self.actions.len();
        if len == 0 {
            return;
        }
        self.focused_action = if forward {
            (self.focused_action + 1) % len
        } else {
            (self.focused_action + len - 1) % len
        };
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<Message> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => self.dismiss(DismissReason::Escape),
            (KeyCode::Left, _) | (KeyCode::BackTab, _) => {
                self.step(false);
                Command::none()
            }
            (KeyCode::Right, _) | (KeyCode::Tab, _) => {
                self.step(true);
                Command::none()
            }
            (KeyCode::Enter, _) if self.actions.is_empty() => {
                self.dismiss(DismissReason::Commit)
            }
            (KeyCode::Enter, _) => self.choose(self.focused_action),
            (KeyCode::Char(c), m) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                let lower = c.to_ascii_lowercase();
                match self.actions.iter().position(|a| a.shortcut == Some(lower)) {
                    Some(i) => self.choose(i),
                    None => Command::none(),
                }
            }
            _ => Command::none(),
        }
    }

    fn height(&self, inner_width: u16) -> u16 {
        let description = self.description.as_deref().map_or(0, |_| 2);
        // body lines wrap at the inner width
        let body: u16 = self
            .body
            .iter()
            .map(|l| {
                let w = l.width() as u16;
                if inner_width == 0 { 1 } else { w.div_ceil(inner_width).max(1) }
            })
            .sum();
        let actions = if self.actions.is_empty() { 0 } else { 2 };
        body + description + actions + 2
    }
}

impl Component for Modal {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Show => {
                self.show();
                Command::none()
            }
            Message::Hide => {
                self.hide();
                Command::none()
            }
            Message::KeyPress(key) if self.overlay.is_open() => self.handle_key(key),
            Message::Pointer(mouse) if self.overlay.is_open() => {
                let Some(at) = press_position(&mouse) else {
                    return Command::none();
                };
                let hit = self.buttons.borrow().iter().position(|r| r.contains(at));
                match hit {
                    Some(i) => self.choose(i),
                    None => Command::none(),
                }
            }
            Message::Document(event) if self.overlay.is_open() => {
                match Overlay::dismissal(&event, &[self.dialog.get()]) {
                    Some(reason) => self.dismiss(reason),
                    None => Command::none(),
                }
            }
            _ => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        if !self.overlay.is_open() {
            self.buttons.borrow_mut().clear();
            return;
        }
        let width = self.width.min(area.width);
        let dialog = centered_fixed(width, self.height(width.saturating_sub(2)), area);
        self.dialog.set(dialog);

        let block = Block::default()
            .title(Span::styled(self.title.as_str(), self.style.title))
            .borders(Borders::ALL)
            .border_style(self.style.border);
        let inner = render_overlay(frame, dialog, Some(&block));

        let mut y = inner.y;
        if let Some(description) = &self.description {
            let row = Rect::new(inner.x, y, inner.width, 1);
            frame.render_widget(
                Paragraph::new(description.as_str()).style(self.style.description),
                row,
            );
            y += 2;
        }

        let actions_height = if self.actions.is_empty() { 0 } else { 2 };
        let body_height = inner.bottom().saturating_sub(y).saturating_sub(actions_height);
        if !self.body.is_empty() && body_height > 0 {
            let body = Paragraph::new(self.body.clone())
                .style(self.style.body)
                .wrap(Wrap { trim: false });
            frame.render_widget(body, Rect::new(inner.x, y, inner.width, body_height));
        }

        let mut buttons = self.buttons.borrow_mut();
        buttons.clear();
        if self.actions.is_empty() || inner.height == 0 {
            return;
        }

        // Buttons are centered on the last inner row, two spaces apart.
        let row = inner.bottom() - 1;
        let labels: Vec<String> = self
            .actions
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let marker = if i == self.focused_action { "▸ " } else { "  " };
                format!("{marker}{}", a.text())
            })
            .collect();
        let total = labels.iter().map(|l| l.width() as u16).sum::<u16>()
            + 2 * (labels.len() as u16 - 1);
        let mut x = inner.x + inner.width.saturating_sub(total) / 2;
        let mut spans = Vec::new();
        for (i, label) in labels.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
                x += 2;
            }
            let w = label.width() as u16;
            buttons.push(Rect::new(x, row, w, 1).intersection(inner));
            x += w;
            let style = if i == self.focused_action {
                self.style.focused_action
            } else {
                self.style.action
            };
            spans.push(Span::styled(label, style));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            Rect::new(inner.x, row, inner.width, 1),
        );
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        self.overlay
            .listener(Message::Document)
            .into_iter()
            .collect()
    }

    fn focused(&self) -> bool {
        self.overlay.is_open()
    }
}
