//! Vertically stacked panels that expand and collapse.
//!
//! Each [`Panel`] has a trigger row and a body shown only while the panel is
//! open. Open state lives in an [`OpenSet`], single-open by default.
//!
//! # Example
//!
//! ```rust,ignore
//! let faq = Accordion::new(vec![
//!     Panel::new("shipping", "Shipping", "Orders leave within two days."),
//!     Panel::new("returns", "Returns", "Thirty days, no questions."),
//! ])
//! .with_initial_open(["shipping".into()]);
//! ```

use crate::disclosure::{DataState, DisclosureMode, ItemId, OpenSet};
use crate::selection::Roving;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use sorrel_core::command::Command;
use sorrel_core::component::Component;
use sorrel_core::event::press_position;
use std::cell::RefCell;

/// One expandable section.
#[derive(Debug, Clone)]
pub struct Panel {
    pub id: ItemId,
    pub title: String,
    pub body: String,
}

impl Panel {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Messages for the accordion component.
#[derive(Debug, Clone)]
pub enum Message {
    /// Flip the panel with this id.
    Toggle(ItemId),
    /// A key press routed to the accordion.
    KeyPress(KeyEvent),
    /// A pointer event routed to the accordion.
    Pointer(MouseEvent),
    /// Emitted for every panel whose open state changed.
    Toggled { id: ItemId, open: bool },
}

/// Visual style configuration for the [`Accordion`] component.
#[derive(Debug, Clone)]
pub struct AccordionStyle {
    pub trigger: Style,
    /// Trigger row holding the keyboard highlight.
    pub highlighted: Style,
    pub body: Style,
}

impl Default for AccordionStyle {
    fn default() -> Self {
        Self {
            trigger: Style::default().add_modifier(Modifier::BOLD),
            highlighted: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            body: Style::default().fg(Color::Gray),
        }
    }
}

/// A list of panels over an [`OpenSet`].
pub struct Accordion {
    panels: Vec<Panel>,
    initial: Vec<ItemId>,
    open: OpenSet,
    cursor: Roving,
    focus: bool,
    style: AccordionStyle,
    triggers: RefCell<Vec<Rect>>,
}

impl Accordion {
    /// Create an accordion in single-open mode with every panel closed.
    pub fn new(panels: Vec<Panel>) -> Self {
        Self {
            panels,
            initial: Vec::new(),
            open: OpenSet::new(DisclosureMode::Single),
            cursor: Roving::new(),
            focus: false,
            style: AccordionStyle::default(),
            triggers: RefCell::new(Vec::new()),
        }
    }

    /// Set the exclusivity policy. The initial open ids are applied under the
    /// final mode, whichever builder runs last.
    pub fn with_mode(mut self, mode: DisclosureMode) -> Self {
        self.open = OpenSet::with_initial(mode, self.initial.iter().cloned());
        self
    }

    /// Open `ids` initially. In single mode only the first id is kept.
    ///
    /// # Panics
    ///
    /// Panics if an id does not name one of this accordion's panels.
    pub fn with_initial_open(mut self, ids: impl IntoIterator<Item = ItemId>) -> Self {
        let ids: Vec<ItemId> = ids.into_iter().collect();
        for id in &ids {
            self.expect_panel(id);
        }
        self.open = OpenSet::with_initial(self.open.mode(), ids.iter().cloned());
        self.initial = ids;
        self
    }

    pub fn with_style(mut self, style: AccordionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn mode(&self) -> DisclosureMode {
        self.open.mode()
    }

    /// Whether the panel is expanded. Unknown ids are collapsed.
    pub fn is_expanded(&self, id: &ItemId) -> bool {
        self.open.is_open(id)
    }

    pub fn data_state(&self, id: &ItemId) -> DataState {
        self.open.data_state(id)
    }

    pub fn open_ids(&self) -> &[ItemId] {
        self.open.open_ids()
    }

    /// Index of the trigger holding the keyboard highlight.
    pub fn highlighted(&self) -> Option<usize> {
        self.cursor.cursor()
    }

    pub fn focus(&mut self) {
        self.focus = true;
        if self.cursor.cursor().is_none() {
            self.cursor.first(self.panels.len(), |_| true);
        }
    }

    pub fn blur(&mut self) {
        self.focus = false;
    }

    fn expect_panel(&self, id: &ItemId) -> usize {
        match self.panels.iter().position(|p| &p.id == id) {
            Some(index) => index,
            None => panic!("ItemId `{id}` used outside its Accordion"),
        }
    }

    fn toggle(&mut self, id: &ItemId) -> Command<Message> {
        self.expect_panel(id);
        let changed = self.open.toggle(id);
        Command::batch(changed.into_iter().map(|id| {
            let open = self.open.is_open(&id);
            tracing::debug!(panel = %id, open, "accordion panel toggled");
            Command::message(Message::Toggled { id, open })
        }))
    }

    fn trigger_at(&self, mouse: &MouseEvent) -> Option<usize> {
        let at = press_position(mouse)?;
        self.triggers.borrow().iter().position(|r| r.contains(at))
    }
}

impl Component for Accordion {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Toggle(id) => self.toggle(&id),
            Message::KeyPress(key) if self.focus => {
                let len = self.panels.len();
                match key.code {
                    KeyCode::Up => self.cursor.prev(len, |_| true),
                    KeyCode::Down => self.cursor.next(len, |_| true),
                    KeyCode::Home => self.cursor.first(len, |_| true),
                    KeyCode::End => self.cursor.last(len, |_| true),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        if let Some(index) = self.cursor.cursor() {
                            let id = self.panels[index].id.clone();
                            return self.toggle(&id);
                        }
                    }
                    _ => {}
                }
                Command::none()
            }
            Message::Pointer(mouse) => match self.trigger_at(&mouse) {
                Some(index) => {
                    self.cursor.set(Some(index));
                    let id = self.panels[index].id.clone();
                    self.toggle(&id)
                }
                None => Command::none(),
            },
            _ => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let mut triggers = self.triggers.borrow_mut();
        triggers.clear();

        let bottom = area.bottom();
        let mut y = area.y;
        for (index, panel) in self.panels.iter().enumerate() {
            if y >= bottom {
                break;
            }
            let expanded = self.open.is_open(&panel.id);
            let row = Rect::new(area.x, y, area.width, 1);
            let marker = if expanded { "▾ " } else { "▸ " };
            let style = if self.focus && self.cursor.cursor() == Some(index) {
                self.style.highlighted
            } else {
                self.style.trigger
            };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(panel.title.as_str(), style),
                ])),
                row,
            );
            triggers.push(row);
            y += 1;

            if !expanded {
                continue;
            }
            for line in panel.body.lines() {
                if y >= bottom {
                    break;
                }
                let row = Rect::new(area.x + 2, y, area.width.saturating_sub(2), 1);
                frame.render_widget(Paragraph::new(Span::styled(line, self.style.body)), row);
                y += 1;
            }
        }
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEventKind};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use sorrel_core::testing::buffer_to_string;

    fn faq() -> Accordion {
        Accordion::new(vec![
            Panel::new("shipping", "Shipping", "Two days."),
            Panel::new("returns", "Returns", "Thirty days.\nKeep the receipt."),
            Panel::new("warranty", "Warranty", "One year."),
        ])
    }

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    fn render(accordion: &Accordion) -> String {
        let mut terminal = Terminal::new(TestBackend::new(30, 8)).unwrap();
        terminal
            .draw(|frame| accordion.view(frame, frame.area()))
            .unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    fn click(column: u16, row: u16) -> Message {
        Message::Pointer(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn toggled(cmd: Command<Message>) -> Vec<(String, bool)> {
        cmd.into_messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::Toggled { id, open } => Some((id.to_string(), open)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn single_mode_by_default() {
        let mut acc = faq();
        assert_eq!(acc.mode(), DisclosureMode::Single);
        acc.update(Message::Toggle(id("shipping")));
        let changes = toggled(acc.update(Message::Toggle(id("returns"))));
        assert_eq!(
            changes,
            vec![("shipping".to_string(), false), ("returns".to_string(), true)]
        );
        assert_eq!(acc.open_ids(), &[id("returns")]);
    }

    #[test]
    fn multiple_mode_keeps_others_open() {
        let mut acc = faq().with_mode(DisclosureMode::Multiple);
        acc.update(Message::Toggle(id("shipping")));
        acc.update(Message::Toggle(id("warranty")));
        assert!(acc.is_expanded(&id("shipping")));
        assert!(acc.is_expanded(&id("warranty")));
        assert_eq!(acc.data_state(&id("returns")), DataState::Closed);
    }

    #[test]
    fn initial_open_first_wins_in_single_mode() {
        let acc = faq().with_initial_open([id("returns"), id("shipping")]);
        assert_eq!(acc.open_ids(), &[id("returns")]);
    }

    #[test]
    fn initial_open_survives_either_builder_order() {
        let both = [id("shipping"), id("warranty")];
        let mode_last = faq()
            .with_initial_open(both.clone())
            .with_mode(DisclosureMode::Multiple);
        let mode_first = faq()
            .with_mode(DisclosureMode::Multiple)
            .with_initial_open(both.clone());
        assert_eq!(mode_last.open_ids(), &both);
        assert_eq!(mode_first.open_ids(), &both);

        let single = faq()
            .with_mode(DisclosureMode::Multiple)
            .with_initial_open(both)
            .with_mode(DisclosureMode::Single);
        assert_eq!(single.open_ids(), &[id("shipping")]);
    }

    #[test]
    fn body_rendered_only_when_open() {
        let acc = faq().with_initial_open([id("returns")]);
        let screen = render(&acc);
        assert!(screen.contains("▸ Shipping"));
        assert!(screen.contains("▾ Returns"));
        assert!(screen.contains("Keep the receipt."));
        assert!(!screen.contains("Two days."));
    }

    #[test]
    fn clicking_a_trigger_row_toggles_it() {
        let mut acc = faq().with_initial_open([id("shipping")]);
        render(&acc);
        // rows: 0 Shipping, 1 body, 2 Returns, 3 Warranty
        let changes = toggled(acc.update(click(4, 2)));
        assert_eq!(
            changes,
            vec![("shipping".to_string(), false), ("returns".to_string(), true)]
        );
        // a click on body text does nothing
        render(&acc);
        assert!(acc.update(click(4, 3)).is_none());
    }

    #[test]
    fn keyboard_moves_and_toggles() {
        let mut acc = faq();
        acc.focus();
        assert_eq!(acc.highlighted(), Some(0));
        acc.update(Message::KeyPress(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)));
        let changes = toggled(acc.update(Message::KeyPress(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        ))));
        assert_eq!(changes, vec![("returns".to_string(), true)]);
    }

    #[test]
    fn keys_ignored_without_focus() {
        let mut acc = faq();
        let cmd = acc.update(Message::KeyPress(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )));
        assert!(cmd.is_none());
    }

    #[test]
    #[should_panic(expected = "used outside its Accordion")]
    fn unknown_panel_is_a_wiring_error() {
        let mut acc = faq();
        acc.update(Message::Toggle(id("nope")));
    }
}
