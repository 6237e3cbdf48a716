//! Action menu with nested submenus.
//!
//! A [`Menu`] is a trigger plus a floating list of [`MenuEntry`] rows. It is
//! generic over the page's action type `A`: activating an enabled item emits
//! [`Message::Activated`] carrying a clone of the item's action, then closes
//! the menu. Disabled items are inert.
//!
//! Each [`Submenu`] owns its own [`Overlay`], independent of the parent's.
//! Hovering a submenu's trigger row opens it and moving the pointer off both
//! that row and the submenu content closes it again. Activating an item
//! inside a submenu closes only that submenu. Closing the menu closes every
//! submenu with it.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Clone)]
//! enum Act { Rename, Delete, Export(Format) }
//!
//! let menu = Menu::new("Actions", vec![
//!     MenuEntry::label("File"),
//!     MenuEntry::item("Rename", Act::Rename),
//!     MenuEntry::Submenu(Submenu::new("Export", vec![
//!         MenuItem::new("CSV", Act::Export(Format::Csv)),
//!         MenuItem::new("PDF", Act::Export(Format::Pdf)).disabled(),
//!     ])),
//!     MenuEntry::Separator,
//!     MenuEntry::item("Delete", Act::Delete),
//! ]);
//! ```

use crate::disclosure::DataState;
use crate::overlay::{anchor, render_overlay, Align, DismissReason, Overlay};
use crate::selection::Roving;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use sorrel_core::command::Command;
use sorrel_core::component::Component;
use sorrel_core::event::{press_position, InputEvent};
use sorrel_core::subscription::Subscription;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use unicode_width::UnicodeWidthStr;

static NEXT_SUBMENU_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmenuId(u64);

/// An activatable row.
#[derive(Debug, Clone)]
pub struct MenuItem<A> {
    pub label: String,
    pub action: A,
    pub disabled: bool,
}

impl<A> MenuItem<A> {
    pub fn new(label: impl Into<String>, action: A) -> Self {
        Self {
            label: label.into(),
            action,
            disabled: false,
        }
    }

    /// Mark the item as inert.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// A nested list opened from a row of its parent menu.
#[derive(Debug)]
pub struct Submenu<A> {
    id: SubmenuId,
    label: String,
    items: Vec<MenuItem<A>>,
    overlay: Overlay,
    cursor: Roving,
}

impl<A> Submenu<A> {
    pub fn new(label: impl Into<String>, items: Vec<MenuItem<A>>) -> Self {
        Self {
            id: SubmenuId(NEXT_SUBMENU_ID.fetch_add(1, Ordering::Relaxed)),
            label: label.into(),
            items,
            overlay: Overlay::new(),
            cursor: Roving::new(),
        }
    }

    pub fn id(&self) -> SubmenuId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn items(&self) -> &[MenuItem<A>] {
        &self.items
    }

    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    fn open(&mut self) -> bool {
        self.overlay.open()
    }

    fn close(&mut self, reason: DismissReason) -> bool {
        self.cursor.clear();
        self.overlay.close(reason)
    }
}

/// One row of a [`Menu`].
#[derive(Debug)]
pub enum MenuEntry<A> {
    Item(MenuItem<A>),
    Separator,
    /// A non-interactive heading.
    Label(String),
    Submenu(Submenu<A>),
}

impl<A> MenuEntry<A> {
    pub fn item(label: impl Into<String>, action: A) -> Self {
        MenuEntry::Item(MenuItem::new(label, action))
    }

    pub fn label(text: impl Into<String>) -> Self {
        MenuEntry::Label(text.into())
    }

    fn focusable(&self) -> bool {
        match self {
            MenuEntry::Item(item) => !item.disabled,
            MenuEntry::Submenu(_) => true,
            MenuEntry::Separator | MenuEntry::Label(_) => false,
        }
    }

    fn text_width(&self) -> usize {
        match self {
            MenuEntry::Item(item) => item.label.width(),
            MenuEntry::Label(text) => text.width(),
            MenuEntry::Submenu(sub) => sub.label.width() + 2,
            MenuEntry::Separator => 0,
        }
    }
}

/// Messages for the menu component.
#[derive(Debug, Clone)]
pub enum Message<A> {
    /// Trigger activation: open when closed, close when open.
    Toggle,
    Open,
    Close,
    /// Activate the top-level entry at this index.
    Activate(usize),
    /// Activate the item at this index inside a submenu.
    ActivateIn(SubmenuId, usize),
    OpenSubmenu(SubmenuId),
    CloseSubmenu(SubmenuId),
    /// A key press routed to the menu.
    KeyPress(KeyEvent),
    /// A pointer event routed to the menu.
    Pointer(MouseEvent),
    /// An event from the dismissal listener.
    Document(InputEvent),
    /// Emitted with the action of an activated item.
    Activated(A),
    /// Emitted whenever the menu itself closes.
    Dismissed(DismissReason),
}

/// Visual style configuration for the [`Menu`] component.
#[derive(Debug, Clone)]
pub struct MenuStyle {
    pub trigger: Style,
    pub item: Style,
    pub highlighted: Style,
    pub disabled: Style,
    pub label: Style,
    pub border: Style,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self {
            trigger: Style::default().add_modifier(Modifier::BOLD),
            item: Style::default(),
            highlighted: Style::default().fg(Color::Black).bg(Color::Cyan),
            disabled: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
            label: Style::default().add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::DarkGray),
        }
    }
}

#[derive(Debug, Default)]
struct MenuLayout {
    trigger: Rect,
    content: Option<Rect>,
    /// Entry index and row rect of each visible top-level row.
    rows: Vec<(usize, Rect)>,
    /// Index of the entry on the first visible row.
    first: usize,
    submenus: Vec<SubmenuLayout>,
}

#[derive(Debug)]
struct SubmenuLayout {
    /// Entry index of the submenu in the parent.
    index: usize,
    area: Rect,
    rows: Vec<(usize, Rect)>,
    first: usize,
}

fn row_containing(rows: &[(usize, Rect)], position: Position) -> Option<usize> {
    rows.iter()
        .find(|(_, rect)| rect.contains(position))
        .map(|(index, _)| *index)
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// A dropdown action menu.
pub struct Menu<A> {
    label: String,
    entries: Vec<MenuEntry<A>>,
    overlay: Overlay,
    cursor: Roving,
    /// Entry index of the submenu that currently has the keyboard.
    keyboard_in: Option<usize>,
    align: Align,
    style: MenuStyle,
    focus: bool,
    layout: RefCell<MenuLayout>,
}

impl<A: Clone + Send + 'static> Menu<A> {
    /// Create a closed menu whose trigger shows `label`.
    pub fn new(label: impl Into<String>, entries: Vec<MenuEntry<A>>) -> Self {
        Self {
            label: label.into(),
            entries,
            overlay: Overlay::new(),
            cursor: Roving::new(),
            keyboard_in: None,
            align: Align::Center,
            style: MenuStyle::default(),
            focus: false,
            layout: RefCell::new(MenuLayout::default()),
        }
    }

    /// Set where the menu content sits relative to the trigger.
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_style(mut self, style: MenuStyle) -> Self {
        self.style = style;
        self
    }

    pub fn entries(&self) -> &[MenuEntry<A>] {
        &self.entries
    }

    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    pub fn data_state(&self) -> DataState {
        self.overlay.data_state()
    }

    /// Id of the submenu at entry `index`, if that entry is one.
    pub fn submenu_id(&self, index: usize) -> Option<SubmenuId> {
        match self.entries.get(index) {
            Some(MenuEntry::Submenu(sub)) => Some(sub.id),
            _ => None,
        }
    }

    /// Whether the submenu is open.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this menu.
    pub fn is_submenu_open(&self, id: SubmenuId) -> bool {
        let index = self.submenu_index(id);
        self.submenu(index).is_open()
    }

    /// Index of the top-level entry holding the keyboard highlight.
    pub fn highlighted(&self) -> Option<usize> {
        self.cursor.cursor()
    }

    pub fn focus(&mut self) {
        self.focus = true;
    }

    /// Remove keyboard focus and close the menu if open.
    pub fn blur(&mut self) {
        self.focus = false;
        self.close_all();
        self.overlay.close(DismissReason::Programmatic);
    }

    fn submenu_index(&self, id: SubmenuId) -> usize {
        self.entries
            .iter()
            .position(|e| matches!(e, MenuEntry::Submenu(sub) if sub.id == id))
            .unwrap_or_else(|| panic!("{id:?} used outside its Menu"))
    }

    fn submenu(&self, index: usize) -> &Submenu<A> {
        match &self.entries[index] {
            MenuEntry::Submenu(sub) => sub,
            _ => unreachable!("entry {index} is not a submenu"),
        }
    }

    fn submenu_mut(&mut self, index: usize) -> &mut Submenu<A> {
        match &mut self.entries[index] {
            MenuEntry::Submenu(sub) => sub,
            _ => unreachable!("entry {index} is not a submenu"),
        }
    }

    fn open(&mut self) -> Command<Message<A>> {
        if self.overlay.open() {
            self.cursor.clear();
            self.keyboard_in = None;
        }
        Command::none()
    }

    fn close(&mut self, reason: DismissReason) -> Command<Message<A>> {
        if !self.overlay.is_open() {
            return Command::none();
        }
        self.close_all();
        self.overlay.close(reason);
        self.cursor.clear();
        Command::message(Message::Dismissed(reason))
    }

    fn close_all(&mut self) {
        self.keyboard_in = None;
        for entry in &mut self.entries {
            if let MenuEntry::Submenu(sub) = entry {
                sub.close(DismissReason::Programmatic);
            }
        }
    }

    fn open_submenu(&mut self, index: usize) {
        if !self.overlay.is_open() {
            return;
        }
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if let MenuEntry::Submenu(sub) = entry {
                if i == index {
                    sub.open();
                } else {
                    sub.close(DismissReason::Programmatic);
                }
            }
        }
        if self.keyboard_in.is_some_and(|k| k != index) {
            self.keyboard_in = None;
        }
    }

    fn close_submenu(&mut self, index: usize, reason: DismissReason) {
        self.submenu_mut(index).close(reason);
        if self.keyboard_in == Some(index) {
            self.keyboard_in = None;
        }
    }

    fn activate(&mut self, index: usize) -> Command<Message<A>> {
        let Some(entry) = self.entries.get(index) else {
            panic!(
                "entry index {index} used outside its Menu ({} entries)",
                self.entries.len()
            );
        };
        match entry {
            MenuEntry::Item(item) if !item.disabled => {
                let action = item.action.clone();
                tracing::debug!(item = %item.label, "menu item activated");
                Command::batch([
                    Command::message(Message::Activated(action)),
                    self.close(DismissReason::Commit),
                ])
            }
            MenuEntry::Submenu(_) => {
                self.open_submenu(index);
                Command::none()
            }
            _ => Command::none(),
        }
    }

    fn activate_in(&mut self, index: usize, item: usize) -> Command<Message<A>> {
        let sub = self.submenu(index);
        let Some(entry) = sub.items.get(item) else {
            panic!(
                "item index {item} used outside its Submenu ({} items)",
                sub.items.len()
            );
        };
        if entry.disabled {
            return Command::none();
        }
        let action = entry.action.clone();
        tracing::debug!(item = %entry.label, submenu = %sub.label, "submenu item activated");
        self.close_submenu(index, DismissReason::Commit);
        Command::message(Message::Activated(action))
    }

    fn inside_regions(&self) -> Vec<Rect> {
        let layout = self.layout.borrow();
        let mut regions = vec![layout.trigger];
        regions.extend(layout.content);
        regions.extend(
            layout
                .submenus
                .iter()
                .filter(|sub| self.submenu(sub.index).is_open())
                .map(|sub| sub.area),
        );
        regions
    }

    fn row_at(&self, position: Position) -> Option<usize> {
        if !self.overlay.is_open() {
            return None;
        }
        row_containing(&self.layout.borrow().rows, position)
    }

    fn submenu_row_at(&self, position: Position) -> Option<(usize, usize)> {
        let layout = self.layout.borrow();
        layout.submenus.iter().find_map(|sub| {
            if !self.submenu(sub.index).is_open() {
                return None;
            }
            row_containing(&sub.rows, position).map(|item| (sub.index, item))
        })
    }

    /// Open the submenu under the pointer and close any the pointer left.
    fn hover(&mut self, position: Position) {
        if !self.overlay.is_open() {
            return;
        }
        if let Some(index) = self.row_at(position) {
            if self.entries[index].focusable() {
                self.cursor.set(Some(index));
            }
            if matches!(self.entries[index], MenuEntry::Submenu(_)) {
                self.open_submenu(index);
            }
        }

        let left: Vec<usize> = {
            let layout = self.layout.borrow();
            layout
                .submenus
                .iter()
                .filter(|sub| {
                    let on_trigger = row_containing(&layout.rows, position) == Some(sub.index);
                    self.submenu(sub.index).is_open()
                        && !on_trigger
                        && !sub.area.contains(position)
                })
                .map(|sub| sub.index)
                .collect()
        };
        for index in left {
            tracing::debug!(submenu = %self.submenu(index).label, "pointer left submenu");
            self.close_submenu(index, DismissReason::OutsideInteraction);
        }

        if let Some((index, item)) = self.submenu_row_at(position) {
            let sub = self.submenu_mut(index);
            if !sub.items[item].disabled {
                sub.cursor.set(Some(item));
            }
        }
    }

    fn handle_pointer(&mut self, mouse: MouseEvent) -> Command<Message<A>> {
        let position = Position::new(mouse.column, mouse.row);
        if let Some(at) = press_position(&mouse) {
            if self.layout.borrow().trigger.contains(at) {
                return if self.overlay.is_open() {
                    self.close(DismissReason::Trigger)
                } else {
                    self.open()
                };
            }
            if let Some((index, item)) = self.submenu_row_at(at) {
                return self.activate_in(index, item);
            }
            if let Some(index) = self.row_at(at) {
                return self.activate(index);
            }
            return Command::none();
        }
        if matches!(mouse.kind, MouseEventKind::Moved) {
            self.hover(position);
        }
        Command::none()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<Message<A>> {
        if !self.overlay.is_open() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down => {
                    let cmd = self.open();
                    let entries = &self.entries;
                    self.cursor.first(entries.len(), |i| entries[i].focusable());
                    cmd
                }
                _ => Command::none(),
            };
        }

        if key.code == KeyCode::Esc {
            return self.close(DismissReason::Escape);
        }
        if key.code == KeyCode::Tab {
            return self.close(DismissReason::Programmatic);
        }

        if let Some(index) = self.keyboard_in {
            return self.handle_submenu_key(index, key);
        }

        let len = self.entries.len();
        let entries = &self.entries;
        match key.code {
            KeyCode::Up => self.cursor.prev(len, |i| entries[i].focusable()),
            KeyCode::Down => self.cursor.next(len, |i| entries[i].focusable()),
            KeyCode::Home => self.cursor.first(len, |i| entries[i].focusable()),
            KeyCode::End => self.cursor.last(len, |i| entries[i].focusable()),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right => {
                let Some(index) = self.cursor.cursor() else {
                    return Command::none();
                };
                if matches!(self.entries[index], MenuEntry::Submenu(_)) {
                    self.open_submenu(index);
                    self.keyboard_in = Some(index);
                    let sub = self.submenu_mut(index);
                    let items = &sub.items;
                    sub.cursor.first(items.len(), |i| !items[i].disabled);
                    return Command::none();
                }
                if key.code != KeyCode::Right {
                    return self.activate(index);
                }
            }
            _ => {}
        }
        Command::none()
    }

    fn handle_submenu_key(&mut self, index: usize, key: KeyEvent) -> Command<Message<A>> {
        let sub = self.submenu_mut(index);
        let len = sub.items.len();
        let items = &sub.items;
        match key.code {
            KeyCode::Up => sub.cursor.prev(len, |i| !items[i].disabled),
            KeyCode::Down => sub.cursor.next(len, |i| !items[i].disabled),
            KeyCode::Left => self.close_submenu(index, DismissReason::Programmatic),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(item) = sub.cursor.cursor() {
                    return self.activate_in(index, item);
                }
            }
            _ => {}
        }
        Command::none()
    }

    /// Render the rows from `first` on that fit in `inner`, returning each
    /// rendered row's index and rect.
    fn render_rows<'a>(
        &self,
        frame: &mut Frame,
        inner: Rect,
        first: usize,
        rows: impl Iterator<Item = (Line<'a>, Style)>,
    ) -> Vec<(usize, Rect)> {
        let mut rects = Vec::new();
        for (i, (line, style)) in rows.enumerate().skip(first).take(usize::from(inner.height)) {
            let row = Rect {
                y: inner.y + to_u16(i - first),
                height: 1,
                ..inner
            };
            frame.render_widget(Paragraph::new(line).style(style), row);
            rects.push((i, row));
        }
        rects
    }
}

impl<A: Clone + Send + 'static> Component for Menu<A> {
    type Message = Message<A>;

    fn update(&mut self, msg: Message<A>) -> Command<Message<A>> {
        match msg {
            Message::Toggle => {
                if self.overlay.is_open() {
                    self.close(DismissReason::Trigger)
                } else {
                    self.open()
                }
            }
            Message::Open => self.open(),
            Message::Close => self.close(DismissReason::Programmatic),
            Message::Activate(index) => self.activate(index),
            Message::ActivateIn(id, item) => {
                let index = self.submenu_index(id);
                self.activate_in(index, item)
            }
            Message::OpenSubmenu(id) => {
                let index = self.submenu_index(id);
                self.open_submenu(index);
                Command::none()
            }
            Message::CloseSubmenu(id) => {
                let index = self.submenu_index(id);
                self.close_submenu(index, DismissReason::Programmatic);
                Command::none()
            }
            Message::KeyPress(key) if self.focus || self.overlay.is_open() => {
                self.handle_key(key)
            }
            Message::Pointer(mouse) => self.handle_pointer(mouse),
            Message::Document(event) if self.overlay.is_open() => {
                if let Some(reason) = Overlay::dismissal(&event, &self.inside_regions()) {
                    return self.close(reason);
                }
                if let InputEvent::Pointer(mouse) = event {
                    if matches!(mouse.kind, MouseEventKind::Moved) {
                        self.hover(Position::new(mouse.column, mouse.row));
                    }
                }
                Command::none()
            }
            _ => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let mut layout = self.layout.borrow_mut();
        let trigger_width = to_u16(self.label.width())
            .saturating_add(2)
            .min(area.width);
        layout.trigger = Rect::new(area.x, area.y, trigger_width, area.height.min(1));
        layout.content = None;
        layout.rows.clear();
        let previous: Vec<(usize, usize)> = layout
            .submenus
            .drain(..)
            .map(|sub| (sub.index, sub.first))
            .collect();

        let arrow = if self.overlay.is_open() { " ▴" } else { " ▾" };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(self.label.as_str(), self.style.trigger),
                Span::raw(arrow),
            ])),
            layout.trigger,
        );

        if !self.overlay.is_open() {
            layout.first = 0;
            return;
        }

        let bounds = frame.area();
        let widest = self.entries.iter().map(|e| e.text_width()).max().unwrap_or(0);
        let width = to_u16(widest).saturating_add(6);
        let height = to_u16(self.entries.len()).saturating_add(2);
        let content = anchor(layout.trigger, width, height, self.align, bounds);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.style.border);
        let inner = render_overlay(frame, content, Some(&block));
        layout.content = Some(content);

        let rule = "─".repeat(usize::from(inner.width));
        let rows = self.entries.iter().enumerate().map(|(i, entry)| {
            let highlighted = self.cursor.cursor() == Some(i);
            match entry {
                MenuEntry::Item(item) => {
                    let style = if item.disabled {
                        self.style.disabled
                    } else if highlighted {
                        self.style.highlighted
                    } else {
                        self.style.item
                    };
                    (Line::raw(format!(" {}", item.label)), style)
                }
                MenuEntry::Separator => (Line::raw(rule.clone()), self.style.border),
                MenuEntry::Label(text) => (Line::raw(format!(" {text}")), self.style.label),
                MenuEntry::Submenu(sub) => {
                    let style = if highlighted || sub.is_open() {
                        self.style.highlighted
                    } else {
                        self.style.item
                    };
                    let pad = usize::from(inner.width).saturating_sub(sub.label.width() + 3);
                    (
                        Line::raw(format!(" {}{}›", sub.label, " ".repeat(pad))),
                        style,
                    )
                }
            }
        });
        // scroll so the highlighted entry stays on screen
        let first = self.cursor.window_start(
            layout.first,
            usize::from(inner.height),
            self.entries.len(),
        );
        layout.first = first;
        layout.rows = self.render_rows(frame, inner, first, rows);

        for (index, entry) in self.entries.iter().enumerate() {
            let MenuEntry::Submenu(sub) = entry else {
                continue;
            };
            if !sub.is_open() {
                continue;
            }
            let Some(row) = layout
                .rows
                .iter()
                .find(|(i, _)| *i == index)
                .map(|(_, rect)| *rect)
            else {
                continue;
            };
            let widest = sub.items.iter().map(|i| i.label.width()).max().unwrap_or(0);
            let width = to_u16(widest).saturating_add(4).min(bounds.width);
            let height = to_u16(sub.items.len())
                .saturating_add(2)
                .min(bounds.height);
            // to the right of the parent, or to its left when there is no room
            let x = if content.right().saturating_add(width) <= bounds.right() {
                content.right()
            } else {
                content.x.saturating_sub(width).max(bounds.x)
            };
            let y = row
                .y
                .saturating_sub(1)
                .min(bounds.bottom().saturating_sub(height))
                .max(bounds.y);
            let sub_area = Rect::new(x, y, width, height);
            let sub_inner = render_overlay(frame, sub_area, Some(&block));
            let items = sub.items.iter().enumerate().map(|(i, item)| {
                let style = if item.disabled {
                    self.style.disabled
                } else if sub.cursor.cursor() == Some(i) {
                    self.style.highlighted
                } else {
                    self.style.item
                };
                (Line::raw(format!(" {}", item.label)), style)
            });
            let previous_first = previous
                .iter()
                .find(|(i, _)| *i == index)
                .map_or(0, |(_, first)| *first);
            let first = sub.cursor.window_start(
                previous_first,
                usize::from(sub_inner.height),
                sub.items.len(),
            );
            let rows = self.render_rows(frame, sub_inner, first, items);
            layout.submenus.push(SubmenuLayout {
                index,
                area: sub_area,
                rows,
                first,
            });
        }
    }

    fn subscriptions(&self) -> Vec<Subscription<Message<A>>> {
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

    #[derive(Debug, Clone, PartialEq)]
    enum Act {
        Rename,
        Delete,
        Csv,
        Pdf,
    }

    // entries: 0 Label, 1 Rename, 2 Export >, 3 Separator, 4 Delete (disabled)
    fn menu() -> Menu<Act> {
        Menu::new(
            "Actions",
            vec![
                MenuEntry::label("File"),
                MenuEntry::item("Rename", Act::Rename),
                MenuEntry::Submenu(Submenu::new(
                    "Export",
                    vec![
                        MenuItem::new("CSV", Act::Csv),
                        MenuItem::new("PDF", Act::Pdf).disabled(),
                    ],
                )),
                MenuEntry::Separator,
                MenuEntry::Item(MenuItem::new("Delete", Act::Delete).disabled()),
            ],
        )
        .with_align(Align::Start)
    }

    fn render(menu: &Menu<Act>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(50, 14)).unwrap();
        terminal
            .draw(|frame| menu.view(frame, Rect::new(0, 0, 20, 1)))
            .unwrap();
        buffer_to_string(terminal.backend().buffer())
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

    fn moved(column: u16, row: u16) -> MouseEvent {
        mouse(MouseEventKind::Moved, column, row)
    }

    fn key(code: KeyCode) -> Message<Act> {
        Message::KeyPress(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn export_id(menu: &Menu<Act>) -> SubmenuId {
        menu.submenu_id(2).expect("entry 2 is a submenu")
    }

    #[test]
    fn activating_an_item_emits_action_then_closes() {
        let mut menu = menu();
        menu.update(Message::Open);
        let msgs = menu.update(Message::Activate(1)).into_messages();
        assert!(matches!(msgs[0], Message::Activated(Act::Rename)));
        assert!(matches!(msgs[1], Message::Dismissed(DismissReason::Commit)));
        assert!(!menu.is_open());
    }

    #[test]
    fn disabled_item_is_inert() {
        let mut menu = menu();
        menu.update(Message::Open);
        assert!(menu.update(Message::Activate(4)).is_none());
        assert!(menu.is_open());
    }

    #[test]
    fn labels_and_separators_are_inert() {
        let mut menu = menu();
        menu.update(Message::Open);
        assert!(menu.update(Message::Activate(0)).is_none());
        assert!(menu.update(Message::Activate(3)).is_none());
        assert!(menu.is_open());
    }

    #[test]
    fn submenu_item_closes_only_the_submenu() {
        let mut menu = menu();
        let export = export_id(&menu);
        menu.update(Message::Open);
        menu.update(Message::OpenSubmenu(export));
        assert!(menu.is_submenu_open(export));

        let msgs = menu.update(Message::ActivateIn(export, 0)).into_messages();
        assert_eq!(msgs.len(), 1);
        assert!(matches!(msgs[0], Message::Activated(Act::Csv)));
        assert!(!menu.is_submenu_open(export));
        assert!(menu.is_open());
    }

    #[test]
    fn disabled_submenu_item_is_inert() {
        let mut menu = menu();
        let export = export_id(&menu);
        menu.update(Message::Open);
        menu.update(Message::OpenSubmenu(export));
        assert!(menu.update(Message::ActivateIn(export, 1)).is_none());
        assert!(menu.is_submenu_open(export));
    }

    #[test]
    fn closing_submenu_leaves_parent_open() {
        let mut menu = menu();
        let export = export_id(&menu);
        menu.update(Message::Open);
        menu.update(Message::OpenSubmenu(export));
        menu.update(Message::CloseSubmenu(export));
        assert!(menu.is_open());
    }

    #[test]
    fn closing_parent_closes_submenus() {
        let mut menu = menu();
        let export = export_id(&menu);
        menu.update(Message::Open);
        menu.update(Message::OpenSubmenu(export));
        menu.update(Message::Close);
        assert!(!menu.is_submenu_open(export));
    }

    #[test]
    fn hover_opens_and_leaving_closes_submenu() {
        let mut menu = menu();
        let export = export_id(&menu);
        menu.update(Message::Open);
        render(&menu);
        // content at (0,1); rows start at y = 2; Export is entry 2 -> y = 4
        menu.update(Message::Pointer(moved(3, 4)));
        assert!(menu.is_submenu_open(export));

        // moving into the submenu content keeps it open
        let screen = render(&menu);
        assert!(screen.contains("CSV"));
        let sub = menu.layout.borrow().submenus[0].area;
        menu.update(Message::Pointer(moved(sub.x + 2, sub.y + 1)));
        assert!(menu.is_submenu_open(export));

        // moving onto another row of the parent closes it
        menu.update(Message::Pointer(moved(3, 3)));
        assert!(!menu.is_submenu_open(export));
        assert!(menu.is_open());
    }

    #[test]
    fn outside_region_includes_open_submenu() {
        let mut menu = menu();
        let export = export_id(&menu);
        menu.update(Message::Open);
        menu.update(Message::OpenSubmenu(export));
        render(&menu);
        let sub = menu.layout.borrow().submenus[0].area;

        let inside = InputEvent::Pointer(click(sub.x + 1, sub.y + 1));
        assert!(menu.update(Message::Document(inside)).is_none());
        assert!(menu.is_open());

        let outside = InputEvent::Pointer(click(49, 13));
        let msgs = menu.update(Message::Document(outside)).into_messages();
        assert!(matches!(
            msgs[0],
            Message::Dismissed(DismissReason::OutsideInteraction)
        ));
        assert!(!menu.is_submenu_open(export));
    }

    #[test]
    fn clicking_disabled_row_keeps_menu_open() {
        let mut menu = menu();
        menu.update(Message::Open);
        render(&menu);
        assert!(menu.update(Message::Pointer(click(3, 6))).is_none());
        assert!(menu.is_open());
    }

    #[test]
    fn keyboard_navigation_skips_inert_rows() {
        let mut menu = menu();
        menu.focus();
        menu.update(key(KeyCode::Enter));
        assert!(menu.is_open());
        assert_eq!(menu.highlighted(), Some(1));
        menu.update(key(KeyCode::Down));
        assert_eq!(menu.highlighted(), Some(2));
        menu.update(key(KeyCode::Down));
        assert_eq!(menu.highlighted(), Some(1));
    }

    #[test]
    fn short_menu_scrolls_to_keep_the_highlight_visible() {
        let mut menu = Menu::new(
            "Pick",
            (1..=6u8)
                .map(|n| MenuEntry::item(format!("Item {n}"), n))
                .collect(),
        )
        .with_align(Align::Start);
        // five rows leave two entry rows under the trigger
        let short = |menu: &Menu<u8>| {
            let mut terminal = Terminal::new(TestBackend::new(30, 5)).unwrap();
            terminal
                .draw(|frame| menu.view(frame, Rect::new(0, 0, 20, 1)))
                .unwrap();
            buffer_to_string(terminal.backend().buffer())
        };
        menu.focus();
        menu.update(Message::KeyPress(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(short(&menu).contains("Item 1"));

        for _ in 0..4 {
            menu.update(Message::KeyPress(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)));
        }
        assert_eq!(menu.highlighted(), Some(4));
        let screen = short(&menu);
        assert!(screen.contains("Item 5"));
        assert!(!screen.contains("Item 1"));

        // the visible rows map back to the entries they show
        let msgs = menu.update(Message::Pointer(click(2, 3))).into_messages();
        assert!(matches!(msgs[0], Message::Activated(5)));
    }

    #[test]
    fn more_entries_than_u16_rows_still_render() {
        let mut menu = Menu::new(
            "Many",
            (0..70_000u32)
                .map(|n| MenuEntry::item(format!("Item {n}"), n))
                .collect(),
        );
        menu.update(Message::Open);
        let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();
        terminal
            .draw(|frame| menu.view(frame, Rect::new(0, 0, 20, 1)))
            .unwrap();
        let screen = buffer_to_string(terminal.backend().buffer());
        assert!(screen.contains("Item 0"));
    }

    #[test]
    fn right_and_left_move_through_submenu() {
        let mut menu = menu();
        let export = export_id(&menu);
        menu.focus();
        menu.update(key(KeyCode::Enter));
        menu.update(key(KeyCode::Down));
        menu.update(key(KeyCode::Right));
        assert!(menu.is_submenu_open(export));
        menu.update(key(KeyCode::Left));
        assert!(!menu.is_submenu_open(export));
        assert!(menu.is_open());

        menu.update(key(KeyCode::Right));
        let msgs = menu.update(key(KeyCode::Enter)).into_messages();
        assert!(matches!(msgs[0], Message::Activated(Act::Csv)));
    }

    #[test]
    fn escape_closes_whole_menu() {
        let mut menu = menu();
        let export = export_id(&menu);
        menu.update(Message::Open);
        menu.update(Message::OpenSubmenu(export));
        let esc = InputEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        let msgs = menu.update(Message::Document(esc)).into_messages();
        assert!(matches!(msgs[0], Message::Dismissed(DismissReason::Escape)));
        assert!(!menu.is_open());
        assert!(!menu.is_submenu_open(export));
    }

    #[test]
    fn listener_only_while_open() {
        let mut menu = menu();
        assert!(menu.subscriptions().is_empty());
        menu.update(Message::Toggle);
        assert_eq!(menu.subscriptions().len(), 1);
        menu.update(Message::Toggle);
        assert!(menu.subscriptions().is_empty());
    }

    #[test]
    #[should_panic(expected = "used outside its Menu")]
    fn foreign_submenu_id_panics() {
        let mut menu = menu();
        let other = Submenu::<Act>::new("Other", vec![]);
        menu.update(Message::OpenSubmenu(other.id()));
    }
}
