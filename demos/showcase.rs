//! # Showcase
//!
//! Every sorrel primitive on one screen:
//! - Tabs switching between a widget page and an about page
//! - Accordion with a single open panel
//! - Select bound to a page-owned value
//! - Menu with a disabled item, a label, a separator and a submenu
//! - Range slider bound to a page-owned range
//! - Toasts raised by widgets and by a background task
//! - A confirmation modal
//!
//! Keys: `Shift+Tab` moves focus between widgets, `t` raises a toast,
//! `q` quits. The mouse works everywhere.
//!
//! Logs go to `showcase.log`; set `RUST_LOG=sorrel_widgets=debug` to see
//! overlay, drag and toast transitions.
//!
//! Run with: `cargo run --example showcase`

use std::time::Duration;

use sorrel::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use sorrel::ratatui::layout::{Constraint, Layout, Rect};
use sorrel::ratatui::style::{Color, Style};
use sorrel::ratatui::text::Line;
use sorrel::ratatui::widgets::{Paragraph, Wrap};
use sorrel::ratatui::Frame;
use sorrel::widgets::accordion::{self, Accordion, Panel};
use sorrel::widgets::disclosure::ItemId;
use sorrel::widgets::menu::{self, Menu, MenuEntry, MenuItem, Submenu};
use sorrel::widgets::modal::{self, Action, Modal};
use sorrel::widgets::range_slider::{self, RangeSlider, SliderRange};
use sorrel::widgets::select::{self, Select, SelectOption};
use sorrel::widgets::tabs::{self, TabItem, Tabs};
use sorrel::widgets::toast::{self, Toast, Toaster};
use sorrel::{
    document_events, listener_key, Command, Component, ControlledComponent, InputEvent, Model,
    Program, ProgramOptions, Subscription,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
enum FileAction {
    New,
    Open,
    Recent(&'static str),
    Print,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pane {
    Tabs,
    Faq,
    Fruit,
    File,
    Price,
}

const PANES: [Pane; 5] = [Pane::Tabs, Pane::Faq, Pane::Fruit, Pane::File, Pane::Price];

enum Msg {
    Input(InputEvent),
    Tabs(tabs::Message),
    Faq(accordion::Message),
    Fruit(select::Message),
    File(menu::Message<FileAction>),
    Price(range_slider::Message),
    Toasts(toast::Message),
    Confirm(modal::Message),
}

struct Showcase {
    listener: u64,
    focus: Pane,
    tabs: Tabs,
    faq: Accordion,
    fruit: String,
    fruit_picker: Select,
    file_menu: Menu<FileAction>,
    price: SliderRange,
    price_slider: RangeSlider,
    toaster: Toaster,
    confirm: Modal,
}

impl Showcase {
    fn toast(&mut self, toast: Toast) {
        self.toaster.push(toast);
    }

    fn move_focus(&mut self) {
        let at = PANES.iter().position(|p| *p == self.focus).unwrap_or(0);
        self.focus = PANES[(at + 1) % PANES.len()];
        self.tabs.blur();
        self.faq.blur();
        self.fruit_picker.blur();
        self.file_menu.blur();
        self.price_slider.blur();
        match self.focus {
            Pane::Tabs => self.tabs.focus(),
            Pane::Faq => self.faq.focus(),
            Pane::Fruit => self.fruit_picker.focus(),
            Pane::File => self.file_menu.focus(),
            Pane::Price => self.price_slider.focus(),
        }
    }

    /// Route a terminal event to the widget it targets.
    fn route(&mut self, event: InputEvent) -> Command<Msg> {
        match event {
            InputEvent::Key(key) if key.kind == KeyEventKind::Press => self.route_key(key),
            InputEvent::Pointer(mouse) => self.route_pointer(mouse),
            _ => Command::none(),
        }
    }

    fn route_key(&mut self, key: KeyEvent) -> Command<Msg> {
        if self.confirm.is_visible() {
            return self.update(Msg::Confirm(modal::Message::KeyPress(key)));
        }
        let floating = self.fruit_picker.is_open() || self.file_menu.is_open();
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Command::quit();
            }
            KeyCode::Char('q') if !floating => return Command::quit(),
            KeyCode::Char('t') if !floating => {
                self.toast(Toast::new().title("Hello").description("Raised from the keyboard."));
                return Command::none();
            }
            KeyCode::BackTab if !floating => {
                self.move_focus();
                return Command::none();
            }
            _ => {}
        }
        match self.focus {
            Pane::Tabs => self.update(Msg::Tabs(tabs::Message::KeyPress(key))),
            Pane::Faq => self.update(Msg::Faq(accordion::Message::KeyPress(key))),
            Pane::Fruit => self.update(Msg::Fruit(select::Message::KeyPress(key))),
            Pane::File => self.update(Msg::File(menu::Message::KeyPress(key))),
            Pane::Price => self.update(Msg::Price(range_slider::Message::KeyPress(key))),
        }
    }

    /// Floating content sits on top, so it gets pointer events first and
    /// exclusively. Everything else hit-tests its own areas.
    fn route_pointer(&mut self, mouse: MouseEvent) -> Command<Msg> {
        if self.confirm.is_visible() {
            return self.update(Msg::Confirm(modal::Message::Pointer(mouse)));
        }
        if self.fruit_picker.is_open() {
            return self.update(Msg::Fruit(select::Message::Pointer(mouse)));
        }
        if self.file_menu.is_open() {
            return self.update(Msg::File(menu::Message::Pointer(mouse)));
        }
        let mut cmds = vec![
            self.update(Msg::Toasts(toast::Message::Pointer(mouse))),
            self.update(Msg::Tabs(tabs::Message::Pointer(mouse))),
        ];
        if self.tabs.is_active("widgets") {
            cmds.push(self.update(Msg::Faq(accordion::Message::Pointer(mouse))));
            cmds.push(self.update(Msg::Fruit(select::Message::Pointer(mouse))));
            cmds.push(self.update(Msg::File(menu::Message::Pointer(mouse))));
            cmds.push(self.update(Msg::Price(range_slider::Message::Pointer(mouse))));
        }
        Command::batch(cmds)
    }

    fn on_file_action(&mut self, action: FileAction) {
        match action {
            FileAction::New => self.toast(Toast::new().title("New file")),
            FileAction::Open => self.toast(Toast::new().title("Open...")),
            FileAction::Recent(name) => {
                self.toast(Toast::new().title("Reopened").description(name));
            }
            FileAction::Print => {}
            FileAction::Delete => self.confirm.show(),
        }
    }

    fn view_widgets(&self, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(area);
        self.faq.view(frame, left);

        let [fruit_row, _, file_row, _, price_row, price_text] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(right);

        self.price_slider.view(frame, price_row, &self.price);
        frame.render_widget(
            Paragraph::new(format!("price {:.0} .. {:.0}", self.price.low, self.price.high)),
            price_text,
        );
        // Floating content renders from inside these calls, so they go last.
        self.file_menu.view(frame, file_row);
        self.fruit_picker.view(frame, fruit_row, &self.fruit);
    }
}

impl Model for Showcase {
    type Message = Msg;
    type Flags = ();

    fn init(_: ()) -> (Self, Command<Msg>) {
        let mut tabs = Tabs::new(vec![
            TabItem::new("widgets", "Widgets"),
            TabItem::new("about", "About"),
        ]);
        tabs.focus();

        let faq = Accordion::new(vec![
            Panel::new("what", "What is this?", "A tour of the sorrel primitives."),
            Panel::new("mouse", "Does the mouse work?", "Click triggers, drag thumbs, hover submenus."),
            Panel::new("keys", "And the keyboard?", "Shift+Tab moves focus. Arrows, Enter and Esc do the rest."),
        ])
        .with_initial_open([ItemId::from("what")]);

        let fruit_picker = Select::new(vec![
            SelectOption::new("apple", "Apple"),
            SelectOption::new("banana", "Banana"),
            SelectOption::new("cherry", "Cherry"),
        ])
        .with_placeholder("Pick a fruit");

        let file_menu = Menu::new(
            "File",
            vec![
                MenuEntry::label("Document"),
                MenuEntry::item("New", FileAction::New),
                MenuEntry::item("Open", FileAction::Open),
                MenuEntry::Submenu(Submenu::new(
                    "Open recent",
                    vec![
                        MenuItem::new("notes.md", FileAction::Recent("notes.md")),
                        MenuItem::new("todo.txt", FileAction::Recent("todo.txt")),
                    ],
                )),
                MenuEntry::Item(MenuItem::new("Print", FileAction::Print).disabled()),
                MenuEntry::Separator,
                MenuEntry::item("Delete", FileAction::Delete),
            ],
        );

        let price_slider = RangeSlider::new(0.0, 100.0, 5.0).expect("valid slider bounds");

        let confirm = Modal::new("Delete file?")
            .description("This cannot be undone.")
            .body("The file and its history will be removed.")
            .action(Action::new("Delete").with_shortcut('d'))
            .action(Action::new("Cancel").with_shortcut('c'));

        (
            Showcase {
                listener: listener_key(),
                focus: Pane::Tabs,
                tabs,
                faq,
                fruit: String::new(),
                fruit_picker,
                file_menu,
                price: SliderRange::new(20.0, 80.0),
                price_slider,
                toaster: Toaster::new().with_duration(Duration::from_secs(4)),
                confirm,
            },
            Command::none(),
        )
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Input(event) => self.route(event),
            Msg::Tabs(m) => self.tabs.update(m).map(Msg::Tabs),
            Msg::Faq(accordion::Message::Toggled { id, open }) => {
                tracing::info!(%id, open, "faq toggled");
                Command::none()
            }
            Msg::Faq(m) => self.faq.update(m).map(Msg::Faq),
            Msg::Fruit(select::Message::ValueChanged(value)) => {
                self.toast(Toast::new().title("Fruit").description(value.clone()));
                self.fruit = value;
                Command::none()
            }
            Msg::Fruit(m) => self.fruit_picker.update(m, &self.fruit).map(Msg::Fruit),
            Msg::File(menu::Message::Activated(action)) => {
                self.on_file_action(action);
                Command::none()
            }
            Msg::File(m) => self.file_menu.update(m).map(Msg::File),
            Msg::Price(range_slider::Message::Changed(range)) => {
                self.price = range;
                Command::none()
            }
            Msg::Price(m) => self.price_slider.update(m, &self.price).map(Msg::Price),
            Msg::Toasts(toast::Message::Action(id)) => {
                self.toaster.dismiss(id);
                self.toast(Toast::new().title("Restored"));
                Command::none()
            }
            Msg::Toasts(m) => self.toaster.update(m).map(Msg::Toasts),
            Msg::Confirm(modal::Message::Select(0)) => {
                self.toast(
                    Toast::new()
                        .title("Deleted")
                        .description("The file is gone.")
                        .action("Undo")
                        .destructive(),
                );
                Command::none()
            }
            Msg::Confirm(m) => self.confirm.update(m).map(Msg::Confirm),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let [tab_row, body, status] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.tabs.view(frame, tab_row);
        if self.tabs.is_active("widgets") {
            self.view_widgets(frame, body);
        } else {
            let about = vec![
                Line::raw("sorrel keeps every listener scoped to the state that needs it."),
                Line::raw(""),
                Line::raw("Open a menu and watch the log: the outside-click listener"),
                Line::raw("starts on open and stops on every way out."),
            ];
            frame.render_widget(Paragraph::new(about).wrap(Wrap { trim: false }), body);
        }

        let fruit = if self.fruit.is_empty() { "none" } else { self.fruit.as_str() };
        frame.render_widget(
            Paragraph::new(format!(
                " focus: {:?} | fruit: {fruit} | toasts: {} | Shift+Tab focus, t toast, q quit",
                self.focus,
                self.toaster.len()
            ))
            .style(Style::default().fg(Color::DarkGray)),
            status,
        );

        self.toaster.view(frame, frame.area());
        self.confirm.view(frame, frame.area());
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        let mut subs = vec![document_events(self.listener, |event| Some(Msg::Input(event)))];
        subs.extend(self.faq.subscriptions().into_iter().map(|s| s.map(Msg::Faq)));
        subs.extend(self.fruit_picker.subscriptions().into_iter().map(|s| s.map(Msg::Fruit)));
        subs.extend(self.file_menu.subscriptions().into_iter().map(|s| s.map(Msg::File)));
        subs.extend(self.price_slider.subscriptions().into_iter().map(|s| s.map(Msg::Price)));
        subs.extend(self.toaster.subscriptions().into_iter().map(|s| s.map(Msg::Toasts)));
        subs.extend(self.confirm.subscriptions().into_iter().map(|s| s.map(Msg::Confirm)));
        subs
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log = std::fs::File::create("showcase.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(log))
        .with_ansi(false)
        .init();

    let options = ProgramOptions {
        title: Some("sorrel showcase".into()),
        ..ProgramOptions::default()
    };
    let program = Program::<Showcase>::with_options((), options)?;

    let handle = program.handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.send(Msg::Toasts(toast::Message::Push(
            Toast::new()
                .title("Welcome")
                .description("This one came from a background task."),
        )));
    });

    program.run().await?;
    Ok(())
}
