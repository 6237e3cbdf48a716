//! **sorrel** -- stateful interactive UI primitives for [`ratatui`].
//!
//! The umbrella crate: one dependency gives you the runtime and the widgets.
//!
//! ```toml
//! [dependencies]
//! sorrel = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * Everything public in [`sorrel_core`] is available at the crate root
//!   ([`Model`], [`Component`], [`ControlledComponent`], [`Command`],
//!   [`Subscription`], [`Program`], [`run`], [`run_with`], ...).
//! * [`widgets`] re-exports [`sorrel_widgets`] (accordion, select, menu,
//!   range slider, toasts, tabs, modal, and the overlay helpers).
//! * [`ratatui`], [`crossterm`], and [`tokio`] are re-exported so downstream
//!   crates do not need to depend on them directly.
//!
//! # Quick start
//!
//! ```ignore
//! use sorrel::widgets::accordion::{self, Accordion, Panel};
//! use sorrel::{Command, Component, Model, Subscription};
//! use sorrel::ratatui::Frame;
//!
//! struct Faq { panels: Accordion }
//! enum Msg { Faq(accordion::Message) }
//!
//! impl Model for Faq {
//!     type Message = Msg;
//!     type Flags = ();
//!
//!     fn init(_: ()) -> (Self, Command<Msg>) {
//!         let panels = Accordion::new(vec![
//!             Panel::new("what", "What is it?", "A widget kit."),
//!             Panel::new("why", "Why?", "State lives in one place."),
//!         ]);
//!         (Faq { panels }, Command::none())
//!     }
//!     fn update(&mut self, msg: Msg) -> Command<Msg> {
//!         match msg {
//!             Msg::Faq(m) => self.panels.update(m).map(Msg::Faq),
//!         }
//!     }
//!     fn view(&self, frame: &mut Frame) {
//!         self.panels.view(frame, frame.area());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     sorrel::run::<Faq>(()).await.unwrap();
//! }
//! ```

pub use sorrel_core::*;
pub mod widgets {
    pub use sorrel_widgets::*;
}

pub use crossterm;
pub use ratatui;
pub use tokio;
