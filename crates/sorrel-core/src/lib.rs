//! Core runtime for the **sorrel** terminal widget kit.
//!
//! `sorrel-core` provides the traits, types, and runtime that the sorrel
//! widgets are built on. Programs follow the [Elm Architecture]: state changes
//! only inside `update`, side effects leave through [`Command`]s, and
//! long-lived listeners are declared as [`Subscription`]s.
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Model`] | Top-level application trait (init / update / view) |
//! | [`Component`] | Reusable sub-model that renders into a [`ratatui::layout::Rect`] |
//! | [`ControlledComponent`] | Component whose value is owned by its parent |
//! | [`Command`] | A side effect or a message reported to the parent |
//! | [`Subscription`] | Scoped event source, started and stopped by state |
//! | [`InputBus`] | Broadcast of every terminal event, read once by the runtime |
//! | [`Program`] | Wires a [`Model`] to a real terminal and drives the event loop |
//! | [`TestProgram`](testing::TestProgram) | Headless harness for unit tests |
//!
//! # Scoped listeners
//!
//! Widgets such as menus and selects only listen for outside clicks and
//! Escape while they are open. They do this by returning a
//! [`document_events`] subscription from `subscriptions()` in that state.
//! After every update the runtime diffs the declared set against the running
//! one, so a listener lives exactly as long as the state that declared it.
//!
//! [Elm Architecture]: https://guide.elm-lang.org/architecture/

pub mod bus;
pub mod command;
pub mod component;
pub mod event;
pub mod model;
pub mod runtime;
pub mod subscription;
pub mod subscriptions;
pub mod testing;

pub use bus::InputBus;
pub use command::{Command, MouseMode, TerminalCommand};
pub use component::{Component, ControlledComponent};
pub use event::{hits, inside_any, press_position, InputEvent};
pub use model::Model;
pub use runtime::{Program, ProgramError, ProgramHandle, ProgramOptions};
pub use subscription::{subscribe, Subscription, SubscriptionId, SubscriptionSource};
pub use subscriptions::{document_events, listener_key, After, DocumentEvents};

/// Run a sorrel application with default options.
pub async fn run<M: Model>(flags: M::Flags) -> Result<M, ProgramError> {
    Program::<M>::new(flags)?.run().await
}

/// Run with custom options.
pub async fn run_with<M: Model>(
    flags: M::Flags,
    options: ProgramOptions,
) -> Result<M, ProgramError> {
    Program::<M>::with_options(flags, options)?.run().await
}
