//! Stateful interactive primitives for the **sorrel** terminal widget kit.
//!
//! Each widget owns its interaction state (open/closed, expanded items,
//! highlighted rows, drag gestures) and renders into a [`ratatui`] area.
//! Widgets whose value belongs to the page implement
//! [`sorrel_core::ControlledComponent`]; the rest implement
//! [`sorrel_core::Component`].
//!
//! # Widgets
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`accordion`] | Stacked collapsible panels, single or multiple open |
//! | [`menu`] | Dropdown action menu with separators, labels and submenus |
//! | [`modal`] | Centered dialog with actions, dismissed by Escape or backdrop press |
//! | [`range_slider`] | Two-thumb slider over a stepped numeric range |
//! | [`select`] | Single-value selector with a floating option list |
//! | [`tabs`] | Tab strip, controlled or uncontrolled |
//! | [`toast`] | Application-wide notification queue with expiry |
//!
//! # Building blocks
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`disclosure`] | [`OpenSet`](disclosure::OpenSet): which items are open, single or multiple |
//! | [`overlay`] | Open/close state machine, scoped dismissal listener, anchoring |
//! | [`error`] | Configuration errors |
//!
//! # Wiring
//!
//! Pages forward element events (`Pointer`, `KeyPress`) to the widget that
//! owns the targeted area, and must collect every widget's
//! `subscriptions()` into their own. A widget that floats content only
//! declares its document listener while that content is open.

pub mod accordion;
pub mod disclosure;
pub mod error;
pub mod menu;
pub mod modal;
pub mod overlay;
pub mod range_slider;
pub mod select;
mod selection;
pub mod tabs;
pub mod toast;

pub use error::WidgetError;
