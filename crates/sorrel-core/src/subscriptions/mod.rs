//! Built-in subscription sources.
//!
//! - **Document listeners** ([`document_events`]) -- every input event from
//!   the [`InputBus`](crate::bus::InputBus), filtered and mapped per listener.
//! - **Timers** ([`After`]) -- one-shot delays, optionally keyed so that many
//!   can run side by side.

mod document;
mod timer;

pub use document::*;
pub use timer::*;
