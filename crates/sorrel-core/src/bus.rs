//! Process-wide input broadcast.
//!
//! The runtime reads the terminal exactly once and publishes every event on
//! an [`InputBus`]. Document-level listeners subscribe to the bus when their
//! subscription starts and drop their receiver when it is stopped, so any
//! number of widgets can listen at the same time without competing for the
//! terminal reader.

use crate::event::InputEvent;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// Cloneable sender side of the input broadcast.
#[derive(Clone, Debug)]
pub struct InputBus {
    tx: broadcast::Sender<InputEvent>,
}

impl InputBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus buffering at most `capacity` unread events per listener.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to every active listener.
    ///
    /// Returns the number of listeners that received it. Publishing with no
    /// listeners is not an error.
    pub fn publish(&self, event: InputEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Open a new receiver. Events published before this call are not seen.
    pub fn subscribe(&self) -> broadcast::Receiver<InputEvent> {
        self.tx.subscribe()
    }

    /// Number of receivers currently attached.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InputBus {
    fn default() -> Self {
        Self::new()
    }
}
