use crate::command::{Action, Command, CommandInner};
use crate::model::Model;
use crate::subscription::SubscriptionId;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;

/// A headless harness that drives a [`Model`] without a real terminal.
///
/// `TestProgram` runs the init/update/view cycle in a plain `#[test]`.
/// Synchronous commands ([`Command::message`]) are queued and can be flushed
/// with [`drain_messages`](TestProgram::drain_messages); async and terminal
/// commands are ignored. Declared subscriptions are never started, but their
/// ids can be inspected with [`subscription_ids`](TestProgram::subscription_ids)
/// to check which listeners a state would hold.
///
/// # Example
///
/// ```rust,ignore
/// use sorrel_core::testing::TestProgram;
///
/// let mut prog = TestProgram::<Page>::new(());
/// prog.send(Msg::Faq(accordion::Message::Toggle(shipping)));
/// prog.drain_messages();
/// assert!(prog.model().faq.is_expanded(&shipping));
///
/// let output = prog.render_string(40, 8);
/// assert!(output.contains("Shipping"));
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    pending_messages: Vec<M::Message>,
    quit: bool,
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`] with the given flags.
    ///
    /// Synchronous commands produced by `init` are queued.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            pending_messages: Vec::new(),
            quit: false,
        };
        program.collect_sync_messages(init_cmd);
        program
    }

    /// Send a message, triggering a single update cycle.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect_sync_messages(cmd);
    }

    /// Process pending synchronous messages until none are left.
    ///
    /// Messages are handled in the order they were produced, which mirrors
    /// the runtime's queue.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                let cmd = self.model.update(msg);
                self.collect_sync_messages(cmd);
            }
        }
    }

    /// Send a message and flush everything it produces.
    pub fn send_and_drain(&mut self, msg: M::Message) {
        self.send(msg);
        self.drain_messages();
    }

    /// Get a shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model for direct test setup.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Whether a [`Command::quit`] has been returned.
    pub fn has_quit(&self) -> bool {
        self.quit
    }

    /// The ids of the subscriptions the model declares in its current state.
    pub fn subscription_ids(&self) -> Vec<SubscriptionId> {
        self.model
            .subscriptions()
            .iter()
            .map(|sub| sub.id().clone())
            .collect()
    }

    /// Render the model to a ratatui [`Buffer`] of the given dimensions.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                self.model.view(frame);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    /// Render the model and return the visible content as a plain string,
    /// one line per row.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        buffer_to_string(&self.render(width, height))
    }

    fn collect_sync_messages(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Action(Action::Message(msg)) => {
                self.pending_messages.push(msg);
            }
            CommandInner::Action(Action::Quit) => {
                self.quit = true;
            }
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.collect_sync_messages(cmd);
                }
            }
            CommandInner::Terminal(_) => {}
        }
    }
}

/// Flatten a buffer into text, one line per row.
pub fn buffer_to_string(buf: &Buffer) -> String {
    let area: Rect = buf.area;
    let mut output = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            output.push_str(buf[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            output.push('\n');
        }
    }
    output
}
