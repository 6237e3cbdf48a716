use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::Frame;

/// The top-level application trait, following the [Elm Architecture].
///
/// The runtime drives an **init -> update -> view** cycle:
///
/// 1. [`init`](Model::init) creates the initial state and may return a
///    [`Command`].
/// 2. [`view`](Model::view) renders the current state to a [`ratatui::Frame`].
/// 3. Input arrives through [`Subscription`]s and is mapped into messages.
/// 4. [`update`](Model::update) processes each message and may return a
///    [`Command`].
/// 5. [`subscriptions`](Model::subscriptions) is re-read and diffed against
///    the running set; steps 2--5 repeat until the program exits.
///
/// Messages for one model are processed strictly in arrival order, and the
/// subscription diff of one update completes before the next message is
/// handled.
///
/// [Elm Architecture]: https://guide.elm-lang.org/architecture/
pub trait Model: Sized + Send + 'static {
    /// The application's message type.
    type Message: Send + 'static;

    /// Initialization data passed to [`Model::init`].
    type Flags: Send + 'static;

    /// Create the initial model state and an optional startup command.
    fn init(flags: Self::Flags) -> (Self, Command<Self::Message>);

    /// Process a message, mutate state, and return a command for side effects.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render the current state to a ratatui [`Frame`].
    fn view(&self, frame: &mut Frame);

    /// Declare active subscriptions.  Called after every update.
    ///
    /// The default implementation returns an empty list (no subscriptions).
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }
}
