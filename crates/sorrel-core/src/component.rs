use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::{layout::Rect, Frame};

/// A reusable sub-model that renders into a given [`Rect`] area.
///
/// `Component` is the widget-sized counterpart of [`Model`](crate::Model):
/// its [`view`](Component::view) receives an `area`, so a parent decides
/// where each child renders. The child owns its state; the parent wraps the
/// child's message type in one of its own variants and lifts the child's
/// commands and subscriptions with `.map(..)`.
///
/// # Composition pattern
///
/// ```rust,ignore
/// struct Page { faq: Accordion }
///
/// enum Msg { Faq(accordion::Message) }
///
/// impl Model for Page {
///     // ...
///     fn update(&mut self, msg: Msg) -> Command<Msg> {
///         match msg {
///             Msg::Faq(m) => self.faq.update(m).map(Msg::Faq),
///         }
///     }
///
///     fn subscriptions(&self) -> Vec<Subscription<Msg>> {
///         self.faq.subscriptions().into_iter().map(|s| s.map(Msg::Faq)).collect()
///     }
/// }
/// ```
pub trait Component: Send + 'static {
    /// The component's internal message type.
    type Message: Send + 'static;

    /// Process a message, mutate state, and return a [`Command`] for side effects.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render into a specific `area` of the [`Frame`].
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Declare the subscriptions this component needs in its current state.
    ///
    /// The parent must collect these into its own list on every cycle.
    /// Returning a listener only from a given state scopes the listener to
    /// that state. The default is no subscriptions.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }

    /// Whether this component currently wants keyboard input.
    fn focused(&self) -> bool {
        false
    }
}

/// A component whose committed value is owned by its parent.
///
/// Both [`update`](ControlledComponent::update) and
/// [`view`](ControlledComponent::view) receive the current value by
/// reference; the component never stores its own copy. A change is reported
/// by returning a message from `update`, and only becomes visible once the
/// parent stores the new value and passes it back in.
pub trait ControlledComponent: Send + 'static {
    /// The component's internal message type.
    type Message: Send + 'static;

    /// The externally owned value.
    type Value: ?Sized;

    /// Process a message against the current value.
    fn update(&mut self, msg: Self::Message, value: &Self::Value) -> Command<Self::Message>;

    /// Render the current value into `area`.
    fn view(&self, frame: &mut Frame, area: Rect, value: &Self::Value);

    /// Declare the subscriptions this component needs in its current state.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }

    /// Whether this component currently wants keyboard input.
    fn focused(&self) -> bool {
        false
    }
}
