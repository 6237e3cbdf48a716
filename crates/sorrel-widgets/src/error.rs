//! Construction errors for widgets with numeric configuration.

/// Errors raised when a widget is configured with values it cannot work with.
///
/// Runtime input never produces these: out-of-range pointer positions and
/// unknown ids are clamped or ignored. Only constructors validate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WidgetError {
    /// A bound or step was NaN or infinite.
    #[error("slider bounds must be finite (min = {min}, max = {max}, step = {step})")]
    NonFinite { min: f64, max: f64, step: f64 },
    /// `min` was not strictly below `max`.
    #[error("slider min ({min}) must be less than max ({max})")]
    EmptyRange { min: f64, max: f64 },
    /// `step` was zero or negative.
    #[error("slider step must be positive, got {0}")]
    InvalidStep(f64),
}
