//! Error types for Horizon GridKit.

use std::sync::Arc;

use horizon_gridkit_core::AsyncRuntimeError;

/// A boxed error returned by host-supplied reaction callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for GridKit operations.
pub type Result<T> = std::result::Result<T, GridKitError>;

/// Errors raised while building or configuring grid helpers.
#[derive(Debug, thiserror::Error)]
pub enum GridKitError {
    /// No async runtime could be reached or created to run debounced reactions.
    #[error("Async runtime error: {0}")]
    Runtime(#[from] AsyncRuntimeError),

    /// The debouncer configuration could not be parsed from TOML.
    #[error("Invalid debounce configuration (TOML): {0}")]
    ConfigToml(#[from] toml::de::Error),

    /// The debouncer configuration could not be parsed from JSON.
    #[error("Invalid debounce configuration (JSON): {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// The debouncer configuration could not be written as TOML.
    #[error("Failed to serialize debounce configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// A failure reported by a debounced row reaction.
///
/// Delivered to the host through
/// [`GridDebouncer::reaction_failed`](crate::GridDebouncer::reaction_failed).
/// Cancellation is never reported as an error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReactionError {
    /// The callback returned an error.
    #[error("Row reaction callback failed: {0}")]
    Callback(Arc<BoxError>),

    /// The callback panicked. Holds the panic message when it was a string.
    #[error("Row reaction callback panicked: {0}")]
    Panicked(String),
}

impl ReactionError {
    pub(crate) fn callback(error: BoxError) -> Self {
        Self::Callback(Arc::new(error))
    }

    pub(crate) fn panicked(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }

    /// The error returned by the callback, if the callback returned one.
    pub fn callback_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Callback(error) => Some(&***error),
            Self::Panicked(_) => None,
        }
    }
}
