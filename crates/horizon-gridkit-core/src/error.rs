//! Error types for Horizon GridKit core.

use std::fmt;

/// Errors that can occur with the async runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncRuntimeError {
    /// Failed to create the runtime.
    CreationFailed(String),
}

impl fmt::Display for AsyncRuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreationFailed(msg) => write!(f, "Failed to create async runtime: {msg}"),
        }
    }
}

impl std::error::Error for AsyncRuntimeError {}

/// A specialized Result type for core runtime operations.
pub type Result<T> = std::result::Result<T, AsyncRuntimeError>;
