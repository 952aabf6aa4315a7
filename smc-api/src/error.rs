//! The single error type shared by every emulator surface.

use thiserror::Error;

/// Errors raised by the host emulator and by modules running inside it.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModuleError {
    /// An index, key, handle or parameter was rejected. Nothing changed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The tree refused a structural change, e.g. removing a container
    /// that still has children. Nothing changed.
    #[error("structural conflict: {0}")]
    Conflict(String),

    /// A module entry point or a managed unit failed.
    #[error("module failure: {0}")]
    Failure(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ModuleError {
    /// Shorthand for [`ModuleError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Shorthand for [`ModuleError::Failure`].
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// True for argument errors, structural conflicts included.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::Conflict(_))
    }

    /// Reject `index` unless it addresses one of `len` items.
    pub fn check_index(what: &str, index: usize, len: usize) -> Result<(), Self> {
        if index < len {
            Ok(())
        } else {
            Err(Self::invalid(format!("{what} index {index} out of range (count {len})")))
        }
    }
}

impl From<serde_json::Error> for ModuleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
