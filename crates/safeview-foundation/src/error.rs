//! Internal error types shared by the safeview crates.
//!
//! These are plumbing errors for operations that are naturally fallible in
//! the Rust sense (`Result`-propagated) — reading raw bytes, parsing JSON,
//! looking up an asset URL. They are distinct from the validator's
//! accumulated `Error` *values* (see `safeview_validator::ErrorCode`), which
//! describe defects in the UGC document itself rather than failures of the
//! host program.

use thiserror::Error;

/// The error type for fallible operations shared across safeview crates.
#[derive(Error, Debug, Clone)]
#[must_use = "errors should be handled or propagated"]
pub enum FoundationError {
    /// The raw input exceeded the size gate before JSON parsing was attempted.
    #[error("input size {size} exceeds the {limit} byte size gate")]
    InputTooLarge {
        /// The size of the rejected input, in bytes.
        size: usize,
        /// The configured limit that was exceeded.
        limit: usize,
    },

    /// The raw input was not valid JSON.
    #[error("invalid JSON: {context}")]
    InvalidJson {
        /// Description of the parse failure.
        context: String,
    },

    /// A generic foundation error with a custom message.
    #[error("{message}")]
    Generic {
        /// The error message.
        message: String,
    },
}

impl FoundationError {
    /// Creates a new input-too-large error.
    pub const fn input_too_large(size: usize, limit: usize) -> Self {
        Self::InputTooLarge { size, limit }
    }

    /// Creates a new invalid-JSON error.
    pub fn invalid_json(context: impl Into<String>) -> Self {
        Self::InvalidJson {
            context: context.into(),
        }
    }

    /// Creates a new generic error.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }
}

/// A type alias for `Result<T, FoundationError>`.
pub type Result<T> = std::result::Result<T, FoundationError>;

/// Convenient error-context utilities, mirrored from the patterns the
/// foundation crate uses everywhere it converts third-party errors.
pub trait ErrorContext<T> {
    /// Adds context to an error result.
    fn with_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| FoundationError::generic(format!("{}: {}", context.into(), e)))
    }
}
