//! # Pool Error Types
//!
//! Errors here are wiring bugs, not runtime conditions. Exhaustion is never
//! an error (pools expand) and double releases are silently ignored.

use thiserror::Error;

/// Errors that can occur when using a [`crate::PoolRegistry`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No pool was registered under this key.
    #[error("no pool registered for type key `{key}`")]
    Unregistered {
        /// The key that was requested.
        key: String,
    },

    /// A pool exists under this key but stores a different object type.
    #[error("pool `{key}` does not hold objects of type `{requested}`")]
    TypeMismatch {
        /// The key that was requested.
        key: String,
        /// Type name the caller asked for.
        requested: &'static str,
    },
}

/// Result type for pool registry operations.
pub type PoolResult<T> = Result<T, PoolError>;
