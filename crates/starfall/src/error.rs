//! # Simulation Error Types
//!
//! Only wiring and configuration problems are errors. Runtime conditions
//! inside a tick (pool underflow, lost player, stale handles) degrade to
//! fallbacks and never surface here.

use std::path::PathBuf;

use starfall_core::PoolError;
use thiserror::Error;

/// Invalid configuration data.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`crate::config::SimConfig`].
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// Difficulty thresholds are not sorted by time.
    #[error("difficulty thresholds not sorted by time at entry {index}")]
    UnsortedThresholds {
        /// First out-of-order entry.
        index: usize,
    },

    /// Difficulty thresholds lower enemy health over time.
    #[error("difficulty threshold {index} lowers enemy health")]
    DecreasingHealth {
        /// First entry whose health is below its predecessor's.
        index: usize,
    },

    /// Difficulty table has no entries.
    #[error("difficulty table is empty")]
    EmptyThresholds,

    /// A numeric field is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Errors surfaced by the simulation's setup paths.
#[derive(Error, Debug)]
pub enum SimError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Pool registry misuse.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result type for simulation setup.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: SimError = ConfigError::EmptyThresholds.into();
        assert!(matches!(err, SimError::Config(ConfigError::EmptyThresholds)));

        let err: SimError = PoolError::Unregistered { key: "x".into() }.into();
        assert!(err.to_string().contains('x'));
    }
}
