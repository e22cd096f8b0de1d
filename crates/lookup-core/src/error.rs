//! Error types for the lookup core
//!
//! Provides error handling for:
//! - Remote lookup failures (the only kind surfaced to the UI)
//! - Illegal state machine transitions
//! - Configuration loading

use crate::state::StatusKind;
use std::path::PathBuf;

/// The single surfaced lookup failure
///
/// Rejected identifiers, not-found records, transport errors and timeouts all
/// collapse into this one variant before they reach the state cell.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Remote lookup failed
    #[error("{0}")]
    LookupFailed(String),
}

impl LookupError {
    /// Create a lookup failure from any displayable message
    #[inline]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::LookupFailed(message.into())
    }

    /// Human-readable failure description
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::LookupFailed(message) => message,
        }
    }
}

/// Controller handle errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// Controller task has exited
    #[error("lookup controller is shut down")]
    Closed,
}

/// State machine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    /// Transition is not in the table
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        /// Source status
        from: StatusKind,
        /// Requested status
        to: StatusKind,
    },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::LookupConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}
