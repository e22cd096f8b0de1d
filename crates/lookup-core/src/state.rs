//! Lookup state cell
//!
//! `LookupState` is the tagged variant rendered by the presentation layer.
//! Exactly one variant is active at a time.

use crate::error::LookupError;
use crate::types::LookupPayload;
use serde::{Deserialize, Serialize};

/// Fetch status of the lookup
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LookupState {
    /// Nothing requested, or the last input was blank
    #[default]
    Idle,
    /// Request in flight
    Fetching {
        /// Identifier being fetched
        identifier: String,
    },
    /// Request resolved
    Success {
        /// Identifier that produced the payload
        identifier: String,
        /// Resolved payload
        payload: LookupPayload,
    },
    /// Request failed
    Error {
        /// Identifier that produced the failure
        identifier: String,
        /// Failure description
        error: LookupError,
    },
}

impl LookupState {
    /// Discriminant of this state
    #[inline]
    #[must_use]
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Idle => StatusKind::Idle,
            Self::Fetching { .. } => StatusKind::Fetching,
            Self::Success { .. } => StatusKind::Success,
            Self::Error { .. } => StatusKind::Error,
        }
    }

    /// Identifier the state refers to, if any
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Fetching { identifier }
            | Self::Success { identifier, .. }
            | Self::Error { identifier, .. } => Some(identifier),
        }
    }

    /// Resolved payload in `Success`
    #[must_use]
    pub fn payload(&self) -> Option<&LookupPayload> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Failure in `Error`
    #[must_use]
    pub fn error(&self) -> Option<&LookupError> {
        match self {
            Self::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether a request is in flight
    #[inline]
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching { .. })
    }

    /// Whether the last submission has an outcome (or there is none pending)
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.is_fetching()
    }
}

/// Fieldless status, one per [`LookupState`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Idle
    Idle,
    /// Fetching
    Fetching,
    /// Success
    Success,
    /// Error
    Error,
}

impl StatusKind {
    /// All statuses in display order
    pub const ALL: [StatusKind; 4] = [Self::Idle, Self::Fetching, Self::Success, Self::Error];

    /// Badge text shown by the presentation layer
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Fetching => "Fetching",
            Self::Success => "Success",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
