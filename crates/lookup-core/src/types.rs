//! Core types for the lookup controller
//!
//! Defines:
//! - Submission tickets used by the staleness guard
//! - Lookup requests and resolved payloads
//! - The example record served by the backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequence number of a non-empty submission
///
/// Every non-empty `submit()` takes the next ticket. A completion is applied
/// only when its ticket equals the latest one issued.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SubmissionId(pub u64);

impl SubmissionId {
    /// Ticket that precedes every real submission
    pub const ZERO: Self = Self(0);

    /// Next ticket in sequence
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A lookup for one identifier
///
/// The identifier is not checked locally; the remote service decides whether
/// it is acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// Ticket of the submission that produced this request
    pub submission: SubmissionId,
    /// Trimmed identifier
    pub identifier: String,
}

impl LookupRequest {
    /// Create new request
    #[inline]
    #[must_use]
    pub fn new(submission: SubmissionId, identifier: impl Into<String>) -> Self {
        Self {
            submission,
            identifier: identifier.into(),
        }
    }
}

/// Resolved lookup result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupPayload {
    /// Identifier the payload was resolved for
    pub identifier: String,
    /// Body returned by the service
    pub body: serde_json::Value,
}

impl LookupPayload {
    /// Create new payload
    #[inline]
    #[must_use]
    pub fn new(identifier: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            identifier: identifier.into(),
            body,
        }
    }

    /// Decode the body as an [`ExampleRecord`]
    ///
    /// # Errors
    /// Returns the serde error when the body has a different shape.
    pub fn record(&self) -> Result<ExampleRecord, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }

    /// Pretty-printed JSON body
    #[must_use]
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| self.body.to_string())
    }
}

/// Example entity exposed by the backend's lookup endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleRecord {
    /// Record UUID
    pub id: String,
    /// Display name
    pub full_name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Free-form biography
    pub bio: Option<String>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl ExampleRecord {
    /// Serialize into the JSON shape the backend emits
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
