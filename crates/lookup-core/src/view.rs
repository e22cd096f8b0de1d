//! Presentation of the lookup state
//!
//! Turns a [`LookupState`] into the text a front end shows: a status badge,
//! an optional message line and the resolved payload.

use crate::state::{LookupState, StatusKind};
use serde::{Deserialize, Serialize};

/// User-visible strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewText {
    /// Input placeholder
    pub placeholder: String,
    /// Submit trigger label
    pub submit_label: String,
    /// Heading of the status section
    pub heading: String,
    /// Instructional message shown while idle
    pub idle_message: String,
    /// Prefix of the failure message
    pub failure_prefix: String,
}

impl Default for ViewText {
    fn default() -> Self {
        Self {
            placeholder: "00000000-0000-0000-0000-000000000000".to_string(),
            submit_label: "Look up".to_string(),
            heading: "Current status".to_string(),
            idle_message: "Enter a UUID and press Look up to fetch the record.".to_string(),
            failure_prefix: "Request failed".to_string(),
        }
    }
}

/// Rendered status section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    /// Section heading
    pub heading: String,
    /// Status badge
    pub badge: StatusKind,
    /// Message line
    pub message: Option<String>,
    /// Pretty-printed payload, only in `Success`
    pub payload: Option<String>,
}

impl StatusView {
    /// Render a state
    #[must_use]
    pub fn render(state: &LookupState, text: &ViewText) -> Self {
        let message = match state {
            LookupState::Idle => Some(text.idle_message.clone()),
            LookupState::Fetching { identifier } => Some(format!("Looking up {identifier}...")),
            LookupState::Success { .. } => None,
            LookupState::Error { error, .. } => {
                Some(format!("{}: {}", text.failure_prefix, error.message()))
            }
        };

        Self {
            heading: text.heading.clone(),
            badge: state.kind(),
            message,
            payload: state.payload().map(|p| p.pretty()),
        }
    }
}

impl std::fmt::Display for StatusView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "== {} ==", self.heading)?;
        write!(f, "[{}]", self.badge)?;
        if let Some(message) = &self.message {
            write!(f, " {message}")?;
        }
        if let Some(payload) = &self.payload {
            write!(f, "\n{payload}")?;
        }
        Ok(())
    }
}
