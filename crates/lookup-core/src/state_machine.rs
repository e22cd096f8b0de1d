//! Fetch-status state machine
//!
//! The transition table and the synchronous core that the controller actor
//! drives. Nothing here performs I/O: `submit` hands back the request to
//! issue and `resolve` applies a completion under the staleness guard.

use crate::error::{LookupError, StateMachineError};
use crate::state::{LookupState, StatusKind};
use crate::types::{LookupPayload, LookupRequest, SubmissionId};

/// Validates a status transition against the table.
pub fn validate_transition(from: StatusKind, to: StatusKind) -> Result<(), StateMachineError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StateMachineError::IllegalTransition { from, to })
    }
}

/// Statuses reachable from `from` in one step.
pub fn allowed_transitions(from: StatusKind) -> Vec<StatusKind> {
    use StatusKind::*;
    match from {
        Idle => vec![Idle, Fetching],
        Fetching => vec![Idle, Fetching, Success, Error],
        Success => vec![Idle, Fetching],
        Error => vec![Idle, Fetching],
    }
}

/// Result of a `submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input: state reset to `Idle`, nothing to send
    Cleared {
        /// Pending submission that was dropped, if any
        superseded: Option<SubmissionId>,
    },
    /// State is `Fetching`: send exactly this request
    Issued {
        /// Request to send
        request: LookupRequest,
        /// Pending submission that was replaced, if any
        superseded: Option<SubmissionId>,
    },
}

impl SubmitOutcome {
    /// Submission made obsolete by this one
    #[inline]
    #[must_use]
    pub fn superseded(&self) -> Option<SubmissionId> {
        match self {
            Self::Cleared { superseded } | Self::Issued { superseded, .. } => *superseded,
        }
    }
}

/// Result of applying a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Completion matched the latest submission
    Applied(StatusKind),
    /// Completion belongs to a superseded or cleared submission
    Stale {
        /// Submission awaiting a result, if any
        pending: Option<SubmissionId>,
    },
}

/// The lookup state cell plus the latest-submission tracker
#[derive(Debug, Default)]
pub struct LookupMachine {
    state: LookupState,
    last_issued: SubmissionId,
    pending: Option<SubmissionId>,
}

impl LookupMachine {
    /// Create machine in `Idle`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &LookupState {
        &self.state
    }

    /// Submission currently awaiting a result
    #[inline]
    #[must_use]
    pub fn pending(&self) -> Option<SubmissionId> {
        self.pending
    }

    /// Number of requests issued so far
    #[inline]
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.last_issued.0
    }

    /// Submit raw input text
    ///
    /// Surrounding whitespace is trimmed. Blank input moves to `Idle` and
    /// issues nothing; anything else moves to `Fetching` and takes a new
    /// ticket, even when the identifier equals the previous one.
    pub fn submit(&mut self, raw: &str) -> SubmitOutcome {
        let superseded = self.pending.take();
        let identifier = raw.trim();

        if identifier.is_empty() {
            self.transition(LookupState::Idle);
            return SubmitOutcome::Cleared { superseded };
        }

        self.last_issued = self.last_issued.next();
        self.pending = Some(self.last_issued);
        self.transition(LookupState::Fetching {
            identifier: identifier.to_string(),
        });

        SubmitOutcome::Issued {
            request: LookupRequest::new(self.last_issued, identifier),
            superseded,
        }
    }

    /// Apply a completed lookup
    ///
    /// Only the completion for the pending submission changes state.
    pub fn resolve(
        &mut self,
        request: &LookupRequest,
        outcome: Result<LookupPayload, LookupError>,
    ) -> Resolution {
        if self.pending != Some(request.submission) {
            return Resolution::Stale {
                pending: self.pending,
            };
        }
        self.pending = None;

        let identifier = request.identifier.clone();
        let next = match outcome {
            Ok(payload) => LookupState::Success {
                identifier,
                payload,
            },
            Err(error) => LookupState::Error { identifier, error },
        };
        let kind = next.kind();
        self.transition(next);
        Resolution::Applied(kind)
    }

    fn transition(&mut self, next: LookupState) {
        debug_assert!(
            validate_transition(self.state.kind(), next.kind()).is_ok(),
            "illegal transition {} -> {}",
            self.state.kind(),
            next.kind()
        );
        self.state = next;
    }
}
