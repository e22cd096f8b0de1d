//! Lookup controller
//!
//! One tokio task owns the [`LookupMachine`] and the input buffer. UI input
//! and lookup completions are messages on the same queue, so every state
//! change happens on that task and no lock guards the state cell. Observers
//! read snapshots from a `watch` channel.

use crate::config::LookupConfig;
use crate::error::{ControllerError, LookupError};
use crate::service::LookupService;
use crate::state::{LookupState, StatusKind};
use crate::state_machine::{LookupMachine, Resolution, SubmitOutcome};
use crate::types::{LookupPayload, LookupRequest, SubmissionId};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinSet};

/// What observers see
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControllerSnapshot {
    /// Pending input buffer
    pub input: String,
    /// Current lookup state
    pub state: LookupState,
    /// Requests issued since mount
    pub requests_issued: u64,
}

impl ControllerSnapshot {
    /// Status of the snapshot
    #[inline]
    #[must_use]
    pub fn status(&self) -> StatusKind {
        self.state.kind()
    }
}

/// Messages processed by the controller task
#[derive(Debug)]
enum ControllerMessage {
    /// Replace the input buffer
    SetIdentifier(String),
    /// Submit the input buffer
    Submit,
    /// A lookup finished
    Completed {
        request: LookupRequest,
        outcome: Result<LookupPayload, LookupError>,
    },
    /// Unmount
    Shutdown,
}

/// Handle to a running controller
///
/// Cheap to clone. The controller unmounts when `shutdown` is called or the
/// last handle and subscriber are dropped.
#[derive(Debug, Clone)]
pub struct LookupHandle {
    sender: mpsc::UnboundedSender<ControllerMessage>,
    snapshots: watch::Receiver<ControllerSnapshot>,
}

impl LookupHandle {
    /// Update the input buffer without touching the lookup state
    pub fn set_identifier(&self, text: impl Into<String>) {
        self.send(ControllerMessage::SetIdentifier(text.into()));
    }

    /// Submit the current input buffer
    ///
    /// Fire-and-forget: the outcome is observed through snapshots.
    pub fn submit(&self) {
        self.send(ControllerMessage::Submit);
    }

    /// Set the input buffer and submit it
    pub fn submit_identifier(&self, text: impl Into<String>) {
        self.set_identifier(text);
        self.submit();
    }

    /// Unmount the controller, aborting in-flight lookups
    pub fn shutdown(&self) {
        self.send(ControllerMessage::Shutdown);
    }

    /// Latest snapshot
    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Latest lookup state
    #[must_use]
    pub fn state(&self) -> LookupState {
        self.snapshots.borrow().state.clone()
    }

    /// New receiver of snapshots
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.snapshots.clone()
    }

    /// Whether the controller task has exited
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Wait until a snapshot satisfies `predicate`
    ///
    /// # Errors
    /// `ControllerError::Closed` if the controller exits first.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&ControllerSnapshot) -> bool,
    ) -> Result<ControllerSnapshot, ControllerError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| ControllerError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Wait until the state has the given status
    ///
    /// # Errors
    /// `ControllerError::Closed` if the controller exits first.
    pub async fn wait_for_status(
        &self,
        status: StatusKind,
    ) -> Result<ControllerSnapshot, ControllerError> {
        self.wait_for(|s| s.status() == status).await
    }

    /// Wait until the `nth` request (1-based) has settled
    ///
    /// # Errors
    /// `ControllerError::Closed` if the controller exits first.
    pub async fn wait_until_settled(
        &self,
        nth: u64,
    ) -> Result<ControllerSnapshot, ControllerError> {
        self.wait_for(|s| s.requests_issued >= nth && s.state.is_settled())
            .await
    }

    fn send(&self, message: ControllerMessage) {
        if self.sender.send(message).is_err() {
            tracing::debug!("lookup controller is gone, dropping input");
        }
    }
}

/// The controller task state
pub struct LookupController {
    machine: LookupMachine,
    input: String,
    service: Arc<dyn LookupService>,
    request_timeout: Duration,
    cancel_superseded: bool,
    in_flight: JoinSet<()>,
    pending_task: Option<(SubmissionId, AbortHandle)>,
    completions: mpsc::UnboundedSender<ControllerMessage>,
    snapshots: watch::Sender<ControllerSnapshot>,
}

impl LookupController {
    /// Mount a controller on the current tokio runtime
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(service: Arc<dyn LookupService>, config: &LookupConfig) -> LookupHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(ControllerSnapshot::default());

        let controller = Self {
            machine: LookupMachine::new(),
            input: String::new(),
            service,
            request_timeout: config.request_timeout(),
            cancel_superseded: config.cancel_superseded,
            in_flight: JoinSet::new(),
            pending_task: None,
            completions: sender.clone(),
            snapshots: snapshots_tx,
        };
        tokio::spawn(controller.run(receiver));

        LookupHandle {
            sender,
            snapshots: snapshots_rx,
        }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<ControllerMessage>) {
        tracing::debug!("lookup controller mounted");

        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(ControllerMessage::Shutdown) | None => break,
                    Some(msg) => self.handle(msg),
                },
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    if let Err(e) = joined {
                        if !e.is_cancelled() {
                            tracing::warn!("lookup task failed: {}", e);
                        }
                    }
                }
                () = self.snapshots.closed() => break,
            }
        }

        self.in_flight.abort_all();
        tracing::debug!("lookup controller unmounted");
    }

    fn handle(&mut self, msg: ControllerMessage) {
        match msg {
            ControllerMessage::SetIdentifier(text) => {
                self.input = text;
                self.publish();
            }
            ControllerMessage::Submit => self.submit(),
            ControllerMessage::Completed { request, outcome } => self.complete(request, outcome),
            ControllerMessage::Shutdown => {}
        }
    }

    fn submit(&mut self) {
        let outcome = self.machine.submit(&self.input);

        if let Some(superseded) = outcome.superseded() {
            self.cancel(superseded);
        }

        match outcome {
            SubmitOutcome::Cleared { .. } => {
                tracing::debug!("blank submission, lookup reset to idle");
            }
            SubmitOutcome::Issued { request, .. } => {
                tracing::info!(
                    "Looking up {} (submission {})",
                    request.identifier,
                    request.submission
                );
                self.issue(request);
            }
        }
        self.publish();
    }

    fn issue(&mut self, request: LookupRequest) {
        let service = Arc::clone(&self.service);
        let completions = self.completions.clone();
        let timeout = self.request_timeout;
        let submission = request.submission;

        let abort = self.in_flight.spawn(async move {
            let lookup = tokio::time::timeout(timeout, service.lookup(&request.identifier));
            let outcome = match AssertUnwindSafe(lookup).catch_unwind().await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(LookupError::failed(format!(
                    "request timed out after {}ms",
                    timeout.as_millis()
                ))),
                Err(_) => Err(LookupError::failed("lookup service panicked")),
            };
            let _ = completions.send(ControllerMessage::Completed { request, outcome });
        });

        self.pending_task = Some((submission, abort));
    }

    fn cancel(&mut self, superseded: SubmissionId) {
        let Some((submission, abort)) = self.pending_task.take() else {
            return;
        };
        if submission == superseded && self.cancel_superseded {
            tracing::debug!("cancelling superseded submission {}", submission);
            abort.abort();
        }
    }

    fn complete(&mut self, request: LookupRequest, outcome: Result<LookupPayload, LookupError>) {
        if let Err(e) = &outcome {
            tracing::debug!("lookup {} failed: {}", request.identifier, e);
        }

        match self.machine.resolve(&request, outcome) {
            Resolution::Applied(status) => {
                self.pending_task = None;
                tracing::info!(
                    "Lookup {} resolved: {} (submission {})",
                    request.identifier,
                    status,
                    request.submission
                );
                self.publish();
            }
            Resolution::Stale { pending } => {
                tracing::debug!(
                    "discarding stale completion for submission {} (pending: {:?})",
                    request.submission,
                    pending
                );
            }
        }
    }

    fn publish(&self) {
        let snapshot = ControllerSnapshot {
            input: self.input.clone(),
            state: self.machine.state().clone(),
            requests_issued: self.machine.issued(),
        };
        self.snapshots.send_replace(snapshot);
    }
}

impl std::fmt::Debug for LookupController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupController")
            .field("machine", &self.machine)
            .field("input", &self.input)
            .field("request_timeout", &self.request_timeout)
            .field("cancel_superseded", &self.cancel_superseded)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
