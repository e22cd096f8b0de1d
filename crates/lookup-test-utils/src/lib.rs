//! Testing utilities for the lookup workspace
//!
//! Shared fakes and fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use lookup_core::{ExampleRecord, LookupConfig, LookupError, LookupPayload, LookupService};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};

type Reply = Result<LookupPayload, LookupError>;

struct PendingCall {
    identifier: String,
    reply: oneshot::Sender<Reply>,
}

#[derive(Default)]
struct GateState {
    waiting: VecDeque<PendingCall>,
    calls: Vec<String>,
}

/// Lookup service whose responses are released by the test
///
/// Each call parks until `release` (or `succeed`/`fail`) answers it, so a
/// test decides exactly when and in which order completions arrive.
#[derive(Default)]
pub struct GatedLookupService {
    state: Mutex<GateState>,
    arrived: Notify,
}

impl GatedLookupService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers received so far, in arrival order
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Wait until at least `n` calls have arrived
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.arrived.notified();
            if self.call_count() >= n {
                return;
            }
            notified.await;
        }
    }

    /// Number of calls still parked with a live caller
    pub fn parked(&self) -> usize {
        let mut state = self.state.lock();
        state.waiting.retain(|call| !call.reply.is_closed());
        state.waiting.len()
    }

    /// Answer the oldest live parked call for `identifier`
    ///
    /// Calls whose caller has gone away (for instance because the request
    /// was cancelled) are pruned first. Returns `false` if no live call for
    /// `identifier` is parked.
    pub fn release(&self, identifier: &str, reply: Reply) -> bool {
        let pending = {
            let mut state = self.state.lock();
            state.waiting.retain(|call| !call.reply.is_closed());
            let idx = state
                .waiting
                .iter()
                .position(|call| call.identifier == identifier);
            idx.and_then(|idx| state.waiting.remove(idx))
        };

        match pending {
            Some(call) => call.reply.send(reply).is_ok(),
            None => false,
        }
    }

    pub fn succeed(&self, identifier: &str) -> bool {
        self.release(identifier, Ok(payload_for(identifier)))
    }

    pub fn fail(&self, identifier: &str, message: &str) -> bool {
        self.release(identifier, Err(LookupError::failed(message)))
    }
}

#[async_trait]
impl LookupService for GatedLookupService {
    async fn lookup(&self, identifier: &str) -> Result<LookupPayload, LookupError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock();
            state.calls.push(identifier.to_string());
            state.waiting.push_back(PendingCall {
                identifier: identifier.to_string(),
                reply: tx,
            });
        }
        self.arrived.notify_waiters();

        rx.await
            .unwrap_or_else(|_| Err(LookupError::failed("gate dropped without reply")))
    }
}

/// Wraps a service and counts the calls it receives
pub struct CountingLookupService<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S: LookupService> CountingLookupService<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: LookupService> LookupService for CountingLookupService<S> {
    async fn lookup(&self, identifier: &str) -> Result<LookupPayload, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(identifier).await
    }
}

/// Example record with a fixed timestamp
pub fn example_record(id: &str) -> ExampleRecord {
    ExampleRecord {
        id: id.to_string(),
        full_name: Some(format!("User {id}")),
        avatar_url: Some(format!("https://avatars.example.com/{id}.png")),
        bio: None,
        updated_at: Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .unwrap_or_default(),
    }
}

/// Success payload carrying [`example_record`]
pub fn payload_for(id: &str) -> LookupPayload {
    LookupPayload::new(id, example_record(id).to_json())
}

/// Config with a short timeout suitable for tests
pub fn test_config() -> LookupConfig {
    LookupConfig::new().with_request_timeout(Duration::from_secs(5))
}
