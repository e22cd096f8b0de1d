//! Remote lookup collaborator
//!
//! The controller only sees [`LookupService`]. The HTTP implementation lives
//! in `lookup-http`; [`InMemoryLookupService`] mirrors the example backend's
//! behaviour for demos and tests.

use crate::error::LookupError;
use crate::types::{ExampleRecord, LookupPayload};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Outbound port for looking up an entity by identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LookupService: Send + Sync {
    /// Fetch the entity for `identifier`.
    ///
    /// Every failure, including a rejected identifier, is a
    /// [`LookupError::LookupFailed`].
    async fn lookup(&self, identifier: &str) -> Result<LookupPayload, LookupError>;
}

/// Identifier of the record seeded by [`InMemoryLookupService::demo`]
pub const DEMO_RECORD_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Dictionary-backed lookup service
///
/// Rejects identifiers that are not UUIDs and reports unknown UUIDs as not
/// found, the way the example backend answers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLookupService {
    records: HashMap<Uuid, serde_json::Value>,
    latency: Duration,
}

impl InMemoryLookupService {
    /// Create empty service
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Service seeded with one example record and a visible delay
    #[must_use]
    pub fn demo() -> Self {
        let record = ExampleRecord {
            id: DEMO_RECORD_ID.to_string(),
            full_name: Some("Demo User".to_string()),
            avatar_url: None,
            bio: Some("Seed record served by the in-memory backend".to_string()),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
        };
        Self::new()
            .with_record(&record)
            .with_latency(Duration::from_millis(400))
    }

    /// With record keyed by its id
    ///
    /// Records whose id is not a UUID are skipped with a warning.
    #[must_use]
    pub fn with_record(mut self, record: &ExampleRecord) -> Self {
        match Uuid::parse_str(&record.id) {
            Ok(id) => {
                self.records.insert(id, record.to_json());
            }
            Err(e) => tracing::warn!("skipping record with invalid id {}: {}", record.id, e),
        }
        self
    }

    /// With raw JSON body for a UUID
    #[must_use]
    pub fn with_body(mut self, id: Uuid, body: serde_json::Value) -> Self {
        self.records.insert(id, body);
        self
    }

    /// With artificial response delay
    #[inline]
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of stored records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the service holds no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl LookupService for InMemoryLookupService {
    async fn lookup(&self, identifier: &str) -> Result<LookupPayload, LookupError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let id = Uuid::parse_str(identifier)
            .map_err(|e| LookupError::failed(format!("invalid UUID `{identifier}`: {e}")))?;

        self.records
            .get(&id)
            .map(|body| LookupPayload::new(identifier, body.clone()))
            .ok_or_else(|| LookupError::failed(format!("no record found for {id}")))
    }
}
