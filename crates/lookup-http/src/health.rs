//! Backend health probe

use crate::error::HttpLookupError;
use crate::service::{build_client, endpoint_url, parse_base_url};
use lookup_core::LookupConfig;
use reqwest::{Client, Url};
use std::time::{Duration, Instant};

/// Outcome of one health request
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    /// Whether the backend answered with a success status
    pub healthy: bool,
    /// HTTP status code
    pub status_code: u16,
    /// Round-trip time
    pub latency: Duration,
    /// JSON body, when the backend sent one
    pub body: Option<serde_json::Value>,
}

impl std::fmt::Display for HealthReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (HTTP {}, {}ms)",
            if self.healthy { "healthy" } else { "unhealthy" },
            self.status_code,
            self.latency.as_millis()
        )
    }
}

/// Probes the backend health endpoint
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: Client,
    url: Url,
}

impl HealthProbe {
    /// Create probe from config
    ///
    /// # Errors
    /// - `HttpLookupError::InvalidUrl` if `base_url` does not parse
    /// - `HttpLookupError::Client` if the HTTP client cannot be built
    pub fn new(config: &LookupConfig) -> Result<Self, HttpLookupError> {
        let base = parse_base_url(&config.base_url)?;
        Ok(Self {
            client: build_client(config)?,
            url: endpoint_url(&base, &config.health_path, None)?,
        })
    }

    /// Probed URL
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send one health request
    ///
    /// A non-success status is reported as unhealthy, not as an error.
    ///
    /// # Errors
    /// `HttpLookupError::Transport` or `HttpLookupError::Timeout` when no
    /// response arrives.
    pub async fn check(&self) -> Result<HealthReport, HttpLookupError> {
        let started = Instant::now();
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let latency = started.elapsed();

        let report = HealthReport {
            healthy: status.is_success(),
            status_code: status.as_u16(),
            latency,
            body: serde_json::from_slice(&body).ok(),
        };
        tracing::info!("Backend health at {}: {}", self.url, report);
        Ok(report)
    }
}
