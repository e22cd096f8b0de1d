//! HTTP lookup service
//!
//! `GET {base_url}{lookup_path}/{identifier}` against the example backend.
//! The identifier travels as a single percent-encoded path segment and is
//! never validated locally, except that `.` and `..` are refused: URL
//! normalization resolves them (and their `%2E` forms) against the parent
//! path, so the request would reach a different resource.

use crate::error::HttpLookupError;
use async_trait::async_trait;
use lookup_core::{LookupConfig, LookupError, LookupPayload, LookupService};
use reqwest::{Client, Url};
use serde_json::Value;

/// Build the shared reqwest client for a config
pub(crate) fn build_client(config: &LookupConfig) -> Result<Client, HttpLookupError> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(HttpLookupError::Client)
}

/// Append `/`-separated `path` and then `extra` segments to `base`
pub(crate) fn endpoint_url(
    base: &Url,
    path: &str,
    extra: Option<&str>,
) -> Result<Url, HttpLookupError> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| HttpLookupError::InvalidUrl(base.to_string()))?;
        segments.pop_if_empty();
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        if let Some(extra) = extra {
            if is_dot_segment(extra) {
                return Err(HttpLookupError::UnaddressableIdentifier(extra.to_string()));
            }
            segments.push(extra);
        }
    }
    Ok(url)
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, HttpLookupError> {
    Url::parse(base_url).map_err(|e| HttpLookupError::InvalidUrl(format!("{base_url}: {e}")))
}

/// Lookup service backed by the example HTTP API
#[derive(Debug, Clone)]
pub struct HttpLookupService {
    client: Client,
    base_url: Url,
    lookup_path: String,
}

impl HttpLookupService {
    /// Create service from config
    ///
    /// # Errors
    /// - `HttpLookupError::InvalidUrl` if `base_url` does not parse
    /// - `HttpLookupError::Client` if the HTTP client cannot be built
    pub fn new(config: &LookupConfig) -> Result<Self, HttpLookupError> {
        Ok(Self {
            client: build_client(config)?,
            base_url: parse_base_url(&config.base_url)?,
            lookup_path: config.lookup_path.clone(),
        })
    }

    /// URL requested for `identifier`
    ///
    /// # Errors
    /// - `HttpLookupError::InvalidUrl` if the base URL cannot take a path
    /// - `HttpLookupError::UnaddressableIdentifier` for `.` and `..`
    pub fn lookup_url(&self, identifier: &str) -> Result<Url, HttpLookupError> {
        endpoint_url(&self.base_url, &self.lookup_path, Some(identifier))
    }

    /// Fetch `identifier`, keeping the HTTP error detail
    ///
    /// # Errors
    /// Any [`HttpLookupError`].
    pub async fn fetch(&self, identifier: &str) -> Result<LookupPayload, HttpLookupError> {
        let url = self.lookup_url(identifier)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let (code, message) = error_envelope(&body).unwrap_or_else(|| {
                (
                    None,
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string(),
                )
            });
            return Err(HttpLookupError::Status {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let value: Value = serde_json::from_slice(&body)?;
        Ok(LookupPayload::new(identifier, unwrap_data(value)))
    }
}

#[async_trait]
impl LookupService for HttpLookupService {
    async fn lookup(&self, identifier: &str) -> Result<LookupPayload, LookupError> {
        self.fetch(identifier).await.map_err(|e| {
            if e.is_retryable() {
                tracing::warn!("lookup {} failed: {}", identifier, e);
            } else {
                tracing::debug!("lookup {} rejected: {}", identifier, e);
            }
            LookupError::from(e)
        })
    }
}

/// Extract `(code, message)` from a failure body
///
/// Accepts `{"error": {"code", "message"}}`, `{"error": "..."}` and
/// `{"message": "..."}`.
fn error_envelope(body: &[u8]) -> Option<(Option<String>, String)> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let as_string = |v: &Value| v.as_str().map(str::to_string);

    match value.get("error") {
        Some(Value::Object(error)) => {
            let message = error.get("message").and_then(as_string)?;
            Some((error.get("code").and_then(as_string), message))
        }
        Some(Value::String(message)) => Some((None, message.clone())),
        _ => value.get("message").and_then(as_string).map(|m| (None, m)),
    }
}

/// `{"data": x}` becomes `x`; anything else is kept
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
