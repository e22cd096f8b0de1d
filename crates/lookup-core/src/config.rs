//! Lookup configuration
//!
//! Built with `with_*` methods or loaded from TOML. Every field has a
//! default, so a config file only needs to name what it changes.

use crate::error::ConfigError;
use crate::view::ViewText;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Controller and backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Backend base URL
    pub base_url: String,
    /// Path prefix of the lookup endpoint; the identifier is appended
    pub lookup_path: String,
    /// Path of the backend health endpoint
    pub health_path: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Abort superseded in-flight requests
    pub cancel_superseded: bool,
    /// User-Agent header sent with requests
    pub user_agent: String,
    /// User-visible strings
    pub view: ViewText,
}

impl LookupConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With backend base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With superseded-request cancellation toggled
    #[inline]
    #[must_use]
    pub fn with_cancel_superseded(mut self, cancel: bool) -> Self {
        self.cancel_superseded = cancel;
        self
    }

    /// With user-visible strings
    #[inline]
    #[must_use]
    pub fn with_view(mut self, view: ViewText) -> Self {
        self.view = view;
        self
    }

    /// Request timeout as a `Duration`
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::InvalidValue` when validation fails
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - see [`LookupConfig::from_toml_str`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check field values
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: format!("`{}` is not an http(s) URL", self.base_url),
            });
        }
        Ok(())
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            lookup_path: "/api/example".to_string(),
            health_path: "/api/health".to_string(),
            request_timeout_ms: 10_000,
            cancel_superseded: true,
            user_agent: concat!("entity-lookup/", env!("CARGO_PKG_VERSION")).to_string(),
            view: ViewText::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = LookupConfig::new();
        assert!(config.validate().is_ok());
        assert!(config.cancel_superseded);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = LookupConfig::from_toml_str(
            r#"
            base_url = "https://backend.example.com"
            request_timeout_ms = 2500

            [view]
            failure_prefix = "요청 실패"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://backend.example.com");
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        assert_eq!(config.lookup_path, "/api/example");
        assert_eq!(config.view.failure_prefix, "요청 실패");
        assert_eq!(config.view.heading, ViewText::default().heading);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = LookupConfig::from_toml_str("request_timeout_ms = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "request_timeout_ms",
                ..
            }
        ));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let err = LookupConfig::from_toml_str(r#"base_url = "ftp://nowhere""#).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = LookupConfig::from_toml_str("base_url = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cancel_superseded = false").unwrap();

        let config = LookupConfig::from_file(file.path()).unwrap();
        assert!(!config.cancel_superseded);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = LookupConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
