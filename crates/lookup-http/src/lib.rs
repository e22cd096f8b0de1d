//! Lookup HTTP - remote lookup collaborator
//!
//! Talks to the example backend over HTTP/JSON:
//! - [`HttpLookupService`]: `LookupService` implementation
//! - [`HealthProbe`]: backend health endpoint
//!
//! Every failure reaching the controller is a `LookupError::LookupFailed`;
//! [`HttpLookupError`] keeps the detail for callers that want it.

#![warn(missing_docs)]

pub mod error;
pub mod health;
pub mod service;

pub use error::HttpLookupError;
pub use health::{HealthProbe, HealthReport};
pub use service::HttpLookupService;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
