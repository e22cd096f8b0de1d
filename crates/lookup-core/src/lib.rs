//! Lookup Core - entity-by-identifier fetch controller
//!
//! Owns the fetch-status state machine behind the example lookup page:
//! - Input buffer and submit trigger
//! - `Idle` / `Fetching` / `Success` / `Error` transitions
//! - Staleness guard for overlapping submissions
//! - Rendering of the state for a front end
//!
//! # Example
//!
//! ```rust,no_run
//! use lookup_core::{InMemoryLookupService, LookupConfig, LookupController, StatusKind};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LookupConfig::new();
//! let handle = LookupController::spawn(Arc::new(InMemoryLookupService::demo()), &config);
//!
//! handle.submit_identifier("00000000-0000-0000-0000-000000000001");
//! let snapshot = handle.wait_until_settled(1).await?;
//! assert_eq!(snapshot.status(), StatusKind::Success);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod controller;
pub mod error;
pub mod service;
pub mod state;
pub mod state_machine;
pub mod types;
pub mod view;

// Re-exports for convenience
pub use config::LookupConfig;
pub use controller::{ControllerSnapshot, LookupController, LookupHandle};
pub use error::{ConfigError, ControllerError, LookupError, StateMachineError};
pub use service::{InMemoryLookupService, LookupService, DEMO_RECORD_ID};
pub use state::{LookupState, StatusKind};
pub use state_machine::{LookupMachine, Resolution, SubmitOutcome};
pub use types::{ExampleRecord, LookupPayload, LookupRequest, SubmissionId};
pub use view::{StatusView, ViewText};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a lookup controller
    pub use crate::{
        ControllerSnapshot, LookupConfig, LookupController, LookupError, LookupHandle,
        LookupService, LookupState, StatusKind, StatusView,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
