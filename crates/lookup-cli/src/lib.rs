//! Lookup CLI
//!
//! Terminal front end for the lookup controller: the input collaborator
//! (stdin lines or a single argument) and the presentation collaborator
//! (rendered status sections on stdout).

#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{build_cli, resolve_config};
pub use commands::{run_fetch, run_health, run_interactive};
pub use logging::init_tracing;
