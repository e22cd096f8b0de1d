//! Tracing setup for the binary

use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Logs go to stderr
/// so stdout only carries rendered state.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialised: {e}");
    }
}
