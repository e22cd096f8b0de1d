//! Command-line definition and config resolution

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lookup_core::LookupConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Build the `lookup` command
pub fn build_cli() -> Command {
    let base_url = Arg::new("base-url")
        .long("base-url")
        .value_name("URL")
        .help("Backend base URL (overrides the config file)");

    let timeout = Arg::new("timeout-ms")
        .long("timeout-ms")
        .value_name("MS")
        .value_parser(value_parser!(u64))
        .help("Per-request timeout in milliseconds");

    Command::new("lookup")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Look up example records by identifier")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("fetch")
                .about("Submit one identifier and print every state change")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_name("ID")
                        .help("Identifier to look up (expected to be a UUID)"),
                )
                .arg(base_url.clone())
                .arg(timeout.clone()),
        )
        .subcommand(
            Command::new("interactive")
                .about("Read identifiers from stdin, one submission per line")
                .arg(base_url.clone().conflicts_with("demo"))
                .arg(timeout)
                .arg(
                    Arg::new("demo")
                        .long("demo")
                        .action(ArgAction::SetTrue)
                        .help("Use the built-in in-memory backend"),
                ),
        )
        .subcommand(
            Command::new("health")
                .about("Probe the backend health endpoint")
                .arg(base_url),
        )
}

/// Resolve the effective config: defaults, then file, then flags
///
/// # Errors
/// Fails when the config file cannot be loaded or the result is invalid.
pub fn resolve_config(global: &ArgMatches, sub: &ArgMatches) -> anyhow::Result<LookupConfig> {
    let mut config = match global.get_one::<PathBuf>("config") {
        Some(path) => LookupConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LookupConfig::default(),
    };

    if let Ok(Some(url)) = sub.try_get_one::<String>("base-url") {
        config = config.with_base_url(url.clone());
    }
    if let Ok(Some(ms)) = sub.try_get_one::<u64>("timeout-ms") {
        config = config.with_request_timeout(Duration::from_millis(*ms));
    }

    config.validate()?;
    Ok(config)
}
