use anyhow::Context;
use lookup_cli::{build_cli, init_tracing, resolve_config, run_fetch, run_health, run_interactive};
use lookup_core::{InMemoryLookupService, LookupController, LookupService, StatusKind};
use lookup_http::{HealthProbe, HttpLookupService};
use std::sync::Arc;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let Some((name, args)) = matches.subcommand() else {
        return Ok(());
    };
    let config = resolve_config(&matches, args)?;
    let mut stdout = std::io::stdout();

    match name {
        "fetch" => {
            let id = args
                .get_one::<String>("id")
                .context("missing identifier")?;
            let service = HttpLookupService::new(&config)?;
            let handle = LookupController::spawn(Arc::new(service), &config);

            let status = run_fetch(&handle, id, &mut stdout, &config.view).await?;
            handle.shutdown();

            std::process::exit(match status {
                StatusKind::Success => 0,
                StatusKind::Error => 1,
                StatusKind::Idle | StatusKind::Fetching => 2,
            });
        }
        "interactive" => {
            let service: Arc<dyn LookupService> = if args.get_flag("demo") {
                tracing::info!("Using in-memory demo backend");
                Arc::new(InMemoryLookupService::demo())
            } else {
                Arc::new(HttpLookupService::new(&config)?)
            };
            let handle = LookupController::spawn(service, &config);

            let stdin = BufReader::new(tokio::io::stdin());
            let last = run_interactive(&handle, stdin, &mut stdout, &config.view).await?;
            handle.shutdown();
            tracing::info!("Input closed after {} requests", last.requests_issued);
        }
        "health" => {
            let probe = HealthProbe::new(&config)?;
            let healthy = run_health(&probe, &mut stdout).await?;
            std::process::exit(if healthy { 0 } else { 1 });
        }
        other => anyhow::bail!("unknown command: {other}"),
    }

    Ok(())
}
