use anyhow::Result;
use std::{env, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use tripfetch::{
    config::OUTPUT_VAR,
    output::write_parquet,
    Fetcher, IngestRun, RunConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tripfetch=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration from the host environment ─────────────────
    let config = RunConfig::from_env()?;
    info!(
        window = ?config.window,
        taxi_types = ?config.taxi_types,
        base_url = %config.base_url,
        "configured"
    );
    let output = env::var_os(OUTPUT_VAR).map(PathBuf::from);

    // ─── 3) fetch + concatenate ──────────────────────────────────────
    let fetcher = Fetcher::from_config(config)?;
    let IngestRun { table, report } = fetcher.run().await;
    for (source, error) in report.failures() {
        warn!(%source, "not ingested: {:#}", error);
    }
    info!(
        attempted = report.attempted(),
        succeeded = report.succeeded(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "run finished"
    );

    // ─── 4) optional plain write ─────────────────────────────────────
    match output {
        Some(path) if table.num_columns() > 0 => write_parquet(&table, &path)?,
        Some(path) => info!(path = %path.display(), "empty result; nothing written"),
        None => {}
    }

    info!("all done");
    Ok(())
}
