//! The fetch loop: stdin in, one line per URL out.

use anyhow::Result;
use std::sync::Arc;
use urlfetch_core::config::FetchConfig;
use urlfetch_core::orchestrator;
use urlfetch_core::report::StdReporter;

/// Drains stdin through the orchestrator. Per-URL failures are already on
/// stderr; only an unreadable stdin makes this fail.
pub async fn run_fetch(cfg: FetchConfig) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let summary = orchestrator::run(stdin, Arc::new(cfg), Arc::new(StdReporter)).await?;
    tracing::info!(
        "processed {} url(s): {} saved, {} skipped, {} failed",
        summary.total(),
        summary.saved,
        summary.skipped,
        summary.failed
    );
    Ok(())
}
