//! Orchestrator: one task per input line, joined before returning.
//!
//! Fan-out is unbounded unless `max_in_flight` is set, in which case task
//! creation waits on a counting semaphore. The rate limiter is the only
//! other point where tasks wait on each other.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::client::{ClientOptions, HttpClient};
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::limiter::RateLimiter;
use crate::report::{Outcome, Reporter};
use crate::worker::{self, WorkerContext};

/// Per-run counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.saved + self.skipped + self.failed
    }

    fn record(&mut self, joined: Result<Result<Outcome, FetchError>, JoinError>) {
        match joined {
            Ok(Ok(Outcome::Saved { .. })) => self.saved += 1,
            Ok(Ok(Outcome::Skipped { .. })) => self.skipped += 1,
            Ok(Err(_)) => self.failed += 1,
            Err(e) => {
                tracing::error!("fetch task panicked: {}", e);
                self.failed += 1;
            }
        }
    }
}

/// Reads URLs from `input` until EOF and fetches each one.
pub async fn run<R>(input: R, config: Arc<FetchConfig>, reporter: Arc<dyn Reporter>) -> Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
{
    run_with_cancel(input, config, reporter, CancellationToken::new()).await
}

/// Like [`run`] with a caller-owned cancellation token. Cancelling makes
/// workers still waiting for a permit fail with a limiter error.
///
/// Per-URL failures are reported and counted, never returned. The only error
/// is an unreadable input stream, returned after in-flight tasks finish.
pub async fn run_with_cancel<R>(
    input: R,
    config: Arc<FetchConfig>,
    reporter: Arc<dyn Reporter>,
    cancel: CancellationToken,
) -> Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
{
    let client = Arc::new(HttpClient::new(ClientOptions::from_config(&config)));
    let limiter = Arc::new(RateLimiter::new(config.delay));
    let ctx = Arc::new(WorkerContext {
        config: Arc::clone(&config),
        client,
        limiter,
        cancel,
    });
    let gate = config.max_in_flight.map(|n| Arc::new(Semaphore::new(n.max(1))));

    tracing::debug!(
        delay_ms = config.delay.as_millis() as u64,
        max_in_flight = ?config.max_in_flight,
        output = %config.output_dir.display(),
        "fetch run starting"
    );

    let mut tasks = JoinSet::new();
    let mut summary = RunSummary::default();
    let mut lines = input.split(b'\n');

    let read_result = async {
        while let Some(raw) = lines.next_segment().await.context("failed to read input")? {
            let line = decode_line(raw);
            let permit = match &gate {
                Some(sem) => Some(
                    Arc::clone(sem)
                        .acquire_owned()
                        .await
                        .context("in-flight gate closed")?,
                ),
                None => None,
            };
            let ctx = Arc::clone(&ctx);
            let reporter = Arc::clone(&reporter);
            tasks.spawn(async move {
                let _permit = permit;
                let result = worker::fetch_url(&ctx, line).await;
                match &result {
                    Ok(outcome) => reporter.outcome(outcome),
                    Err(e) => reporter.failure(e),
                }
                result
            });
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    while let Some(joined) = tasks.join_next().await {
        summary.record(joined);
    }

    read_result?;
    tracing::info!(
        saved = summary.saved,
        skipped = summary.skipped,
        failed = summary.failed,
        "fetch run finished"
    );
    Ok(summary)
}

/// Strips a trailing `\r` and decodes. Bytes that are not UTF-8 are replaced
/// rather than ending the read, so a bad line fails on its own.
fn decode_line(mut raw: Vec<u8>) -> String {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    match String::from_utf8(raw) {
        Ok(line) => line,
        Err(e) => {
            let line = String::from_utf8_lossy(e.as_bytes()).into_owned();
            tracing::warn!(line = %line, "input line is not valid UTF-8");
            line
        }
    }
}
