//! Fetch Worker: the per-URL unit of work.
//!
//! `RateGate → Validate → Build → Send → ReadBody → Decide → {Persist | Skip}`.
//! Any failure ends this URL only. Transfers and file writes run on the
//! blocking pool so they never stall the runtime.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client::HttpClient;
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::limiter::RateLimiter;
use crate::policy::SavePolicy;
use crate::report::Outcome;
use crate::request::RequestSpec;
use crate::storage::{self, ArtifactPair};
use crate::url_model;

/// Everything a worker shares with its siblings. Only the limiter has
/// interior mutability.
pub struct WorkerContext {
    pub config: Arc<FetchConfig>,
    pub client: Arc<HttpClient>,
    pub limiter: Arc<RateLimiter>,
    pub cancel: CancellationToken,
}

impl WorkerContext {
    pub fn new(config: Arc<FetchConfig>, client: Arc<HttpClient>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            config,
            client,
            limiter,
            cancel: CancellationToken::new(),
        }
    }
}

/// Runs one input line to completion.
pub async fn fetch_url(ctx: &WorkerContext, raw_url: String) -> Result<Outcome, FetchError> {
    ctx.limiter.acquire(&ctx.cancel).await?;
    tracing::debug!(url = %raw_url, "permit granted");

    let url = url_model::parse_request_url(&raw_url)
        .ok_or_else(|| FetchError::InvalidUrl(raw_url.clone()))?;

    let spec = RequestSpec::new(&ctx.config, &raw_url);

    let response = {
        let client = Arc::clone(&ctx.client);
        let spec = spec.clone();
        tokio::task::spawn_blocking(move || client.execute(&spec)).await??
    };
    let status = response.status;

    let save = SavePolicy::from_config(&ctx.config).should_save(status, &response.body);
    tracing::debug!(
        url = %raw_url,
        method = %spec.method,
        status,
        bytes = response.body.len(),
        save,
        "response received"
    );

    if !save {
        return Ok(Outcome::Skipped {
            url: raw_url,
            status,
        });
    }

    let pair = ArtifactPair::for_request(&ctx.config.output_dir, &url, &spec);
    let path = pair.body.clone();
    tokio::task::spawn_blocking(move || storage::persist(&pair, &spec, &response)).await??;

    Ok(Outcome::Saved {
        path,
        url: raw_url,
        status,
    })
}
