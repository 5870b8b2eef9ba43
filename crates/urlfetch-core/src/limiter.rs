//! Global rate gate shared by all workers.
//!
//! A token bucket of size one: at most one permit per `interval` across every
//! caller combined. The first permit is immediate. Waiters queue on a fair
//! async mutex, so permits are granted in arrival order.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LimiterError {
    /// The caller's context was cancelled before a permit was granted.
    #[error("context cancelled while waiting for a permit")]
    Cancelled,
}

#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    /// Earliest instant the next permit may be granted.
    next_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// `interval` of zero disables throttling.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_grant: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for a permit. Fails without consuming one if `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), LimiterError> {
        if cancel.is_cancelled() {
            return Err(LimiterError::Cancelled);
        }
        if self.interval.is_zero() {
            return Ok(());
        }

        let wait = async {
            let mut next_grant = self.next_grant.lock().await;
            if let Some(at) = *next_grant {
                tokio::time::sleep_until(at).await;
            }
            *next_grant = Some(Instant::now() + self.interval);
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LimiterError::Cancelled),
            _ = wait => Ok(()),
        }
    }
}
