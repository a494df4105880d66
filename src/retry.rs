use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::prober::Probe;
use crate::types::{ScanResult, ScanTask};

/// Bounded attempts with exponential backoff between failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_unit: Duration) -> Self {
        Self {
            max_retries,
            backoff_unit,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.max_retries, config.backoff_unit)
    }

    /// Attempts per task. Zero means the task is reported closed without dialing.
    pub fn attempts(&self) -> u32 {
        self.max_retries
    }

    /// Delay after failed attempt `attempt`: `unit * 2^attempt`, saturating.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

/// Probe `task` until it connects, attempts run out, or `cancel` fires.
///
/// Always yields exactly one result. Failures never escape as errors; they
/// end up as `open = false`.
pub async fn attempt<P: Probe>(
    prober: &P,
    task: &ScanTask,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> ScanResult {
    let attempts = policy.attempts();
    for n in 0..attempts {
        if cancel.is_cancelled() {
            debug!(target_addr = %task, attempt = n, "cancelled before attempt");
            break;
        }

        let outcome = prober.probe(task).await;
        if outcome.connected {
            trace!(target_addr = %task, attempt = n, "open");
            return ScanResult::open(task, outcome.banner);
        }

        if n + 1 == attempts {
            break;
        }
        let delay = policy.backoff(n);
        trace!(target_addr = %task, attempt = n, delay_ms = delay.as_millis() as u64, "backing off");
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(target_addr = %task, attempt = n, "cancelled during backoff");
                break;
            }
            _ = time::sleep(delay) => {}
        }
    }
    ScanResult::closed(task)
}
