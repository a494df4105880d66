use std::sync::Arc;

use ::time::{format_description::well_known, OffsetDateTime};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::collector::{self, Collected};
use crate::config::ScanConfig;
use crate::error::ConfigError;
use crate::pool::{TaskQueue, WorkerPool};
use crate::progress::{self, ProgressSink, ProgressTracker};
use crate::prober::{Probe, TcpProber};
use crate::retry::RetryPolicy;
use crate::tasks;
use crate::types::{ScanReport, ScanSummary};

/// Scan every target/port pair in `config` with TCP connects.
///
/// - Runs `config.workers` concurrent workers over a shared task queue.
/// - Each task gets up to `config.max_retries` attempts with exponential backoff.
/// - On a successful connect, optionally reads a short banner.
/// - Returns only the open results plus summary counters.
pub async fn scan_targets(config: ScanConfig) -> Result<ScanReport, ConfigError> {
    Ok(Scanner::new(config)?.run().await)
}

/// Variant that accepts a `CancellationToken` to allow external cancellation.
pub async fn scan_targets_with_cancel(
    config: ScanConfig,
    cancel: CancellationToken,
) -> Result<ScanReport, ConfigError> {
    Ok(Scanner::new(config)?.with_cancel(cancel).run().await)
}

/// One configured scan. Consumed by [`Scanner::run`].
pub struct Scanner<P = TcpProber> {
    config: ScanConfig,
    prober: Arc<P>,
    cancel: CancellationToken,
    progress: ProgressSink,
}

impl Scanner<TcpProber> {
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        let prober = TcpProber::from_config(&config);
        Self::with_prober(config, prober)
    }
}

impl<P: Probe> Scanner<P> {
    pub fn with_prober(config: ScanConfig, prober: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let (progress, _) = progress::channel(config.total_tasks());
        Ok(Self {
            config,
            prober: Arc::new(prober),
            cancel: CancellationToken::new(),
            progress,
        })
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the scan within one in-flight attempt.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Subscribe to dispatch progress. Call before [`Scanner::run`].
    pub fn progress(&self) -> ProgressTracker {
        self.progress.subscribe()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub async fn run(self) -> ScanReport {
        let Scanner {
            config,
            prober,
            cancel,
            progress,
        } = self;

        let started = Instant::now();
        let started_at = now_rfc3339();
        let tasks = tasks::enumerate(&config.targets, &config.ports);
        let total = tasks.len() as u64;
        info!(
            targets = config.targets.len(),
            ports = config.ports.len(),
            tasks = total,
            workers = config.workers,
            "scan started"
        );

        let (tx, rx) = mpsc::channel(tasks.len().max(1));
        let pool = WorkerPool::new(
            prober,
            config.workers,
            RetryPolicy::from_config(&config),
            cancel.clone(),
        );
        let ((), collected) = tokio::join!(
            pool.run(TaskQueue::new(tasks), tx, progress),
            collector::collect(rx, &config.targets),
        );

        let summary = summarize(&config, &collected, total, started, &started_at, &cancel);
        info!(
            open = summary.open_count,
            completed = summary.tasks_completed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            cancelled = summary.cancelled,
            "scan finished"
        );
        ScanReport {
            results: collected.open,
            summary,
        }
    }
}

fn summarize(
    config: &ScanConfig,
    collected: &Collected,
    total: u64,
    started: Instant,
    started_at: &str,
    cancel: &CancellationToken,
) -> ScanSummary {
    ScanSummary {
        targets_scanned: config.targets.len(),
        ports_per_target: config.ports.len(),
        tasks_total: total,
        tasks_completed: collected.received,
        open_count: collected.open.len() as u64,
        closed_count: collected.closed,
        elapsed: started.elapsed(),
        started_at: started_at.to_string(),
        cancelled: cancel.is_cancelled(),
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortSpec;

    #[tokio::test]
    async fn invalid_config_is_rejected_before_scanning() {
        let config = ScanConfig::new(vec![], PortSpec::List(vec![80]));
        assert!(matches!(
            scan_targets(config).await,
            Err(ConfigError::EmptyTargets)
        ));
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let ts = now_rfc3339();
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
    }
}
