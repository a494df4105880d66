use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::progress::ProgressSink;
use crate::prober::Probe;
use crate::retry::{self, RetryPolicy};
use crate::types::{ScanResult, ScanTask};

/// Shared, drain-once task source. Each task is handed to exactly one caller.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    inner: Arc<Mutex<VecDeque<ScanTask>>>,
}

impl TaskQueue {
    pub fn new(tasks: impl IntoIterator<Item = ScanTask>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tasks.into_iter().collect())),
        }
    }

    pub fn pop(&self) -> Option<ScanTask> {
        // The lock is never held across an await, so poisoning only follows a
        // panic inside pop_front; the queue is still consistent then.
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-size set of workers applying the retry policy to queued tasks.
#[derive(Debug)]
pub struct WorkerPool<P> {
    prober: Arc<P>,
    workers: usize,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl<P: Probe> WorkerPool<P> {
    pub fn new(
        prober: Arc<P>,
        workers: usize,
        policy: RetryPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            prober,
            workers: workers.max(1),
            policy,
            cancel,
        }
    }

    /// Run every queued task to completion, then return.
    ///
    /// `results` is dropped here once all workers have exited, which closes the
    /// channel for the collector.
    pub async fn run(
        &self,
        queue: TaskQueue,
        results: mpsc::Sender<ScanResult>,
        progress: ProgressSink,
    ) {
        let mut set = JoinSet::new();
        for id in 0..self.workers {
            set.spawn(worker(
                id,
                self.prober.clone(),
                queue.clone(),
                self.policy,
                self.cancel.clone(),
                results.clone(),
                progress.clone(),
            ));
        }
        drop(results);
        drop(progress);

        while let Some(res) = set.join_next().await {
            if let Err(e) = res {
                error!(error = %e, "worker task failed");
            }
        }
        debug!(workers = self.workers, remaining = queue.len(), "worker pool drained");
    }
}

async fn worker<P: Probe>(
    id: usize,
    prober: Arc<P>,
    queue: TaskQueue,
    policy: RetryPolicy,
    cancel: CancellationToken,
    results: mpsc::Sender<ScanResult>,
    progress: ProgressSink,
) {
    let mut handled = 0usize;
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let Some(task) = queue.pop() else {
            break;
        };
        progress.task_started();
        let result = retry::attempt(prober.as_ref(), &task, &policy, &cancel).await;
        handled += 1;
        if results.send(result).await.is_err() {
            warn!(worker = id, "result receiver dropped, stopping worker");
            break;
        }
    }
    debug!(worker = id, handled, "worker exiting");
}
