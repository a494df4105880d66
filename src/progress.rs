//! Advisory progress reporting.
//!
//! Workers bump a counter on a `watch` channel; the tracker observes the latest
//! value. Updates coalesce, so a slow or absent consumer never holds up a worker.

use std::sync::Arc;

use futures::stream::{self, Stream};
use tokio::sync::watch;

/// Snapshot of how many tasks have been dispatched so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Write side, cloned into every worker. The channel closes when the last clone drops.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: Arc<watch::Sender<u64>>,
    total: u64,
}

impl ProgressSink {
    /// Record that one task has been picked up. Never blocks.
    pub fn task_started(&self) {
        self.tx.send_modify(|n| *n += 1);
    }

    pub fn dispatched(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn subscribe(&self) -> ProgressTracker {
        ProgressTracker::new(self.tx.subscribe(), self.total)
    }
}

/// Read side: a finite sequence of [`Progress`] values ending in one terminal value.
#[derive(Debug)]
pub struct ProgressTracker {
    rx: watch::Receiver<u64>,
    total: u64,
    last: Option<u64>,
    done: bool,
}

pub fn channel(total: u64) -> (ProgressSink, ProgressTracker) {
    let (tx, rx) = watch::channel(0);
    let sink = ProgressSink {
        tx: Arc::new(tx),
        total,
    };
    (sink, ProgressTracker::new(rx, total))
}

impl ProgressTracker {
    fn new(rx: watch::Receiver<u64>, total: u64) -> Self {
        Self {
            rx,
            total,
            last: None,
            done: total == 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Wait for the next change. Returns `None` after the terminal value.
    ///
    /// The terminal value is `completed == total` on a full run, or the last
    /// dispatched count once every sink is gone (cancelled scan).
    pub async fn next(&mut self) -> Option<Progress> {
        if self.done {
            return None;
        }
        let completed = match self.rx.changed().await {
            Ok(()) => *self.rx.borrow_and_update(),
            Err(_) => {
                self.done = true;
                let completed = *self.rx.borrow();
                if self.last == Some(completed) {
                    return None;
                }
                completed
            }
        };
        self.last = Some(completed);
        let progress = Progress {
            completed,
            total: self.total,
        };
        if progress.is_done() {
            self.done = true;
        }
        Some(progress)
    }

    pub fn into_stream(self) -> impl Stream<Item = Progress> {
        stream::unfold(self, |mut tracker| async move {
            tracker.next().await.map(|p| (p, tracker))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn terminal_value_equals_total() {
        let (sink, tracker) = channel(3);
        let handle = tokio::spawn(tracker.into_stream().collect::<Vec<_>>());

        let workers: Vec<_> = (0..3)
            .map(|_| {
                let sink = sink.clone();
                tokio::spawn(async move { sink.task_started() })
            })
            .collect();
        for w in workers {
            w.await.unwrap();
        }
        drop(sink);

        let seen = handle.await.unwrap();
        assert_eq!(
            seen.last(),
            Some(&Progress {
                completed: 3,
                total: 3
            })
        );
        assert!(seen.windows(2).all(|w| w[0].completed < w[1].completed));
    }

    #[tokio::test]
    async fn sink_without_consumer_does_not_block() {
        let (sink, tracker) = channel(10_000);
        drop(tracker);
        for _ in 0..10_000 {
            sink.task_started();
        }
        assert_eq!(sink.dispatched(), 10_000);
    }

    #[tokio::test]
    async fn closed_channel_yields_partial_terminal() {
        let (sink, mut tracker) = channel(5);
        sink.task_started();
        sink.task_started();
        drop(sink);

        assert_eq!(
            tracker.next().await,
            Some(Progress {
                completed: 2,
                total: 5
            })
        );
        assert_eq!(tracker.next().await, None);
    }

    #[tokio::test]
    async fn late_subscriber_ends_with_total() {
        let (sink, _tracker) = channel(2);
        let mut late = sink.subscribe();
        sink.task_started();
        sink.task_started();
        drop(sink);

        let mut last = None;
        while let Some(p) = late.next().await {
            last = Some(p);
        }
        assert_eq!(last.map(|p| p.completed), Some(2));
    }
}
