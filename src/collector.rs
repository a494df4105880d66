use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::types::ScanResult;

/// Fan-in of every result produced by a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    /// Open results, ordered by target input order then port.
    pub open: Vec<ScanResult>,
    pub received: u64,
    pub closed: u64,
}

/// Drain the results channel until every producer is gone.
pub async fn collect(mut rx: mpsc::Receiver<ScanResult>, targets: &[String]) -> Collected {
    let mut all = Vec::new();
    while let Some(result) = rx.recv().await {
        all.push(result);
    }
    partition(all, targets)
}

/// Count everything, keep only the open results.
pub fn partition(results: impl IntoIterator<Item = ScanResult>, targets: &[String]) -> Collected {
    let mut collected = Collected::default();
    for result in results {
        collected.received += 1;
        if result.open {
            collected.open.push(result);
        } else {
            collected.closed += 1;
        }
    }

    let rank: HashMap<&str, usize> = targets
        .iter()
        .enumerate()
        .map(|(i, t)| (t.trim(), i))
        .collect();
    collected.open.sort_by(|a, b| {
        let ra = rank.get(a.host.as_str()).copied().unwrap_or(usize::MAX);
        let rb = rank.get(b.host.as_str()).copied().unwrap_or(usize::MAX);
        ra.cmp(&rb)
            .then_with(|| a.host.cmp(&b.host))
            .then(a.port.cmp(&b.port))
    });
    collected
}
