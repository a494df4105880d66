use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One (host, port) pair to probe. Consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTask {
    pub host: String,
    pub port: u16,
}

impl ScanTask {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port`, with IPv6 literals wrapped in brackets.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for ScanTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

/// Outcome of a single connection attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub connected: bool,
    pub banner: String,
}

impl ProbeOutcome {
    pub fn open(banner: impl Into<String>) -> Self {
        Self {
            connected: true,
            banner: banner.into(),
        }
    }

    pub fn closed() -> Self {
        Self::default()
    }
}

/// Final verdict for one task after the retry loop.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    #[serde(rename = "target")]
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub banner: String,
    pub open: bool,
}

impl ScanResult {
    pub fn open(task: &ScanTask, banner: impl Into<String>) -> Self {
        Self {
            host: task.host.clone(),
            port: task.port,
            banner: banner.into(),
            open: true,
        }
    }

    /// Closed results never carry a banner.
    pub fn closed(task: &ScanTask) -> Self {
        Self {
            host: task.host.clone(),
            port: task.port,
            banner: String::new(),
            open: false,
        }
    }
}

/// Aggregate counters derived once a scan has finished.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub targets_scanned: usize,
    pub ports_per_target: usize,
    pub tasks_total: u64,
    pub tasks_completed: u64,
    pub open_count: u64,
    pub closed_count: u64,
    #[serde(with = "duration_ms", rename = "elapsed_ms")]
    pub elapsed: Duration,
    pub started_at: String,
    pub cancelled: bool,
}

/// Open results plus the summary handed to the formatter.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScanReport {
    pub results: Vec<ScanResult>,
    pub summary: ScanSummary,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_brackets_ipv6() {
        assert_eq!(ScanTask::new("10.0.0.1", 22).address(), "10.0.0.1:22");
        assert_eq!(ScanTask::new("::1", 443).address(), "[::1]:443");
        assert_eq!(ScanTask::new("example.com", 80).to_string(), "example.com:80");
    }

    #[test]
    fn empty_banner_is_omitted_from_json() {
        let task = ScanTask::new("127.0.0.1", 80);
        let json = serde_json::to_value(ScanResult::open(&task, "")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"target": "127.0.0.1", "port": 80, "open": true})
        );

        let json = serde_json::to_value(ScanResult::open(&task, "SSH-2.0")).unwrap();
        assert_eq!(json["banner"], "SSH-2.0");
    }

    #[test]
    fn closed_result_has_no_banner() {
        let r = ScanResult::closed(&ScanTask::new("h", 1));
        assert!(!r.open);
        assert!(r.banner.is_empty());
    }
}
