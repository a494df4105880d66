//! Library crate for tcp-probe-rs: a concurrent TCP connect prober with
//! retry/backoff, banner grabbing and advisory progress reporting.
pub mod collector;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod pool;
pub mod ports;
pub mod prober;
pub mod progress;
pub mod retry;
pub mod scanner;
pub mod targets;
pub mod tasks;
pub mod types;

pub use config::{PortSpec, ScanConfig};
pub use error::ConfigError;
pub use scanner::{scan_targets, scan_targets_with_cancel, Scanner};
pub use types::{ScanReport, ScanResult, ScanSummary, ScanTask};
