use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_WORKERS: usize = 100;
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);
pub const DEFAULT_BANNER_BYTES: usize = 1024;

/// Which ports to probe on every target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    /// Explicit ports, probed in the given order.
    List(Vec<u16>),
    /// Inclusive range.
    Range { start: u16, end: u16 },
}

impl PortSpec {
    /// A non-empty explicit list wins over the range.
    pub fn resolve(list: Option<Vec<u16>>, start: u16, end: u16) -> Self {
        match list {
            Some(ports) if !ports.is_empty() => PortSpec::List(ports),
            _ => PortSpec::Range { start, end },
        }
    }

    pub fn ports(&self) -> Vec<u16> {
        match self {
            PortSpec::List(ports) => ports.clone(),
            PortSpec::Range { start, end } => (*start..=*end).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PortSpec::List(ports) => ports.len(),
            PortSpec::Range { start, end } if start <= end => (*end - *start) as usize + 1,
            PortSpec::Range { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            PortSpec::List(ports) if ports.is_empty() => Err(ConfigError::EmptyPorts),
            PortSpec::List(ports) if ports.contains(&0) => Err(ConfigError::ZeroPort),
            PortSpec::List(_) => Ok(()),
            PortSpec::Range { start, end } if *start == 0 || start > end => {
                Err(ConfigError::InvalidPortRange {
                    start: *start,
                    end: *end,
                })
            }
            PortSpec::Range { .. } => Ok(()),
        }
    }
}

impl Default for PortSpec {
    fn default() -> Self {
        PortSpec::Range { start: 1, end: 1024 }
    }
}

/// Everything the engine needs for one scan. Read-only once the scan starts.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub targets: Vec<String>,
    pub ports: PortSpec,
    pub workers: usize,
    pub dial_timeout: Duration,
    /// Total connection attempts per task.
    pub max_retries: u32,
    pub banner_timeout: Duration,
    /// Backoff after failed attempt `i` is `backoff_unit * 2^i`.
    pub backoff_unit: Duration,
    pub grab_banner: bool,
    pub banner_max_bytes: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            targets: vec!["scanme.nmap.org".to_string()],
            ports: PortSpec::default(),
            workers: DEFAULT_WORKERS,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            banner_timeout: DEFAULT_BANNER_TIMEOUT,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            grab_banner: true,
            banner_max_bytes: DEFAULT_BANNER_BYTES,
        }
    }
}

impl ScanConfig {
    pub fn new(targets: Vec<String>, ports: PortSpec) -> Self {
        Self {
            targets,
            ports,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::EmptyTargets);
        }
        if self.targets.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::BlankTarget);
        }
        self.ports.validate()?;
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.dial_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Size of the targets x ports product.
    pub fn total_tasks(&self) -> u64 {
        self.targets.len() as u64 * self.ports.len() as u64
    }
}
