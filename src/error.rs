use thiserror::Error;

/// Rejections raised before a scan starts. The engine itself assumes a valid config.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no targets given")]
    EmptyTargets,

    #[error("target list contains an empty host")]
    BlankTarget,

    #[error("port list is empty")]
    EmptyPorts,

    #[error("invalid port range {start}-{end}: need 1 <= start <= end <= 65535")]
    InvalidPortRange { start: u16, end: u16 },

    #[error("port 0 is not scannable")]
    ZeroPort,

    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("dial timeout must be greater than zero")]
    ZeroTimeout,
}
