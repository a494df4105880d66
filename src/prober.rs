use std::future::Future;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::types::{ProbeOutcome, ScanTask};

/// A single connection attempt against one task.
///
/// Implementations must be cheap to share across workers; the pool holds one
/// instance behind an `Arc`.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, task: &ScanTask) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Post-connect banner read settings.
#[derive(Debug, Clone, Copy)]
pub struct BannerOptions {
    pub timeout: Duration,
    pub max_bytes: usize,
}

/// TCP connect prober with an optional passive banner read.
#[derive(Debug, Clone)]
pub struct TcpProber {
    dial_timeout: Duration,
    banner: Option<BannerOptions>,
}

impl TcpProber {
    pub fn new(dial_timeout: Duration, banner: Option<BannerOptions>) -> Self {
        Self {
            dial_timeout,
            banner,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        let banner = config.grab_banner.then_some(BannerOptions {
            timeout: config.banner_timeout,
            max_bytes: config.banner_max_bytes,
        });
        Self::new(config.dial_timeout, banner)
    }
}

impl Probe for TcpProber {
    fn probe(&self, task: &ScanTask) -> impl Future<Output = ProbeOutcome> + Send {
        probe(task, self.dial_timeout, self.banner)
    }
}

/// Dial `task` once within `dial_timeout`, then optionally read a banner.
///
/// Name resolution counts against the dial timeout. The stream is dropped
/// before returning on every path.
pub async fn probe(
    task: &ScanTask,
    dial_timeout: Duration,
    banner: Option<BannerOptions>,
) -> ProbeOutcome {
    let connect = TcpStream::connect((task.host.as_str(), task.port));
    let mut stream = match time::timeout(dial_timeout, connect).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            debug!(target_addr = %task, error = %e, "connect failed");
            return ProbeOutcome::closed();
        }
        Err(_) => {
            debug!(target_addr = %task, timeout_ms = dial_timeout.as_millis() as u64, "connect timed out");
            return ProbeOutcome::closed();
        }
    };

    let banner = match banner {
        Some(opts) => read_banner(&mut stream, opts).await,
        None => String::new(),
    };
    ProbeOutcome::open(banner)
}

/// Read up to `max_bytes` within the timeout. Anything short of data is an empty banner.
async fn read_banner(stream: &mut TcpStream, opts: BannerOptions) -> String {
    let mut buf = vec![0u8; opts.max_bytes.max(1)];
    match time::timeout(opts.timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            buf.truncate(n);
            let banner = String::from_utf8_lossy(&buf).trim().to_string();
            trace!(bytes = n, banner = %banner, "banner read");
            banner
        }
        Ok(Ok(_)) => String::new(),
        Ok(Err(e)) => {
            debug!(error = %e, "banner read failed");
            String::new()
        }
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    const BANNER: BannerOptions = BannerOptions {
        timeout: Duration::from_millis(300),
        max_bytes: 1024,
    };

    async fn listener() -> (TcpListener, u16) {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = l.local_addr().unwrap().port();
        (l, port)
    }

    #[tokio::test]
    async fn reads_and_trims_banner() {
        let (l, port) = listener().await;
        tokio::spawn(async move {
            let (mut s, _) = l.accept().await.unwrap();
            s.write_all(b"  SSH-2.0-OpenSSH_9.6\r\n").await.unwrap();
        });

        let task = ScanTask::new("127.0.0.1", port);
        let out = probe(&task, Duration::from_secs(1), Some(BANNER)).await;
        assert_eq!(out, ProbeOutcome::open("SSH-2.0-OpenSSH_9.6"));
    }

    #[tokio::test]
    async fn silent_service_is_open_with_empty_banner() {
        let (l, port) = listener().await;
        let hold = tokio::spawn(async move {
            let (s, _) = l.accept().await.unwrap();
            time::sleep(Duration::from_secs(1)).await;
            drop(s);
        });

        let task = ScanTask::new("127.0.0.1", port);
        let out = probe(&task, Duration::from_secs(1), Some(BANNER)).await;
        assert!(out.connected);
        assert!(out.banner.is_empty());
        hold.abort();
    }

    #[tokio::test]
    async fn banner_skipped_when_disabled() {
        let (l, port) = listener().await;
        tokio::spawn(async move {
            let (mut s, _) = l.accept().await.unwrap();
            let _ = s.write_all(b"hello").await;
        });

        let out = TcpProber::new(Duration::from_secs(1), None)
            .probe(&ScanTask::new("127.0.0.1", port))
            .await;
        assert_eq!(out, ProbeOutcome::open(""));
    }

    #[tokio::test]
    async fn refused_port_is_closed() {
        let (l, port) = listener().await;
        drop(l);

        let out = probe(
            &ScanTask::new("127.0.0.1", port),
            Duration::from_millis(500),
            Some(BANNER),
        )
        .await;
        assert_eq!(out, ProbeOutcome::closed());
    }

    #[test]
    fn from_config_honours_banner_flag() {
        let mut config = ScanConfig::default();
        config.grab_banner = false;
        assert!(TcpProber::from_config(&config).banner.is_none());
        config.grab_banner = true;
        let p = TcpProber::from_config(&config);
        assert_eq!(p.banner.map(|b| b.max_bytes), Some(1024));
    }
}
