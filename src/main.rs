use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use tcp_probe_rs::config::{
    DEFAULT_BACKOFF_UNIT, DEFAULT_BANNER_TIMEOUT, DEFAULT_DIAL_TIMEOUT, DEFAULT_MAX_RETRIES,
    DEFAULT_WORKERS,
};
use tcp_probe_rs::progress::ProgressTracker;
use tcp_probe_rs::{logging, output, ports, targets, PortSpec, ScanConfig, Scanner};

/// tcp-probe-rs — concurrent TCP connect prober with retry/backoff and banner grabbing.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tcp-probe-rs",
    version,
    about = "Concurrent TCP connect prober with retry/backoff and banner grabbing.",
    long_about = None
)]
struct Cli {
    /// Comma-separated list of target hosts, IPs or CIDRs.
    #[arg(long, default_value = "scanme.nmap.org")]
    targets: String,

    /// First port of the scan range.
    #[arg(long = "start-port", default_value_t = 1)]
    start_port: u16,

    /// Last port of the scan range (inclusive).
    #[arg(long = "end-port", default_value_t = 1024)]
    end_port: u16,

    /// Comma-separated ports or ranges (e.g. 22,80,8000-8010). Overrides the range.
    #[arg(long)]
    ports: Option<String>,

    /// Path to ports list file (one port or range per line). Overrides the range.
    #[arg(long = "ports-file", conflicts_with = "ports")]
    ports_file: Option<PathBuf>,

    /// Number of concurrent workers.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Connect timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = DEFAULT_DIAL_TIMEOUT.as_millis() as u64)]
    timeout_ms: u64,

    /// Banner read timeout in milliseconds.
    #[arg(
        long = "banner-timeout-ms",
        default_value_t = DEFAULT_BANNER_TIMEOUT.as_millis() as u64
    )]
    banner_timeout_ms: u64,

    /// Connection attempts per port.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    retries: u32,

    /// Backoff unit in milliseconds; attempt i waits unit * 2^i.
    #[arg(long = "backoff-ms", default_value_t = DEFAULT_BACKOFF_UNIT.as_millis() as u64)]
    backoff_ms: u64,

    /// Skip reading banners after connect.
    #[arg(long = "no-banner", default_value_t = false)]
    no_banner: bool,

    /// Print open ports as a JSON array instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also write the full report (results and summary) as pretty JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Hide the progress bar.
    #[arg(long = "no-progress", default_value_t = false)]
    no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn port_spec(&self) -> Result<PortSpec> {
        let list = if let Some(list) = self.ports.as_deref() {
            Some(ports::parse_port_list(list)?)
        } else if let Some(path) = self.ports_file.as_deref() {
            Some(ports::load_ports_from_path(path)?)
        } else {
            None
        };
        Ok(PortSpec::resolve(list, self.start_port, self.end_port))
    }

    fn scan_config(&self) -> Result<ScanConfig> {
        Ok(ScanConfig {
            targets: targets::parse_targets(&self.targets)?,
            ports: self.port_spec()?,
            workers: self.workers,
            dial_timeout: Duration::from_millis(self.timeout_ms),
            max_retries: self.retries,
            banner_timeout: Duration::from_millis(self.banner_timeout_ms),
            backoff_unit: Duration::from_millis(self.backoff_ms),
            grab_banner: !self.no_banner,
            ..ScanConfig::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let config = cli.scan_config()?;
    let scanner = Scanner::new(config).context("invalid scan configuration")?;
    info!(
        targets = scanner.config().targets.len(),
        ports = scanner.config().ports.len(),
        workers = scanner.config().workers,
        "configuration accepted"
    );

    // Ctrl-C stops new attempts; in-flight ones finish and are reported.
    let cancel = scanner.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling scan");
            cancel.cancel();
        }
    });

    let bar = if cli.no_progress || cli.json {
        None
    } else {
        Some(progress_bar(scanner.progress())?)
    };

    let report = scanner.run().await;

    if let Some((pb, handle)) = bar {
        if let Err(e) = handle.await {
            error!(error = %e, "progress bar task failed");
        }
        pb.finish_and_clear();
    }

    let stdout = io::stdout().lock();
    if cli.json {
        output::write_json(stdout, &report)?;
    } else {
        output::write_plain(stdout, &report)?;
    }

    if let Some(path) = cli.output.as_deref() {
        output::write_report_json(path, &report)?;
        info!(path = %path.display(), "wrote JSON report");
    }

    Ok(())
}

/// Drive an indicatif bar from the tracker on a background task.
fn progress_bar(
    mut tracker: ProgressTracker,
) -> Result<(ProgressBar, tokio::task::JoinHandle<()>)> {
    let pb = ProgressBar::new(tracker.total());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("=>-"),
    );
    let bar = pb.clone();
    let handle = tokio::spawn(async move {
        while let Some(p) = tracker.next().await {
            bar.set_position(p.completed);
        }
    });
    Ok((pb, handle))
}
