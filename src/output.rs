use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::{ScanReport, ScanTask};

/// Human-readable report: open `host:port - banner` lines followed by the summary.
///
/// The separator is printed even when the banner is empty.
pub fn write_plain<W: Write>(mut w: W, report: &ScanReport) -> Result<()> {
    writeln!(w, "====== Open Ports ======")?;
    for r in &report.results {
        let addr = ScanTask::new(r.host.as_str(), r.port).address();
        writeln!(w, "{addr} - {}", r.banner)?;
    }
    writeln!(w, "========================")?;

    let s = &report.summary;
    writeln!(w, "Targets scanned:  {}", s.targets_scanned)?;
    writeln!(w, "Ports per target: {}", s.ports_per_target)?;
    writeln!(w, "Open ports found: {}", s.open_count)?;
    writeln!(w, "Time taken:       {:.3?}", s.elapsed)?;
    if s.cancelled {
        writeln!(
            w,
            "Scan cancelled:   {}/{} tasks completed",
            s.tasks_completed, s.tasks_total
        )?;
    }
    Ok(())
}

/// Structured output: a JSON array of the open results.
pub fn write_json<W: Write>(mut w: W, report: &ScanReport) -> Result<()> {
    serde_json::to_writer(&mut w, &report.results)?;
    writeln!(w)?;
    Ok(())
}

/// Write the full report (results and summary) as pretty JSON.
pub fn write_report_json(path: &Path, report: &ScanReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report file: {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, report)?;
    w.flush()?;
    Ok(())
}
