use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parse a comma-separated port list such as `22,80,8000-8010`.
///
/// Entries are trimmed and deduplicated, keeping first appearance order.
/// Any invalid entry rejects the whole list.
pub fn parse_port_list(s: &str) -> Result<Vec<u16>> {
    let mut acc = PortAccumulator::default();
    for token in s.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        acc.push_token(token)
            .with_context(|| format!("invalid port entry: {token:?}"))?;
    }
    Ok(acc.out)
}

/// Parse a ports file content into a deduplicated list of TCP ports (1..=65535).
///
/// Supported formats per line:
/// - single port number: `80`
/// - inclusive range: `8000-8010`
/// - comments: everything after `#` is ignored
/// - whitespace and blank lines are ignored
pub fn parse_ports_str(s: &str) -> Result<Vec<u16>> {
    let mut acc = PortAccumulator::default();
    for (idx, raw_line) in s.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }
        acc.push_token(line)
            .with_context(|| format!("line {line_no}: invalid port entry: {line}"))?;
    }
    Ok(acc.out)
}

/// Load a ports list from a file path. Errors if the file cannot be read or parsed.
pub fn load_ports_from_path(path: impl AsRef<Path>) -> Result<Vec<u16>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read ports file: {}", path.as_ref().display()))?;
    parse_ports_str(&content)
}

#[derive(Default)]
struct PortAccumulator {
    out: Vec<u16>,
    seen: HashSet<u16>,
}

impl PortAccumulator {
    fn push_token(&mut self, token: &str) -> Result<()> {
        if let Some((a, b)) = token.split_once('-') {
            let start = parse_port_str(a.trim())
                .with_context(|| format!("invalid start in range: {a}"))?;
            let end =
                parse_port_str(b.trim()).with_context(|| format!("invalid end in range: {b}"))?;
            if start > end {
                bail!("invalid range {start}-{end} (start > end)");
            }
            for p in start..=end {
                self.push(p);
            }
            return Ok(());
        }
        let p = parse_port_str(token)?;
        self.push(p);
        Ok(())
    }

    fn push(&mut self, p: u16) {
        if self.seen.insert(p) {
            self.out.push(p);
        }
    }
}

fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s.parse::<u32>().map_err(|e| anyhow::anyhow!(e))?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}
