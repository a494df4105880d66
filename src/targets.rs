use anyhow::{bail, Context, Result};
use ipnet::IpNet;
use std::collections::HashSet;

/// Networks with more host bits than this are refused.
const MAX_HOST_BITS: u8 = 16;

/// Parse a comma-separated target list into host strings.
///
/// - entries are trimmed and empty entries skipped
/// - `a.b.c.d/nn` entries are expanded to their host addresses
/// - `[v6]` literals lose their brackets
/// - duplicates are dropped, first appearance wins
pub fn parse_targets(s: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for raw in s.split(',') {
        let entry = raw.trim();
        if entry.is_empty() {
            continue;
        }
        if entry.contains('/') {
            let net: IpNet = entry
                .parse()
                .with_context(|| format!("invalid CIDR target: {entry}"))?;
            for host in expand_cidr(net)? {
                if seen.insert(host.clone()) {
                    out.push(host);
                }
            }
            continue;
        }
        let host = entry
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(entry)
            .to_string();
        if seen.insert(host.clone()) {
            out.push(host);
        }
    }
    if out.is_empty() {
        bail!("no targets given");
    }
    Ok(out)
}

/// Expand a CIDR into individual addresses suitable for host scanning.
///
/// IPv4 networks wider than /31 exclude the network and broadcast addresses.
pub fn expand_cidr(net: IpNet) -> Result<Vec<String>> {
    let host_bits = net.max_prefix_len() - net.prefix_len();
    if host_bits > MAX_HOST_BITS {
        bail!("network {net} is too large to scan (more than 2^{MAX_HOST_BITS} addresses)");
    }
    Ok(net.hosts().map(|ip| ip.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_hosts_are_trimmed() {
        let t = parse_targets(" scanme.nmap.org , 10.0.0.1,,").unwrap();
        assert_eq!(t, vec!["scanme.nmap.org", "10.0.0.1"]);
    }

    #[test]
    fn small_cidr_excludes_network_and_broadcast() {
        let t = parse_targets("192.168.1.0/30").unwrap();
        assert_eq!(t, vec!["192.168.1.1", "192.168.1.2"]);
    }

    #[test]
    fn host_cidr_keeps_single_address() {
        assert_eq!(parse_targets("10.0.0.7/32").unwrap(), vec!["10.0.0.7"]);
    }

    #[test]
    fn bracketed_ipv6_is_unwrapped() {
        assert_eq!(parse_targets("[::1]").unwrap(), vec!["::1"]);
    }

    #[test]
    fn duplicates_dropped() {
        let t = parse_targets("10.0.0.1,10.0.0.0/30").unwrap();
        assert_eq!(t, vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn empty_and_oversized_inputs_rejected() {
        assert!(parse_targets(" , ").is_err());
        assert!(parse_targets("10.0.0.0/8").is_err());
        assert!(parse_targets("10.0.0.0/33").is_err());
    }
}
