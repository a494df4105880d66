use tcp_probe_rs::targets::{expand_cidr, parse_targets};

#[test]
fn comma_list_with_cidr() {
    let t = parse_targets("scanme.nmap.org, 10.0.0.0/30").expect("parse ok");
    assert_eq!(t, vec!["scanme.nmap.org", "10.0.0.1", "10.0.0.2"]);
}

#[test]
fn expand_excludes_network_and_broadcast() {
    let net = "192.168.42.0/29".parse().unwrap();
    let hosts = expand_cidr(net).expect("expand ok");
    assert_eq!(hosts.len(), 6);
    assert_eq!(hosts.first().map(String::as_str), Some("192.168.42.1"));
    assert_eq!(hosts.last().map(String::as_str), Some("192.168.42.6"));
}

#[test]
fn ipv6_small_network_expands() {
    let hosts = parse_targets("fd00::/126").expect("parse ok");
    assert_eq!(hosts, vec!["fd00::", "fd00::1", "fd00::2", "fd00::3"]);
}
