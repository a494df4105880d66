use tcp_probe_rs::config::PortSpec;
use tcp_probe_rs::ports::{load_ports_from_path, parse_port_list};

#[test]
fn ports_file_on_disk_is_loaded() {
    let path = std::env::temp_dir().join(format!("tcp-probe-ports-{}.txt", std::process::id()));
    std::fs::write(&path, "# ssh and web\n22\n80-82 # http\n81\n\n443\n").unwrap();
    let ports = load_ports_from_path(&path);
    std::fs::remove_file(&path).ok();

    assert_eq!(ports.expect("parse ok"), vec![22, 80, 81, 82, 443]);
}

#[test]
fn missing_ports_file_names_the_path() {
    let path = std::env::temp_dir().join("tcp-probe-no-such-ports-file.txt");
    let err = load_ports_from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("tcp-probe-no-such-ports-file.txt"));
}

#[test]
fn overlapping_ranges_in_a_list_collapse() {
    let ports = parse_port_list("8080,8079-8081,8081-8082").expect("parse ok");
    assert_eq!(ports, vec![8080, 8079, 8081, 8082]);
}

#[test]
fn explicit_list_overrides_range() {
    let list = parse_port_list("9000,22").expect("parse ok");
    let spec = PortSpec::resolve(Some(list), 1, 1024);
    assert_eq!(spec.ports(), vec![9000, 22]);
}

#[test]
fn empty_list_falls_back_to_range() {
    let list = parse_port_list(" , ").expect("parse ok");
    let spec = PortSpec::resolve(Some(list), 20, 22);
    assert_eq!(spec, PortSpec::Range { start: 20, end: 22 });
}

#[test]
fn one_bad_token_rejects_the_list() {
    let err = parse_port_list("22,80,eighty,443").unwrap_err();
    assert!(format!("{err:#}").contains("eighty"));
}
