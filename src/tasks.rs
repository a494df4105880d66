use crate::config::PortSpec;
use crate::types::ScanTask;

/// Expand targets x ports into a flat task list.
///
/// Targets form the outer loop and ports the inner one, both in input order,
/// so the same inputs always yield the same task stream.
pub fn enumerate(targets: &[String], ports: &PortSpec) -> Vec<ScanTask> {
    let ports = ports.ports();
    let mut tasks = Vec::with_capacity(targets.len() * ports.len());
    for target in targets {
        let host = target.trim();
        for &port in &ports {
            tasks.push(ScanTask::new(host, port));
        }
    }
    tasks
}
