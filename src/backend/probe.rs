//! Host facts gathered through external commands

use super::command::run_with_timeout;
use super::{BackendError, HostProbe};
use crate::utils::net::{parse_inet_prefix, prefix_to_netmask};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

/// Lists devices with the deployment's probe script and reads interface
/// addresses with `ip`.
#[derive(Debug, Clone)]
pub struct ScriptHostProbe {
    script: PathBuf,
    timeout: Duration,
}

impl ScriptHostProbe {
    pub fn new(script: PathBuf, timeout: Duration) -> Self {
        Self { script, timeout }
    }
}

impl HostProbe for ScriptHostProbe {
    fn devices(&self) -> Result<Vec<String>, BackendError> {
        let out = run_with_timeout(&mut Command::new(&self.script), self.timeout)?;
        let devices: Vec<String> = out.stdout.split_whitespace().map(str::to_string).collect();
        tracing::debug!("Disks in host: {devices:?}");
        Ok(devices)
    }

    fn netmask(&self, interface: &str) -> Result<Ipv4Addr, BackendError> {
        let mut cmd = Command::new("ip");
        cmd.args(["-o", "-4", "addr", "show", "dev", interface]);
        let out = run_with_timeout(&mut cmd, self.timeout)?;
        parse_inet_prefix(&out.stdout)
            .and_then(prefix_to_netmask)
            .ok_or_else(|| BackendError::Unexpected {
                command: format!("ip -o -4 addr show dev {interface}"),
                output: out.stdout.trim().to_string(),
            })
    }
}
