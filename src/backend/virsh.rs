//! `virsh`-backed control plane

use super::command::run_with_timeout;
use super::{BackendError, ControlPlane, DomainState, ResourceKind};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Drives libvirt through the `virsh` CLI
#[derive(Debug, Clone)]
pub struct VirshControlPlane {
    virsh: PathBuf,
    connect_uri: Option<String>,
    timeout: Duration,
}

impl VirshControlPlane {
    pub fn new(virsh: PathBuf, connect_uri: Option<String>, timeout: Duration) -> Self {
        Self {
            virsh,
            connect_uri,
            timeout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.virsh);
        if let Some(uri) = &self.connect_uri {
            cmd.arg("-c").arg(uri);
        }
        cmd
    }

    fn run(&self, kind: ResourceKind, verb: &str, arg: &OsStr, what: String) -> Result<String, BackendError> {
        let mut cmd = self.command();
        cmd.arg(subcommand(kind, verb)).arg(arg);
        run_with_timeout(&mut cmd, self.timeout)
            .map(|out| out.stdout)
            .map_err(|e| classify(e, what))
    }

    fn run_named(&self, kind: ResourceKind, verb: &str, name: &str) -> Result<(), BackendError> {
        self.run(kind, verb, OsStr::new(name), format!("{kind} {name}"))
            .map(drop)
    }
}

/// virsh subcommand for a verb on a resource family
fn subcommand(kind: ResourceKind, verb: &str) -> String {
    match kind {
        ResourceKind::Network => format!("net-{verb}"),
        ResourceKind::Pool => format!("pool-{verb}"),
        ResourceKind::Domain => verb.to_string(),
    }
}

/// Map virsh's error text onto the not-found / not-active cases
fn classify(err: BackendError, what: String) -> BackendError {
    let BackendError::Failed { output, .. } = &err else {
        return err;
    };
    let lower = output.to_lowercase();
    if lower.contains("not found") || lower.contains("with matching name") {
        BackendError::NotFound { what }
    } else if lower.contains("not running") || lower.contains("not active") {
        BackendError::NotActive { what }
    } else {
        err
    }
}

impl ControlPlane for VirshControlPlane {
    fn define(&self, kind: ResourceKind, xml: &Path) -> Result<(), BackendError> {
        self.run(kind, "define", xml.as_os_str(), format!("{kind} definition {}", xml.display()))
            .map(drop)
    }

    fn start(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError> {
        self.run_named(kind, "start", name)
    }

    fn autostart(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError> {
        self.run_named(kind, "autostart", name)
    }

    fn destroy(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError> {
        self.run_named(kind, "destroy", name)
    }

    fn undefine(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError> {
        self.run_named(kind, "undefine", name)
    }

    fn domain_state(&self, name: &str) -> Result<DomainState, BackendError> {
        let kind = ResourceKind::Domain;
        let out = self.run(kind, "domstate", OsStr::new(name), format!("{kind} {name}"))?;
        let line = out.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
        DomainState::from_virsh(line).ok_or_else(|| BackendError::Unexpected {
            command: format!("{} domstate {name}", self.virsh.display()),
            output: out.trim().to_string(),
        })
    }
}
