//! In-memory collaborators for exercising the workflow without a hypervisor

use super::{BackendError, ControlPlane, DomainState, HostProbe, InstallerBinary, ResourceKind};
use crate::utils::paths::default_input_path;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Define(ResourceKind),
    Start(ResourceKind, String),
    Autostart(ResourceKind, String),
    Destroy(ResourceKind, String),
    Undefine(ResourceKind, String),
    DomainState(String),
}

fn failed(what: &str) -> BackendError {
    BackendError::Failed {
        command: format!("fake {what}"),
        code: Some(1),
        output: "simulated failure".into(),
    }
}

/// Records every control-plane call; failures are injected per kind
#[derive(Debug, Default)]
pub struct FakeControlPlane {
    pub calls: RefCell<Vec<Call>>,
    /// `None` means no such domain
    pub domain: Option<DomainState>,
    pub state_query_fails: bool,
    pub fail_define: Vec<ResourceKind>,
    pub fail_start: Vec<ResourceKind>,
    pub fail_destroy: Vec<ResourceKind>,
    pub fail_undefine: Vec<ResourceKind>,
    pub inactive: Vec<ResourceKind>,
    pub missing: Vec<ResourceKind>,
}

impl FakeControlPlane {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    /// Calls that change control-plane state
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::DomainState(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn teardown_result(&self, kind: ResourceKind, name: &str, fail: &[ResourceKind]) -> Result<(), BackendError> {
        if self.missing.contains(&kind) {
            return Err(BackendError::NotFound {
                what: format!("{kind} {name}"),
            });
        }
        if fail.contains(&kind) {
            return Err(failed(&format!("teardown of {kind}")));
        }
        Ok(())
    }
}

impl ControlPlane for FakeControlPlane {
    fn define(&self, kind: ResourceKind, _xml: &Path) -> Result<(), BackendError> {
        self.record(Call::Define(kind));
        if self.fail_define.contains(&kind) {
            return Err(failed(&format!("{kind} define")));
        }
        Ok(())
    }

    fn start(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError> {
        self.record(Call::Start(kind, name.to_string()));
        if self.fail_start.contains(&kind) {
            return Err(failed(&format!("{kind} start")));
        }
        Ok(())
    }

    fn autostart(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError> {
        self.record(Call::Autostart(kind, name.to_string()));
        Ok(())
    }

    fn destroy(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError> {
        self.record(Call::Destroy(kind, name.to_string()));
        if self.inactive.contains(&kind) {
            return Err(BackendError::NotActive {
                what: format!("{kind} {name}"),
            });
        }
        self.teardown_result(kind, name, &self.fail_destroy)
    }

    fn undefine(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError> {
        self.record(Call::Undefine(kind, name.to_string()));
        self.teardown_result(kind, name, &self.fail_undefine)
    }

    fn domain_state(&self, name: &str) -> Result<DomainState, BackendError> {
        self.record(Call::DomainState(name.to_string()));
        if self.state_query_fails {
            return Err(failed("domstate"));
        }
        self.domain.ok_or_else(|| BackendError::NotFound {
            what: format!("domain {name}"),
        })
    }
}

/// Skeleton shaped like the installer's `-create-default-json` output
pub fn skeleton(disks: usize, tiering: bool) -> Value {
    let disks: Vec<Value> = (0..disks)
        .map(|i| {
            let mut d = json!({ "Location": "", "Size": "100GB" });
            if tiering {
                d["Tier"] = json!(if i == 0 { "Tier 0" } else { "Tier 1" });
            }
            d
        })
        .collect();
    json!({
        "HostName": "",
        "OSImageStoragePool": "",
        "Personality": "VSA",
        "Networks": [{
            "DHCP": 1,
            "IPAddress": "",
            "Subnet": "",
            "Gateway": "",
            "NetworkInterface": ""
        }],
        "Disks": disks
    })
}

/// Writes a skeleton into its work directory and records install runs
#[derive(Debug)]
pub struct FakeInstaller {
    pub work_dir: PathBuf,
    pub fail_default: bool,
    pub fail_install: bool,
    pub requests: RefCell<Vec<(usize, bool)>>,
    pub installs: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl FakeInstaller {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            fail_default: false,
            fail_install: false,
            requests: RefCell::new(Vec::new()),
            installs: RefCell::new(Vec::new()),
        }
    }
}

impl InstallerBinary for FakeInstaller {
    fn create_default_input(&self, disks: usize, tiering: bool) -> Result<PathBuf, BackendError> {
        self.requests.borrow_mut().push((disks, tiering));
        if self.fail_default {
            return Err(failed("create-default-json"));
        }
        let path = default_input_path(&self.work_dir);
        let body = serde_json::to_string_pretty(&skeleton(disks, tiering)).map_err(|e| BackendError::Unexpected {
            command: "fake create-default-json".into(),
            output: e.to_string(),
        })?;
        std::fs::write(&path, body).map_err(|source| BackendError::Spawn {
            command: "fake create-default-json".into(),
            source,
        })?;
        Ok(path)
    }

    fn install(&self, input: &Path, package: &Path) -> Result<String, BackendError> {
        self.installs
            .borrow_mut()
            .push((input.to_path_buf(), package.to_path_buf()));
        if self.fail_install {
            return Err(failed("install"));
        }
        Ok("VSA installed\n".into())
    }
}

#[derive(Debug, Clone)]
pub struct FakeProbe {
    pub devices: Vec<String>,
    pub netmask: Option<Ipv4Addr>,
}

impl FakeProbe {
    pub fn new(devices: &[&str]) -> Self {
        Self {
            devices: devices.iter().map(|d| d.to_string()).collect(),
            netmask: Some(Ipv4Addr::new(255, 255, 255, 0)),
        }
    }
}

impl HostProbe for FakeProbe {
    fn devices(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.devices.clone())
    }

    fn netmask(&self, interface: &str) -> Result<Ipv4Addr, BackendError> {
        self.netmask.ok_or_else(|| BackendError::NotFound {
            what: format!("interface {interface}"),
        })
    }
}
