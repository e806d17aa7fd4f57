//! VM lifecycle management: status queries and teardown

use crate::backend::{BackendError, ControlPlane, DomainState, ResourceKind};
use crate::config::schema::ApplianceConfig;
use crate::error::{DeployError, DestroyError};
use std::fmt;
use std::fs;
use std::io;
use tracing::{debug, error, info};

/// Whether the appliance domain exists, and in what state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmStatus {
    PresentRunning,
    PresentOther(DomainState),
    Absent,
}

impl VmStatus {
    pub fn state(self) -> Option<DomainState> {
        match self {
            VmStatus::PresentRunning => Some(DomainState::Running),
            VmStatus::PresentOther(state) => Some(state),
            VmStatus::Absent => None,
        }
    }
}

impl fmt::Display for VmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state() {
            Some(state) => write!(f, "present ({state})"),
            None => f.write_str("absent"),
        }
    }
}

/// Stop and remove one resource. A resource that is already gone counts as
/// removed; one that is merely inactive is still undefined.
pub fn teardown(control: &dyn ControlPlane, kind: ResourceKind, name: &str) -> Result<(), BackendError> {
    match control.destroy(kind, name) {
        Ok(()) => {}
        Err(BackendError::NotActive { .. }) => debug!("{kind} {name} is not active"),
        Err(e) if e.is_not_found() => {
            info!("{kind} {name} does not exist");
            return Ok(());
        }
        Err(e) => return Err(e),
    }
    match control.undefine(kind, name) {
        Ok(()) => {}
        Err(e) if e.is_not_found() => debug!("{kind} {name} already undefined"),
        Err(e) => return Err(e),
    }
    info!("{kind} {name} destroyed");
    Ok(())
}

/// VM Manager for lifecycle operations
pub struct VmManager<'a> {
    control: &'a dyn ControlPlane,
}

impl<'a> VmManager<'a> {
    pub fn new(control: &'a dyn ControlPlane) -> Self {
        Self { control }
    }

    /// Look up the domain called `name`. A missing domain is `Absent`, not
    /// an error.
    pub fn status(&self, name: &str) -> Result<VmStatus, DeployError> {
        match self.control.domain_state(name) {
            Ok(DomainState::Running) => Ok(VmStatus::PresentRunning),
            Ok(state) => Ok(VmStatus::PresentOther(state)),
            Err(e) if e.is_not_found() => {
                info!("VSA VM {name} not found on the host");
                Ok(VmStatus::Absent)
            }
            Err(source) => Err(DeployError::StatusQuery {
                name: name.to_string(),
                source,
            }),
        }
    }

    /// Tear down domain, network, pool and pool directory.
    ///
    /// Every step is attempted regardless of earlier failures; the failures
    /// are returned together.
    pub fn destroy_all(&self, cfg: &ApplianceConfig) -> Result<(), DeployError> {
        let mut failures = Vec::new();
        let steps = [
            (ResourceKind::Domain, cfg.hostname.as_str()),
            (ResourceKind::Network, cfg.network_name.as_str()),
            (ResourceKind::Pool, cfg.os_image_storagepool.as_str()),
        ];
        for (kind, name) in steps {
            if let Err(source) = teardown(self.control, kind, name) {
                let failure = DestroyError::for_kind(kind, name, source);
                error!("{failure}");
                failures.push(failure);
            }
        }

        match fs::remove_dir_all(&cfg.os_image_dir) {
            Ok(()) => info!("Removed {}", cfg.os_image_dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                let failure = DestroyError::Directory {
                    path: cfg.os_image_dir.clone(),
                    source,
                };
                error!("{failure}");
                failures.push(failure);
            }
        }

        if failures.is_empty() {
            info!("VSA destroy success");
            Ok(())
        } else {
            Err(DeployError::Destroy(failures))
        }
    }
}
