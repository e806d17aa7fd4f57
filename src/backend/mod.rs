//! Narrow seams over the external collaborators: the virtualization control
//! plane, the appliance installer binary and the host device probe.

pub mod command;
pub mod installer;
pub mod probe;
pub mod virsh;

#[cfg(test)]
pub(crate) mod fake;

use clap::ValueEnum;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use installer::ExternalInstaller;
pub use probe::ScriptHostProbe;
pub use virsh::VirshControlPlane;

/// Failure of a single external command
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("{what} is not active")]
    NotActive { what: String },

    #[error("`{command}` exited with status {}: {output}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Failed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected output from `{command}`: {output}")]
    Unexpected { command: String, output: String },
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}

/// Resource families managed through the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Network,
    Pool,
    Domain,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Network => "network",
            ResourceKind::Pool => "storage pool",
            ResourceKind::Domain => "domain",
        })
    }
}

/// Domain states as reported by libvirt
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DomainState {
    NoState,
    Running,
    Blocked,
    Paused,
    Shutdown,
    Shutoff,
    Crashed,
    Suspended,
}

impl DomainState {
    /// libvirt's `virDomainState` value
    pub fn code(self) -> u8 {
        match self {
            DomainState::NoState => 0,
            DomainState::Running => 1,
            DomainState::Blocked => 2,
            DomainState::Paused => 3,
            DomainState::Shutdown => 4,
            DomainState::Shutoff => 5,
            DomainState::Crashed => 6,
            DomainState::Suspended => 7,
        }
    }

    /// Parse the text printed by `virsh domstate`
    pub fn from_virsh(s: &str) -> Option<Self> {
        match s.trim() {
            "no state" | "nostate" => Some(DomainState::NoState),
            "running" => Some(DomainState::Running),
            "idle" | "blocked" => Some(DomainState::Blocked),
            "paused" => Some(DomainState::Paused),
            "in shutdown" | "shutdown" => Some(DomainState::Shutdown),
            "shut off" | "shutoff" => Some(DomainState::Shutoff),
            "crashed" => Some(DomainState::Crashed),
            "pmsuspended" => Some(DomainState::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for DomainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DomainState::NoState => "no state",
            DomainState::Running => "running",
            DomainState::Blocked => "blocked",
            DomainState::Paused => "paused",
            DomainState::Shutdown => "in shutdown",
            DomainState::Shutoff => "shut off",
            DomainState::Crashed => "crashed",
            DomainState::Suspended => "pmsuspended",
        })
    }
}

/// Commands against the virtualization control plane.
///
/// Every call maps to exactly one command; the only consistency this crate
/// relies on is that command's own exit status.
pub trait ControlPlane {
    fn define(&self, kind: ResourceKind, xml: &Path) -> Result<(), BackendError>;
    fn start(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError>;
    fn autostart(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError>;
    fn destroy(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError>;
    fn undefine(&self, kind: ResourceKind, name: &str) -> Result<(), BackendError>;

    /// State of a defined domain; `BackendError::NotFound` when no domain
    /// carries that name.
    fn domain_state(&self, name: &str) -> Result<DomainState, BackendError>;
}

/// The appliance installer binary
pub trait InstallerBinary {
    /// Ask the installer for its default input skeleton. Returns the path of
    /// the document it wrote.
    fn create_default_input(&self, disks: usize, tiering: bool) -> Result<PathBuf, BackendError>;

    /// Install the appliance from an assembled input document. Returns the
    /// installer's output.
    fn install(&self, input: &Path, package: &Path) -> Result<String, BackendError>;
}

/// Host facts the deployer needs
pub trait HostProbe {
    /// Non-root block devices, in the order the host reports them
    fn devices(&self) -> Result<Vec<String>, BackendError>;

    /// IPv4 netmask of a host interface
    fn netmask(&self, interface: &str) -> Result<Ipv4Addr, BackendError>;
}
