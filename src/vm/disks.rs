//! Disk discovery, tier assignment and validation

use crate::backend::HostProbe;
use crate::config::schema::TierLists;
use crate::error::DeployError;
use std::fmt;
use tracing::{debug, info};

/// Device that becomes the sole Tier 0 disk when auto-tiering is requested
/// without a tier file.
pub const AO_DEVICE: &str = "/dev/sdb";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Fast tier used by adaptive optimization
    Zero,
    /// Capacity tier
    One,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Zero => "Tier 0",
            Tier::One => "Tier 1",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedDisk {
    pub path: String,
    pub tier: Option<Tier>,
}

/// Ordered disks handed to the installer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskAssignment {
    disks: Vec<AssignedDisk>,
}

impl DiskAssignment {
    /// Disks without tier labels
    pub fn untiered(paths: Vec<String>) -> Self {
        Self {
            disks: paths
                .into_iter()
                .map(|path| AssignedDisk { path, tier: None })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssignedDisk> {
        self.disks.iter()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.disks.iter().map(|d| d.path.as_str()).collect()
    }

    pub fn count_in(&self, tier: Tier) -> usize {
        self.disks.iter().filter(|d| d.tier == Some(tier)).count()
    }
}

/// All non-root block devices the host reports
pub fn discover_disks(probe: &dyn HostProbe) -> Result<Vec<String>, DeployError> {
    probe.devices().map_err(DeployError::HostProbe)
}

/// Tier 0 followed by Tier 1, each in file order
pub fn resolve_from_tier_file(tiers: &TierLists) -> DiskAssignment {
    let tagged = |paths: &[String], tier| {
        paths
            .iter()
            .map(move |p| AssignedDisk {
                path: p.clone(),
                tier: Some(tier),
            })
            .collect::<Vec<_>>()
    };
    let mut disks = tagged(&tiers.tier0, Tier::Zero);
    disks.extend(tagged(&tiers.tier1, Tier::One));
    DiskAssignment { disks }
}

/// Label discovered devices: `/dev/sdb` is Tier 0, every other device Tier 1
pub fn assign_by_convention(devices: Vec<String>) -> DiskAssignment {
    DiskAssignment {
        disks: devices
            .into_iter()
            .map(|path| {
                let tier = if path == AO_DEVICE { Tier::Zero } else { Tier::One };
                AssignedDisk {
                    path,
                    tier: Some(tier),
                }
            })
            .collect(),
    }
}

/// Reject assignments naming a device the host does not expose
pub fn validate(assignment: &DiskAssignment, discovered: &[String]) -> Result<(), DeployError> {
    let missing: Vec<&str> = assignment
        .iter()
        .map(|d| d.path.as_str())
        .filter(|p| !discovered.iter().any(|d| d == p))
        .collect();
    if !missing.is_empty() {
        return Err(DeployError::Validation(format!(
            "invalid disk entries are present in the file: {}",
            missing.join(", ")
        )));
    }
    debug!("Disk validation success");
    Ok(())
}

/// Minimum disk count and tiering preconditions
pub fn check_counts(assignment: &DiskAssignment, tiering: bool) -> Result<(), DeployError> {
    info!("Total disks for VSA deployment = {}", assignment.len());
    if assignment.is_empty() {
        return Err(DeployError::Validation(
            "minimum number of disks must be 1, no disks are available".into(),
        ));
    }
    if tiering {
        if assignment.len() < 2 {
            return Err(DeployError::Validation(
                "cannot enable AO as only one disk is available".into(),
            ));
        }
        if assignment.count_in(Tier::Zero) == 0 {
            return Err(DeployError::Validation(format!(
                "cannot enable AO without a Tier 0 disk (expected {AO_DEVICE} or a tier file)"
            )));
        }
    }
    Ok(())
}
