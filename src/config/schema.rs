//! On-disk configuration schema definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Network configuration file (`VSA_NETWORK_CONFIG_FILE`)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NetworkConfig {
    pub virtual_bridge: VirtualBridge,
    pub vsa_network: VsaNetwork,
}

/// Host bridge the appliance network hangs off
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VirtualBridge {
    pub name: String,
    pub ip_address: String,
    pub interface: String,
}

/// Address assigned to the appliance VM
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VsaNetwork {
    pub ip_address: String,
}

/// Appliance configuration file (`VSA_CONFIG_FILE`)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApplianceDocument {
    pub vsa_config: ApplianceConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The appliance record; rewritten in place after each install
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApplianceConfig {
    pub hostname: String,
    pub network_name: String,
    pub os_image_storagepool: String,
    pub os_image_dir: PathBuf,
    /// `"True"` enables autostart; anything else disables it
    pub autostart: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub file_access_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApplianceConfig {
    pub fn autostart(&self) -> bool {
        self.autostart == "True"
    }
}

/// Two named tiers of device paths
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TierLists {
    #[serde(rename = "Tier 0")]
    pub tier0: Vec<String>,
    #[serde(rename = "Tier 1")]
    pub tier1: Vec<String>,
}

/// Disk tiering file, either bare or wrapped in `vsa_disks`
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum TierFile {
    Nested { vsa_disks: TierLists },
    Flat(TierLists),
}

impl TierFile {
    pub fn into_tiers(self) -> TierLists {
        match self {
            TierFile::Nested { vsa_disks } => vsa_disks,
            TierFile::Flat(tiers) => tiers,
        }
    }
}
