//! Assembling the installer input document

use crate::error::DeployError;
use crate::vm::disks::DiskAssignment;
use serde_json::{json, Value};
use std::net::Ipv4Addr;
use tracing::debug;

/// Addressing written into every network entry of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkOverlay {
    pub ip_address: Ipv4Addr,
    pub subnet: Ipv4Addr,
    pub gateway: Ipv4Addr,
    /// libvirt network the appliance NIC attaches to
    pub interface: String,
}

/// Values overlaid on the installer's skeleton
#[derive(Debug, Clone)]
pub struct InputOverlay {
    pub host_name: String,
    pub storage_pool: String,
    pub network: NetworkOverlay,
}

fn invalid(msg: impl Into<String>) -> DeployError {
    DeployError::InputDocument(msg.into())
}

/// Merge the overlay and the ordered disk assignment into a skeleton.
///
/// Disk `i` of the skeleton receives assignment entry `i`; the tier label is
/// only written when tiering is enabled.
pub fn fill_input(
    mut skeleton: Value,
    overlay: &InputOverlay,
    assignment: &DiskAssignment,
    tiering: bool,
) -> Result<Value, DeployError> {
    let doc = skeleton
        .as_object_mut()
        .ok_or_else(|| invalid("skeleton is not a JSON object"))?;

    doc.insert("HostName".into(), json!(overlay.host_name));
    doc.insert("OSImageStoragePool".into(), json!(overlay.storage_pool));
    debug!("HostName: {} OSImageStoragePool: {}", overlay.host_name, overlay.storage_pool);

    let networks = doc
        .get_mut("Networks")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| invalid("skeleton has no Networks list"))?;
    let net = &overlay.network;
    for network in networks.iter_mut() {
        let entry = network
            .as_object_mut()
            .ok_or_else(|| invalid("Networks entry is not an object"))?;
        entry.insert("DHCP".into(), json!(0));
        entry.insert("IPAddress".into(), json!(net.ip_address.to_string()));
        entry.insert("Subnet".into(), json!(net.subnet.to_string()));
        entry.insert("Gateway".into(), json!(net.gateway.to_string()));
        entry.insert("NetworkInterface".into(), json!(net.interface));
    }
    debug!(
        "IPAddress: {} Subnet: {} Gateway: {} NetworkInterface: {}",
        net.ip_address, net.subnet, net.gateway, net.interface
    );

    let disks = doc
        .get_mut("Disks")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| invalid("skeleton has no Disks list"))?;
    if disks.len() != assignment.len() {
        return Err(invalid(format!(
            "skeleton lists {} disks, {} assigned",
            disks.len(),
            assignment.len()
        )));
    }
    for (slot, disk) in disks.iter_mut().zip(assignment.iter()) {
        let entry = slot
            .as_object_mut()
            .ok_or_else(|| invalid("Disks entry is not an object"))?;
        entry.insert("Location".into(), json!(disk.path));
        entry.insert("Size".into(), json!(""));
        if tiering {
            if let Some(tier) = disk.tier {
                entry.insert("Tier".into(), json!(tier.label()));
            }
        }
    }

    Ok(skeleton)
}
