//! Reading and persisting the JSON configuration documents

use crate::config::schema::{ApplianceConfig, ApplianceDocument, NetworkConfig, TierFile, TierLists};
use crate::error::ConfigError;
use crate::utils::system::now_utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Parse a JSON document, naming `path` in any failure
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    debug!("Parse JSON: {}", path.display());
    let f = File::open(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(f)).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `value` to `path`, replacing the file
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let write_err = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut body = serde_json::to_string_pretty(value).map_err(|e| write_err(e.into()))?;
    body.push('\n');
    fs::write(path, body).map_err(write_err)
}

/// Load the network configuration file
pub fn load_network_config(path: &Path) -> Result<NetworkConfig, ConfigError> {
    info!("Read VSA network config from {}", path.display());
    let cfg: NetworkConfig = read_json(path)?;
    debug!(
        "bridge: {} ({}) on {}, vsa ip: {}",
        cfg.virtual_bridge.name,
        cfg.virtual_bridge.ip_address,
        cfg.virtual_bridge.interface,
        cfg.vsa_network.ip_address
    );
    Ok(cfg)
}

/// Load the appliance configuration, creating its pool directory if needed
pub fn load_appliance_config(path: &Path) -> Result<ApplianceDocument, ConfigError> {
    info!("Read VSA config from {}", path.display());
    let doc: ApplianceDocument = read_json(path)?;
    let pool_dir = &doc.vsa_config.os_image_dir;
    if !pool_dir.exists() {
        fs::create_dir_all(pool_dir).map_err(|source| ConfigError::PoolDir {
            path: pool_dir.clone(),
            source,
        })?;
        debug!("Created pool directory {}", pool_dir.display());
    }
    Ok(doc)
}

/// Load a disk tiering file
pub fn load_tier_file(path: &Path) -> Result<TierLists, ConfigError> {
    let tiers = read_json::<TierFile>(path)?.into_tiers();
    info!("Tier0 disks: {:?}", tiers.tier0);
    info!("Tier1 disks: {:?}", tiers.tier1);
    Ok(tiers)
}

/// Apply the lifecycle bookkeeping for one successful load-and-save.
///
/// The first touch stamps `created_at` and `updated_at` with the same
/// instant; later touches move `updated_at` and bump the access count.
pub fn touch_at(cfg: &mut ApplianceConfig, now: &str) {
    if cfg.created_at.is_empty() {
        cfg.created_at = now.to_string();
        cfg.updated_at = now.to_string();
    } else {
        cfg.updated_at = now.to_string();
        cfg.file_access_count += 1;
    }
}

/// Touch the appliance record and write it back to `path`
pub fn touch(path: &Path, mut doc: ApplianceDocument) -> Result<ApplianceDocument, ConfigError> {
    touch_at(&mut doc.vsa_config, &now_utc());
    write_json(path, &doc)?;
    info!("Update VSA config file success");
    Ok(doc)
}
