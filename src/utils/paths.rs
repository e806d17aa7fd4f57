//! Well-known file locations

use std::path::{Path, PathBuf};

/// Network definition template under the config directory
pub fn network_template_path(config_dir: &Path) -> PathBuf {
    config_dir.join("data").join("network_template.xml")
}

/// Storage pool definition template under the config directory
pub fn pool_template_path(config_dir: &Path) -> PathBuf {
    config_dir.join("data").join("storage_pool_template.xml")
}

/// Script listing the host's non-root block devices
pub fn device_probe_path(config_dir: &Path) -> PathBuf {
    config_dir.join("scripts").join("get_devices.sh")
}

/// Installer input document; the installer writes its skeleton here and
/// reads the assembled document back from the same place.
pub fn default_input_path(work_dir: &Path) -> PathBuf {
    work_dir.join("default-input.json")
}

pub fn rendered_network_path(work_dir: &Path) -> PathBuf {
    work_dir.join("network_vsa.xml")
}

pub fn rendered_pool_path(work_dir: &Path) -> PathBuf {
    work_dir.join("storage_pool_vsa.xml")
}
