//! Process-wide settings, resolved once at startup

use crate::backend::DomainState;
use crate::utils::paths;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the workflow needs to locate its inputs and collaborators.
/// Components receive this by reference and never consult the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Holds `data/*_template.xml` and `scripts/get_devices.sh`
    pub config_dir: PathBuf,
    /// Appliance package handed to the installer
    pub image_path: PathBuf,
    pub installer: PathBuf,
    pub network_config_file: PathBuf,
    pub appliance_config_file: PathBuf,
    /// Where rendered definitions and the installer input are written
    pub work_dir: PathBuf,
    pub virsh: PathBuf,
    pub connect_uri: Option<String>,
    pub virsh_timeout: Duration,
    pub installer_timeout: Duration,
    /// Domain states that make `install` a no-op
    pub present_states: Vec<DomainState>,
}

impl Settings {
    pub fn network_template(&self) -> PathBuf {
        paths::network_template_path(&self.config_dir)
    }

    pub fn pool_template(&self) -> PathBuf {
        paths::pool_template_path(&self.config_dir)
    }

    pub fn device_probe(&self) -> PathBuf {
        paths::device_probe_path(&self.config_dir)
    }
}

/// States treated as "already installed" unless overridden
pub fn default_present_states() -> Vec<DomainState> {
    vec![DomainState::Running, DomainState::Paused]
}
