//! CLI command definitions

use crate::backend::DomainState;
use crate::config::settings::default_present_states;
use crate::config::Settings;
use crate::utils::system::{absolutize, pick_bin};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// VSA deployer CLI
#[derive(Parser, Debug)]
#[command(name = "vsa-deployer", about = "Deploy a StoreVirtual VSA VM on a libvirt host")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Locations and limits shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Directory holding data/*_template.xml and scripts/get_devices.sh
    #[arg(long, env = "VSA_CONFIG_DIR", default_value = ".", global = true)]
    pub config_dir: PathBuf,

    /// VSA package handed to the installer
    #[arg(long, env = "VSA_IMAGE_PATH", default_value = "vsa.tgz", global = true)]
    pub image_path: PathBuf,

    /// Installer binary
    #[arg(long, env = "VSA_INSTALLER", default_value = "vsa-installer", global = true)]
    pub installer: PathBuf,

    /// Network configuration JSON
    #[arg(long, env = "VSA_NETWORK_CONFIG_FILE", default_value = "vsa_network_config.json", global = true)]
    pub network_config: PathBuf,

    /// Appliance configuration JSON (rewritten after install)
    #[arg(long, env = "VSA_CONFIG_FILE", default_value = "vsa_config.json", global = true)]
    pub vsa_config: PathBuf,

    /// Where rendered definitions and default-input.json are written
    #[arg(long, default_value = ".", global = true)]
    pub work_dir: PathBuf,

    /// virsh binary
    #[arg(long, env = "VSA_VIRSH", default_value = "virsh", global = true)]
    pub virsh: PathBuf,

    /// libvirt connection URI
    #[arg(long, short = 'c', global = true)]
    pub connect: Option<String>,

    /// Timeout for each virsh call and host probe (seconds)
    #[arg(long, default_value_t = 120, global = true)]
    pub virsh_timeout: u64,

    /// Timeout for each installer run (seconds)
    #[arg(long, default_value_t = 3600, global = true)]
    pub installer_timeout: u64,

    /// Domain state that counts as already installed (repeatable; default running, paused)
    #[arg(long, value_enum, global = true)]
    pub present_state: Vec<DomainState>,

    /// Log level (trace|debug|info|warn|error); RUST_LOG overrides
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

impl GlobalOpts {
    /// Resolve the options into the settings handed to every component
    pub fn settings(&self) -> Settings {
        let present_states = if self.present_state.is_empty() {
            default_present_states()
        } else {
            self.present_state.clone()
        };
        Settings {
            config_dir: absolutize(&self.config_dir),
            image_path: absolutize(&self.image_path),
            installer: pick_bin(&self.installer),
            network_config_file: self.network_config.clone(),
            appliance_config_file: self.vsa_config.clone(),
            work_dir: absolutize(&self.work_dir),
            virsh: pick_bin(&self.virsh),
            connect_uri: self.connect.clone(),
            virsh_timeout: Duration::from_secs(self.virsh_timeout),
            installer_timeout: Duration::from_secs(self.installer_timeout),
            present_states,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create the VSA network, storage pool and VM (no-op if the VM is present)
    Install {
        /// Enable adaptive optimization (two storage tiers)
        #[arg(long)]
        ao: bool,

        /// Tier file listing "Tier 0" and "Tier 1" devices; disks are discovered otherwise
        #[arg(long)]
        disk_file: Option<PathBuf>,
    },

    /// Destroy the VSA VM, network, storage pool and pool directory
    Destroy,

    /// Show whether the VSA VM is defined and its state
    Status,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate man page
    ManPage,
}
