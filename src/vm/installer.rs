//! The install workflow and its compensating roll-back

use crate::backend::{ControlPlane, DomainState, HostProbe, InstallerBinary, ResourceKind};
use crate::config::schema::{ApplianceConfig, ApplianceDocument};
use crate::config::Settings;
use crate::error::{ConfigError, DeployError, DestroyError};
use crate::utils::net::{compute_gateway, netmask_prefix};
use crate::utils::paths::{default_input_path, rendered_network_path, rendered_pool_path};
use crate::vm::config::{load_appliance_config, load_network_config, load_tier_file, read_json, touch, write_json};
use crate::vm::disks::{
    assign_by_convention, check_counts, discover_disks, resolve_from_tier_file, validate, DiskAssignment,
};
use crate::vm::input::{fill_input, InputOverlay, NetworkOverlay};
use crate::vm::manager::{teardown, VmManager, VmStatus};
use crate::vm::provision::provision;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Install parameters chosen on the command line
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Enable adaptive optimization (two-tier storage)
    pub ao: bool,
    /// Explicit tier file; otherwise disks are discovered
    pub disk_file: Option<PathBuf>,
}

/// Progress through the install workflow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstallStage {
    Idle,
    ConfigLoaded,
    DisksResolved,
    InputAssembled,
    NetworkUp,
    PoolUp,
    VmCreated,
    Configured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The VM already exists in one of the configured present states
    AlreadyPresent(DomainState),
    /// Fresh install completed; carries the installer's output
    Installed { output: String },
}

/// Drives install, status and destroy against the injected collaborators
pub struct Deployer<'a> {
    settings: &'a Settings,
    control: &'a dyn ControlPlane,
    installer: &'a dyn InstallerBinary,
    probe: &'a dyn HostProbe,
}

fn enter(stage: &mut InstallStage, next: InstallStage) {
    debug!("{stage:?} -> {next:?}");
    *stage = next;
}

impl<'a> Deployer<'a> {
    pub fn new(
        settings: &'a Settings,
        control: &'a dyn ControlPlane,
        installer: &'a dyn InstallerBinary,
        probe: &'a dyn HostProbe,
    ) -> Self {
        Self {
            settings,
            control,
            installer,
            probe,
        }
    }

    /// Run the full install workflow.
    ///
    /// Once the network is up, a failure tears down what this run created
    /// (network, then pool) before the original error is returned.
    pub fn install(&self, opts: &InstallOptions) -> Result<InstallOutcome, DeployError> {
        let mut stage = InstallStage::Idle;

        let doc = load_appliance_config(&self.settings.appliance_config_file)?;
        let appliance = &doc.vsa_config;
        enter(&mut stage, InstallStage::ConfigLoaded);
        if let Some(state) = self.present_state(&appliance.hostname)? {
            info!("The VSA VM {} is present on the host ({state}), skipping installation", appliance.hostname);
            return Ok(InstallOutcome::AlreadyPresent(state));
        }

        info!("VSA deployment started");
        let (bridge, network) = self.resolve_network(appliance)?;
        let assignment = self.resolve_disks(opts)?;
        enter(&mut stage, InstallStage::DisksResolved);

        let input = self.assemble_input(appliance, network, &assignment, opts.ao)?;
        enter(&mut stage, InstallStage::InputAssembled);

        self.provision_network(appliance, &bridge)?;
        enter(&mut stage, InstallStage::NetworkUp);

        if let Err(e) = self.provision_pool(appliance) {
            error!("{e}");
            self.roll_back(stage, appliance);
            return Err(e);
        }
        enter(&mut stage, InstallStage::PoolUp);

        let output = match self.installer.install(&input, &self.settings.image_path) {
            Ok(output) => output,
            Err(source) => {
                let e = DeployError::Install(source);
                error!("{e}");
                self.roll_back(stage, appliance);
                return Err(e);
            }
        };
        info!("VSA VM creation success");
        enter(&mut stage, InstallStage::VmCreated);

        self.finish(doc.clone())?;
        enter(&mut stage, InstallStage::Configured);
        Ok(InstallOutcome::Installed { output })
    }

    /// Current status of the configured appliance VM
    pub fn status(&self) -> Result<VmStatus, DeployError> {
        let doc = load_appliance_config(&self.settings.appliance_config_file)?;
        VmManager::new(self.control).status(&doc.vsa_config.hostname)
    }

    /// Remove everything a previous install created
    pub fn destroy(&self) -> Result<(), DeployError> {
        let doc = load_appliance_config(&self.settings.appliance_config_file)?;
        VmManager::new(self.control).destroy_all(&doc.vsa_config)
    }

    fn present_state(&self, name: &str) -> Result<Option<DomainState>, DeployError> {
        let status = VmManager::new(self.control).status(name)?;
        Ok(status
            .state()
            .filter(|s| self.settings.present_states.contains(s)))
    }

    /// Network config plus the addressing derived from the host
    fn resolve_network(&self, appliance: &ApplianceConfig) -> Result<(String, NetworkOverlay), DeployError> {
        let cfg = load_network_config(&self.settings.network_config_file)?;
        let raw_ip = &cfg.vsa_network.ip_address;
        let ip_address: Ipv4Addr = raw_ip.parse().map_err(|_| ConfigError::Address(raw_ip.clone()))?;

        let bridge = cfg.virtual_bridge.name;
        let netmask_err = |reason: String| ConfigError::Netmask {
            interface: bridge.clone(),
            reason,
        };
        let subnet = self
            .probe
            .netmask(&bridge)
            .map_err(|e| netmask_err(e.to_string()))?;
        let prefix = netmask_prefix(subnet).map_err(|e| netmask_err(e.to_string()))?;
        let gateway = compute_gateway(ip_address, subnet);
        debug!("Netmask: {subnet} (/{prefix}) Gateway: {gateway}");

        let overlay = NetworkOverlay {
            ip_address,
            subnet,
            gateway,
            interface: appliance.network_name.clone(),
        };
        Ok((bridge, overlay))
    }

    fn resolve_disks(&self, opts: &InstallOptions) -> Result<DiskAssignment, DeployError> {
        let discovered = discover_disks(self.probe)?;
        let assignment = match &opts.disk_file {
            Some(path) => resolve_from_tier_file(&load_tier_file(path)?),
            None if opts.ao => assign_by_convention(discovered.clone()),
            None => DiskAssignment::untiered(discovered.clone()),
        };
        info!("Disks for VSA deployment: {:?}", assignment.paths());
        check_counts(&assignment, opts.ao)?;
        validate(&assignment, &discovered)?;
        Ok(assignment)
    }

    /// Fetch the installer's skeleton, fill it, and write it where the
    /// installer will read it.
    fn assemble_input(
        &self,
        appliance: &ApplianceConfig,
        network: NetworkOverlay,
        assignment: &DiskAssignment,
        tiering: bool,
    ) -> Result<PathBuf, DeployError> {
        let skeleton_path = self
            .installer
            .create_default_input(assignment.len(), tiering)
            .map_err(DeployError::DefaultInput)?;
        let skeleton = read_json(&skeleton_path)?;

        let overlay = InputOverlay {
            host_name: appliance.hostname.clone(),
            storage_pool: appliance.os_image_storagepool.clone(),
            network,
        };
        let doc = fill_input(skeleton, &overlay, assignment, tiering)?;

        let path = default_input_path(&self.settings.work_dir);
        write_json(&path, &doc)?;
        info!("default input json initialization success");
        Ok(path)
    }

    fn provision_network(&self, appliance: &ApplianceConfig, bridge: &str) -> Result<(), DeployError> {
        let subs = HashMap::from([
            ("NETWORK_NAME", appliance.network_name.as_str()),
            ("BRIDGE_NAME", bridge),
        ]);
        provision(
            self.control,
            ResourceKind::Network,
            &appliance.network_name,
            &self.settings.network_template(),
            &rendered_network_path(&self.settings.work_dir),
            &subs,
        )
    }

    fn provision_pool(&self, appliance: &ApplianceConfig) -> Result<(), DeployError> {
        let pool_path = appliance.os_image_dir.to_string_lossy();
        let subs = HashMap::from([
            ("POOL_NAME", appliance.os_image_storagepool.as_str()),
            ("POOL_PATH", pool_path.as_ref()),
        ]);
        provision(
            self.control,
            ResourceKind::Pool,
            &appliance.os_image_storagepool,
            &self.settings.pool_template(),
            &rendered_pool_path(&self.settings.work_dir),
            &subs,
        )
    }

    /// Record the install in the appliance file and apply autostart. Not
    /// compensated: the VM stays defined if this fails.
    fn finish(&self, doc: ApplianceDocument) -> Result<(), DeployError> {
        let doc = touch(&self.settings.appliance_config_file, doc)?;
        let cfg = &doc.vsa_config;
        if cfg.autostart() {
            self.control
                .autostart(ResourceKind::Domain, &cfg.hostname)
                .map_err(|source| DeployError::Autostart {
                    name: cfg.hostname.clone(),
                    source,
                })?;
            info!("Set VSA VM to autostart");
        }
        Ok(())
    }

    /// Undo the resources created up to `reached`, newest last, stopping at
    /// the first failure. Errors are logged only.
    fn roll_back(&self, reached: InstallStage, appliance: &ApplianceConfig) {
        error!("VSA installation failed, rolling back");
        let mut steps = vec![(ResourceKind::Network, appliance.network_name.as_str())];
        if reached >= InstallStage::PoolUp {
            steps.push((ResourceKind::Pool, appliance.os_image_storagepool.as_str()));
        }
        for (kind, name) in steps {
            if let Err(source) = teardown(self.control, kind, name) {
                error!("{}", DestroyError::for_kind(kind, name, source));
                error!("Roll-back stopped; remaining resources were left in place");
                return;
            }
        }
        info!("Roll-back complete");
    }
}
