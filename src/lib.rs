//! VSA deployer library
//!
//! Provisions a single StoreVirtual VSA VM on a libvirt host: a network, a
//! storage pool and the VM itself, with roll-back when a step fails part way.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod utils;
pub mod vm;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use config::Settings;
pub use error::DeployError;
pub use vm::installer::{Deployer, InstallOptions, InstallOutcome};
pub use vm::manager::{VmManager, VmStatus};

/// Library error type
pub type Result<T> = anyhow::Result<T>;
