//! Error taxonomy for the deployment workflow

use crate::backend::{BackendError, ResourceKind};
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or writing the JSON inputs
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create pool directory {}: {source}", .path.display())]
    PoolDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot retrieve netmask from interface {interface}: {reason}")]
    Netmask { interface: String, reason: String },

    #[error("invalid IPv4 address '{0}'")]
    Address(String),
}

/// Failures while rendering an XML template
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no substitution for placeholder %{0}%")]
    MissingKey(String),

    #[error("failed to write rendered definition {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One failed teardown sub-step
#[derive(Error, Debug)]
pub enum DestroyError {
    #[error("failed to destroy and undefine domain {name}: {source}")]
    Domain {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to destroy and undefine network {name}: {source}")]
    Network {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to destroy and undefine storage pool {name}: {source}")]
    Pool {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to remove pool directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DestroyError {
    pub(crate) fn for_kind(kind: ResourceKind, name: &str, source: BackendError) -> Self {
        let name = name.to_string();
        match kind {
            ResourceKind::Domain => DestroyError::Domain { name, source },
            ResourceKind::Network => DestroyError::Network { name, source },
            ResourceKind::Pool => DestroyError::Pool { name, source },
        }
    }
}

/// Top-level error for install, status and destroy
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("device probe failed: {0}")]
    HostProbe(#[source] BackendError),

    #[error("creation of {kind} {name} failed: {source}")]
    Provision {
        kind: ResourceKind,
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("installer could not create the default input document: {0}")]
    DefaultInput(#[source] BackendError),

    #[error("installer input document is invalid: {0}")]
    InputDocument(String),

    #[error("VSA installation failed: {0}")]
    Install(#[source] BackendError),

    #[error("failed to query the status of {name}: {source}")]
    StatusQuery {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to mark {name} for autostart: {source}")]
    Autostart {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("teardown finished with {} failure(s): {}", .0.len(), join_failures(.0))]
    Destroy(Vec<DestroyError>),
}

fn join_failures(failures: &[DestroyError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
