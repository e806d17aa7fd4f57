//! Configuration documents and process settings

pub mod schema;
pub mod settings;

pub use schema::{ApplianceConfig, ApplianceDocument, NetworkConfig, TierFile, TierLists};
pub use settings::Settings;
