//! The VSA deployment workflow

pub mod config;
pub mod disks;
pub mod input;
pub mod installer;
pub mod manager;
pub mod provision;
