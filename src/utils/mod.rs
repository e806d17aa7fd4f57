//! Small helpers shared across modules

pub mod net;
pub mod paths;
pub mod system;
