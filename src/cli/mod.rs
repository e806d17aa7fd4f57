pub mod commands;
pub mod completions;
