//! Side-effecting operations for the deploy task.

pub mod config_file;
pub mod kubectl;
pub mod process;
pub mod settings;
