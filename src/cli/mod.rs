//! CLI command handling

pub mod config_cmd;
pub mod run;

pub use config_cmd::*;
pub use run::*;
