//! Command handlers: bridge CLI args -> vnc-core -> output formatting.

pub mod config_cmd;
pub mod network;
