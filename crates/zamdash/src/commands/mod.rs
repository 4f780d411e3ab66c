//! Command handlers: bridge CLI args -> core service -> output formatting.

pub mod config_cmd;
pub mod health;
pub mod metrics;
