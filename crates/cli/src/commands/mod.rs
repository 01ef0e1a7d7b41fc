//! CLI command implementations

pub mod incident;
pub mod telemetry;
