//! Core library for the platform sentinel
//!
//! This crate provides:
//! - Synthetic cluster, gateway, and log telemetry generation
//! - Threshold-driven alerting with dedup and expiry
//! - The four-stage incident analysis pipeline
//! - Runbook execution and bottleneck detection
//! - The tool surface, health checks, and Prometheus observability

pub mod actions;
pub mod alerts;
pub mod automation;
pub mod health;
pub mod history;
pub mod incident;
pub mod models;
pub mod observability;
pub mod telemetry;
pub mod tools;

pub use alerts::{Alert, AlertSeverity, AlertStore, AlertSummary, AlertType};
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse};
pub use models::*;
pub use observability::{PlatformMetrics, StructuredLogger};
