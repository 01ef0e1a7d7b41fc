//! Core data models for the platform sentinel
//!
//! Snapshot types are ephemeral: they are regenerated on every query and
//! carry no identity across calls except by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pod lifecycle phase as reported by the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodStatus {
    Running,
    Pending,
    CrashLoopBackOff,
}

impl std::fmt::Display for PodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PodStatus::Running => write!(f, "Running"),
            PodStatus::Pending => write!(f, "Pending"),
            PodStatus::CrashLoopBackOff => write!(f, "CrashLoopBackOff"),
        }
    }
}

/// Point-in-time pod metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodSnapshot {
    pub name: String,
    pub namespace: String,
    pub status: PodStatus,
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
    pub restart_count: u32,
    pub age: String,
}

/// Point-in-time node metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub status: String,
    pub cpu_capacity: String,
    pub memory_capacity: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
}

/// Aggregate cluster counters derived from the pod list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub total_pods: usize,
    pub running_pods: usize,
    pub pending_pods: usize,
    pub failed_pods: usize,
    pub avg_cpu_usage: f64,
    pub avg_memory_usage: f64,
    pub health_score: f64,
}

/// Full cluster status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterStatus {
    pub cluster: ClusterSummary,
    pub nodes: Vec<NodeSnapshot>,
    pub pods: Vec<PodSnapshot>,
    pub timestamp: DateTime<Utc>,
}

/// Response-code histogram for one endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusCodeHistogram {
    #[serde(rename = "200")]
    pub ok: u64,
    #[serde(rename = "400")]
    pub bad_request: u64,
    #[serde(rename = "500")]
    pub server_error: u64,
    #[serde(rename = "503")]
    pub unavailable: u64,
}

/// Per-endpoint gateway metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSnapshot {
    pub path: String,
    pub requests: u64,
    pub success_rate: f64,
    pub error_rate: f64,
    pub latency_p50_ms: f64,
    pub latency_p95_ms: f64,
    pub latency_p99_ms: f64,
    pub throughput_rps: f64,
    pub status_codes: StatusCodeHistogram,
}

/// Gateway-wide traffic summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySummary {
    pub total_requests: u64,
    pub total_errors: u64,
    pub overall_success_rate: f64,
    pub avg_latency_ms: f64,
    pub time_window: String,
}

/// Full API gateway payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMetrics {
    pub summary: GatewaySummary,
    pub endpoints: Vec<EndpointSnapshot>,
    pub timestamp: DateTime<Utc>,
}

/// Log line severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogSeverity {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogSeverity::Info => write!(f, "INFO"),
            LogSeverity::Warn => write!(f, "WARN"),
            LogSeverity::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(LogSeverity::Info),
            "WARN" | "WARNING" => Ok(LogSeverity::Warn),
            "ERROR" => Ok(LogSeverity::Error),
            other => Err(format!("unknown log severity: {other}")),
        }
    }
}

/// A single synthetic log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: LogSeverity,
    pub pod: String,
    pub message: String,
}

/// Log query result with anomaly classification
///
/// Counts and the anomaly flag cover the full generated batch; `logs`
/// holds only the severity-filtered tail (at most 50 entries).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogReport {
    pub pod: String,
    pub total_lines: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub anomaly_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly_description: Option<String>,
    pub logs: Vec<LogEntry>,
}

/// Container listed in a pod detail record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub ready: bool,
}

/// Recent event attached to a pod detail record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reason: String,
    pub message: String,
}

/// Point-in-time detail record for one pod, used by incident enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodDetails {
    pub name: String,
    pub namespace: String,
    pub status: PodStatus,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub restart_count: u32,
    pub containers: Vec<ContainerSpec>,
    pub events: Vec<PodEvent>,
}
