//! Alerting for the simulated platform
//!
//! Alerts are raised by the telemetry generator when a threshold rule
//! fires, deduplicated by resource name, and expired after a fixed
//! retention window.

mod store;

pub use store::{AlertStore, DEFAULT_RETENTION};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Critical => write!(f, "critical"),
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(AlertSeverity::Critical),
            "warning" => Ok(AlertSeverity::Warning),
            "info" => Ok(AlertSeverity::Info),
            other => Err(format!("unknown alert severity: {other}")),
        }
    }
}

/// Alert type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    CrashLoop,
    HighResourceUsage,
    HighLatency,
    HighErrorRate,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertType::CrashLoop => write!(f, "CrashLoop"),
            AlertType::HighResourceUsage => write!(f, "HighResourceUsage"),
            AlertType::HighLatency => write!(f, "HighLatency"),
            AlertType::HighErrorRate => write!(f, "HighErrorRate"),
        }
    }
}

/// A detected anomaly tied to one resource
///
/// Immutable after creation; the store drops it once it ages past the
/// retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub resource: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

impl Alert {
    /// Create a firing alert with a fresh short id
    pub fn new(
        alert_type: AlertType,
        severity: AlertSeverity,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: short_id(),
            alert_type,
            severity,
            resource: resource.into(),
            message: message.into(),
            timestamp: Utc::now(),
            status: "firing".to_string(),
        }
    }
}

/// Active alert listing with severity counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total_alerts: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub alerts: Vec<Alert>,
    pub timestamp: DateTime<Utc>,
}

/// First 8 hex chars of a v4 UUID, matching the id format alerts carry
/// on the wire
fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_length() {
        let id = short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_alert_starts_firing() {
        let alert = Alert::new(
            AlertType::CrashLoop,
            AlertSeverity::Critical,
            "pod-x",
            "CrashLoop detected on pod-x",
        );
        assert_eq!(alert.status, "firing");
        assert_eq!(alert.resource, "pod-x");
    }

    #[test]
    fn test_severity_round_trip() {
        for s in ["critical", "warning", "info"] {
            let sev: AlertSeverity = s.parse().unwrap();
            assert_eq!(sev.to_string(), s);
        }
        assert!("fatal".parse::<AlertSeverity>().is_err());
    }

    #[test]
    fn test_alert_type_serializes_as_pascal_case() {
        let json = serde_json::to_string(&AlertType::HighResourceUsage).unwrap();
        assert_eq!(json, "\"HighResourceUsage\"");
    }
}
