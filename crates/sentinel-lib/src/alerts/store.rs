//! Process-wide active alert set
//!
//! Handles:
//! - Insert-if-absent keyed by resource name
//! - Lazy expiry against wall-clock time at query time
//! - Severity-filtered listing with summary counts

use std::sync::RwLock;
use std::time::Duration;

use chrono::Utc;

use super::{Alert, AlertSeverity, AlertSummary};

/// Default retention window (5 minutes)
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(5 * 60);

/// Shared store of active alerts, deduplicated by resource
///
/// Every mutation and the evict-then-filter read sequence run under a
/// single lock, so concurrent pollers cannot race duplicate inserts for
/// the same resource or observe counts inconsistent with the returned
/// list.
pub struct AlertStore {
    retention: Duration,
    alerts: RwLock<Vec<Alert>>,
}

impl AlertStore {
    /// Create a store with the default 5-minute retention window
    pub fn new() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            alerts: RwLock::new(Vec::new()),
        }
    }

    /// Set a custom retention window
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Insert the alert unless an active alert for its resource exists
    ///
    /// Returns true if the alert was recorded, false if it was suppressed
    /// by the dedup rule. Expired entries do not suppress: they are
    /// evicted before the lookup.
    pub fn record(&self, alert: Alert) -> bool {
        let mut alerts = self.alerts.write().unwrap();
        Self::evict_expired(&mut alerts, self.retention);

        if alerts.iter().any(|a| a.resource == alert.resource) {
            return false;
        }
        alerts.push(alert);
        true
    }

    /// List active alerts, optionally filtered by severity
    ///
    /// Eviction is lazy: entries older than the retention window are
    /// dropped here, so an expired alert may linger in storage between
    /// queries but is never returned.
    pub fn list(&self, severity: Option<AlertSeverity>) -> AlertSummary {
        let mut alerts = self.alerts.write().unwrap();
        Self::evict_expired(&mut alerts, self.retention);

        let filtered: Vec<Alert> = alerts
            .iter()
            .filter(|a| severity.map_or(true, |s| a.severity == s))
            .cloned()
            .collect();

        summarize(filtered)
    }

    /// Look up an active alert by id
    pub fn get(&self, id: &str) -> Option<Alert> {
        let mut alerts = self.alerts.write().unwrap();
        Self::evict_expired(&mut alerts, self.retention);
        alerts.iter().find(|a| a.id == id).cloned()
    }

    fn evict_expired(alerts: &mut Vec<Alert>, retention: Duration) {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(retention).unwrap_or_else(|_| chrono::Duration::zero());
        alerts.retain(|a| a.timestamp > cutoff);
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(alerts: Vec<Alert>) -> AlertSummary {
    let count = |sev| alerts.iter().filter(|a| a.severity == sev).count();
    AlertSummary {
        total_alerts: alerts.len(),
        critical: count(AlertSeverity::Critical),
        warning: count(AlertSeverity::Warning),
        info: count(AlertSeverity::Info),
        alerts,
        timestamp: Utc::now(),
    }
}
