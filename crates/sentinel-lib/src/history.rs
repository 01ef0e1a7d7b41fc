//! Bounded in-memory history of telemetry snapshots
//!
//! The server keeps the last 100 entries per category for trend analysis;
//! the bottleneck detector reads the most recent gateway entry. Append
//! and trim happen under one write lock so the bound holds with
//! concurrent writers.

use std::collections::VecDeque;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ClusterStatus, GatewayMetrics};

/// Maximum retained entries per category
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// A snapshot with the time it was collected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timestamped<T> {
    pub timestamp: DateTime<Utc>,
    pub data: T,
}

impl<T> Timestamped<T> {
    fn now(data: T) -> Self {
        Self {
            timestamp: Utc::now(),
            data,
        }
    }
}

/// Append-only ring of recent snapshots per telemetry category
#[derive(Default)]
pub struct MetricsHistory {
    cluster: RwLock<VecDeque<Timestamped<ClusterStatus>>>,
    gateway: RwLock<VecDeque<Timestamped<GatewayMetrics>>>,
    alert_counts: RwLock<VecDeque<Timestamped<usize>>>,
}

impl MetricsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cluster(&self, status: ClusterStatus) {
        push_trim(&self.cluster, Timestamped::now(status));
    }

    pub fn record_gateway(&self, metrics: GatewayMetrics) {
        push_trim(&self.gateway, Timestamped::now(metrics));
    }

    pub fn record_alert_count(&self, count: usize) {
        push_trim(&self.alert_counts, Timestamped::now(count));
    }

    /// Most recent gateway snapshot, if any was collected
    pub fn latest_gateway(&self) -> Option<GatewayMetrics> {
        self.gateway
            .read()
            .unwrap()
            .back()
            .map(|entry| entry.data.clone())
    }

    pub fn cluster_len(&self) -> usize {
        self.cluster.read().unwrap().len()
    }

    pub fn gateway_len(&self) -> usize {
        self.gateway.read().unwrap().len()
    }

    pub fn alert_count_len(&self) -> usize {
        self.alert_counts.read().unwrap().len()
    }
}

fn push_trim<T>(ring: &RwLock<VecDeque<Timestamped<T>>>, entry: Timestamped<T>) {
    let mut ring = ring.write().unwrap();
    ring.push_back(entry);
    while ring.len() > MAX_HISTORY_ENTRIES {
        ring.pop_front();
    }
}
