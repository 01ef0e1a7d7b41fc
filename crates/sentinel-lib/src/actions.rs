//! Remediation actions: runbook execution and bottleneck detection
//!
//! Runbook execution sits behind a trait so a real executor can replace
//! the simulated one without touching callers.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::history::MetricsHistory;

/// Runbooks the simulated executor recognizes
pub const KNOWN_RUNBOOKS: [&str; 3] = ["restart-pod", "scale-deployment", "clear-cache"];

/// p95 latency cutoff for a bottleneck finding, in milliseconds
const BOTTLENECK_P95_CUTOFF_MS: f64 = 1000.0;

/// Record of one runbook execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookExecution {
    pub runbook_id: String,
    pub status: String,
    pub parameters: serde_json::Value,
    pub executed_at: DateTime<Utc>,
    pub result: String,
}

/// Executes named remediation runbooks
#[async_trait]
pub trait RunbookExecutor: Send + Sync {
    /// Run a runbook with caller-supplied parameters
    ///
    /// Parameters are echoed back unchanged in the execution record.
    async fn execute(&self, runbook_id: &str, parameters: serde_json::Value)
        -> Result<RunbookExecution>;
}

/// Simulated executor: known runbooks always succeed, nothing is touched
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedRunbookExecutor;

#[async_trait]
impl RunbookExecutor for SimulatedRunbookExecutor {
    async fn execute(
        &self,
        runbook_id: &str,
        parameters: serde_json::Value,
    ) -> Result<RunbookExecution> {
        if !KNOWN_RUNBOOKS.contains(&runbook_id) {
            anyhow::bail!("Unknown runbook: {runbook_id}");
        }

        info!(runbook_id = %runbook_id, "Executing runbook (simulated)");

        Ok(RunbookExecution {
            runbook_id: runbook_id.to_string(),
            status: "completed".to_string(),
            parameters,
            executed_at: Utc::now(),
            result: "Runbook executed successfully (simulated)".to_string(),
        })
    }
}

/// Severity threshold requested for bottleneck detection
///
/// Parsed and echoed, but the cutoff is the fixed 1000 ms p95 regardless;
/// the variants are reserved for differentiated cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BottleneckThreshold {
    Low,
    #[default]
    Medium,
    High,
}

impl std::str::FromStr for BottleneckThreshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(BottleneckThreshold::Low),
            "medium" => Ok(BottleneckThreshold::Medium),
            "high" => Ok(BottleneckThreshold::High),
            other => Err(format!("unknown threshold: {other}")),
        }
    }
}

/// One detected bottleneck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleneckFinding {
    #[serde(rename = "type")]
    pub finding_type: String,
    pub resource: String,
    pub severity: String,
    pub message: String,
}

/// Bottleneck scan result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleneckReport {
    pub threshold: BottleneckThreshold,
    pub findings: Vec<BottleneckFinding>,
    pub summary: String,
}

/// Scan the most recent gateway snapshot for slow endpoints
pub fn detect_bottlenecks(
    history: &MetricsHistory,
    threshold: BottleneckThreshold,
) -> BottleneckReport {
    let mut findings = Vec::new();

    if let Some(gateway) = history.latest_gateway() {
        for endpoint in &gateway.endpoints {
            if endpoint.latency_p95_ms > BOTTLENECK_P95_CUTOFF_MS {
                findings.push(BottleneckFinding {
                    finding_type: "api_latency".to_string(),
                    resource: endpoint.path.clone(),
                    severity: "high".to_string(),
                    message: format!("High p95 latency: {}ms", endpoint.latency_p95_ms),
                });
            }
        }
    }

    let summary = format!("Detected {} bottlenecks", findings.len());
    BottleneckReport {
        threshold,
        findings,
        summary,
    }
}
