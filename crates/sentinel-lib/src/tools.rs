//! Stable tool surface over the core components
//!
//! Tool names and defaulted argument shapes are the external contract;
//! transports (HTTP handler, CLI) stay thin by dispatching through this
//! registry. Failures never escape as faults: every error is folded into
//! the uniform `{"error": "..."}` shape.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::actions::{detect_bottlenecks, BottleneckThreshold, RunbookExecutor};
use crate::alerts::{Alert, AlertSeverity, AlertStore};
use crate::history::MetricsHistory;
use crate::incident::IncidentPipeline;
use crate::models::LogSeverity;
use crate::telemetry::TelemetryGenerator;

/// Default log lines fetched by get_pod_logs
const DEFAULT_LOG_LINES: usize = 100;

/// Tool name and description, as advertised to callers
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Structured tool-level failure
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: String,
    },
    #[error("Alert {0} not found")]
    AlertNotFound(String),
    #[error("{0}")]
    Execution(String),
}

/// Dispatches tool calls by name over the shared components
pub struct ToolRegistry {
    telemetry: Arc<TelemetryGenerator>,
    alerts: Arc<AlertStore>,
    pipeline: Arc<IncidentPipeline>,
    executor: Arc<dyn RunbookExecutor>,
    history: Arc<MetricsHistory>,
}

impl ToolRegistry {
    pub fn new(
        telemetry: Arc<TelemetryGenerator>,
        alerts: Arc<AlertStore>,
        pipeline: Arc<IncidentPipeline>,
        executor: Arc<dyn RunbookExecutor>,
        history: Arc<MetricsHistory>,
    ) -> Self {
        Self {
            telemetry,
            alerts,
            pipeline,
            executor,
            history,
        }
    }

    /// The advertised tool surface
    pub fn list(&self) -> Vec<ToolSpec> {
        vec![
            ToolSpec {
                name: "get_k8s_cluster_status",
                description: "Cluster metrics: pod status, CPU, memory, node health",
            },
            ToolSpec {
                name: "get_api_gateway_metrics",
                description: "Gateway traffic, latency percentiles, and error rates",
            },
            ToolSpec {
                name: "get_pod_logs",
                description: "Pod logs with anomaly detection",
            },
            ToolSpec {
                name: "get_active_alerts",
                description: "Active alerts across the platform",
            },
            ToolSpec {
                name: "analyze_incident",
                description: "Root cause analysis for an alert",
            },
            ToolSpec {
                name: "execute_runbook",
                description: "Run an automated remediation runbook",
            },
            ToolSpec {
                name: "get_performance_bottlenecks",
                description: "Slow endpoints from recent gateway history",
            },
        ]
    }

    /// Invoke a tool, folding any failure into the uniform error shape
    pub async fn call(&self, name: &str, args: &Value) -> Value {
        match self.dispatch(name, args).await {
            Ok(value) => value,
            Err(err) => json!({ "error": err.to_string() }),
        }
    }

    async fn dispatch(&self, name: &str, args: &Value) -> Result<Value, ToolError> {
        match name {
            "get_k8s_cluster_status" => {
                let namespace = str_arg(args, "namespace").unwrap_or("all");
                let status = self.telemetry.cluster_status(namespace);
                self.history.record_cluster(status.clone());
                to_json(&status)
            }
            "get_api_gateway_metrics" => {
                let window = str_arg(args, "time_window").unwrap_or("5m");
                let metrics = self.telemetry.gateway_metrics(window);
                self.history.record_gateway(metrics.clone());
                to_json(&metrics)
            }
            "get_pod_logs" => {
                let pod_name =
                    str_arg(args, "pod_name").ok_or(ToolError::MissingArgument("pod_name"))?;
                let lines = args
                    .get("lines")
                    .and_then(Value::as_u64)
                    .map_or(DEFAULT_LOG_LINES, |n| n as usize);
                let severity = parse_filter::<LogSeverity>(args, "severity")?;

                to_json(&self.telemetry.pod_logs(pod_name, lines, severity))
            }
            "get_active_alerts" => {
                let severity = parse_filter::<AlertSeverity>(args, "severity")?;
                let summary = self.alerts.list(severity);
                self.history.record_alert_count(summary.total_alerts);
                to_json(&summary)
            }
            "analyze_incident" => {
                let include_recommendations = args
                    .get("include_recommendations")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                let alert = self.resolve_alert(args)?;

                to_json(&self.pipeline.analyze(alert, include_recommendations).await)
            }
            "execute_runbook" => {
                let runbook_id =
                    str_arg(args, "runbook_id").ok_or(ToolError::MissingArgument("runbook_id"))?;
                let parameters = args.get("parameters").cloned().unwrap_or_else(|| json!({}));

                let record = self
                    .executor
                    .execute(runbook_id, parameters)
                    .await
                    .map_err(|err| ToolError::Execution(err.to_string()))?;
                to_json(&record)
            }
            "get_performance_bottlenecks" => {
                let threshold = match str_arg(args, "threshold") {
                    None => BottleneckThreshold::default(),
                    Some(raw) => raw.parse().map_err(|reason| ToolError::InvalidArgument {
                        name: "threshold",
                        reason,
                    })?,
                };

                to_json(&detect_bottlenecks(&self.history, threshold))
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    /// Accept either a full alert payload or an id to look up
    fn resolve_alert(&self, args: &Value) -> Result<Alert, ToolError> {
        if let Some(raw) = args.get("alert") {
            return serde_json::from_value(raw.clone()).map_err(|err| {
                ToolError::InvalidArgument {
                    name: "alert",
                    reason: err.to_string(),
                }
            });
        }

        let id = str_arg(args, "alert_id").ok_or(ToolError::MissingArgument("alert"))?;
        self.alerts
            .get(id)
            .ok_or_else(|| ToolError::AlertNotFound(id.to_string()))
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// Parse an optional severity-style filter where "all" means no filter
fn parse_filter<T: std::str::FromStr<Err = String>>(
    args: &Value,
    key: &'static str,
) -> Result<Option<T>, ToolError> {
    match str_arg(args, key) {
        None | Some("all") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|reason| ToolError::InvalidArgument { name: key, reason }),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|err| ToolError::Execution(err.to_string()))
}
