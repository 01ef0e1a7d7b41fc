//! Telemetry query commands: cluster, gateway, logs, alerts

use anyhow::Result;
use sentinel_lib::models::{ClusterStatus, GatewayMetrics, LogReport};
use sentinel_lib::AlertSummary;
use serde_json::json;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_severity, color_status, format_latency, format_percent, format_timestamp, print_json,
    print_warning, OutputFormat,
};

#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "Pod")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Restarts")]
    restarts: u32,
    #[tabled(rename = "Age")]
    age: String,
}

#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Requests")]
    requests: u64,
    #[tabled(rename = "Errors")]
    error_rate: String,
    #[tabled(rename = "p50")]
    p50: String,
    #[tabled(rename = "p95")]
    p95: String,
    #[tabled(rename = "p99")]
    p99: String,
}

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    alert_type: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Since")]
    since: String,
}

/// Show cluster status
pub async fn cluster(client: &ApiClient, namespace: &str, format: OutputFormat) -> Result<()> {
    let result = client
        .call_tool("get_k8s_cluster_status", &json!({ "namespace": namespace }))
        .await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            let status: ClusterStatus = serde_json::from_value(result)?;

            println!(
                "Cluster health: {} ({}/{} pods running, {} failed)",
                format_percent(status.cluster.health_score),
                status.cluster.running_pods,
                status.cluster.total_pods,
                status.cluster.failed_pods,
            );
            println!(
                "Average usage: cpu {} / memory {}\n",
                format_percent(status.cluster.avg_cpu_usage),
                format_percent(status.cluster.avg_memory_usage),
            );

            let rows: Vec<PodRow> = status
                .pods
                .iter()
                .map(|p| PodRow {
                    name: p.name.clone(),
                    namespace: p.namespace.clone(),
                    status: color_status(&p.status.to_string()),
                    cpu: format_percent(p.cpu_usage_percent),
                    memory: format_percent(p.memory_usage_percent),
                    restarts: p.restart_count,
                    age: p.age.clone(),
                })
                .collect();
            print_table(rows);
            Ok(())
        }
    }
}

/// Show gateway metrics
pub async fn gateway(client: &ApiClient, window: &str, format: OutputFormat) -> Result<()> {
    let result = client
        .call_tool("get_api_gateway_metrics", &json!({ "time_window": window }))
        .await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            let metrics: GatewayMetrics = serde_json::from_value(result)?;

            println!(
                "Window {}: {} requests, {} errors (success {})\n",
                metrics.summary.time_window,
                metrics.summary.total_requests,
                metrics.summary.total_errors,
                format_percent(metrics.summary.overall_success_rate),
            );

            let rows: Vec<EndpointRow> = metrics
                .endpoints
                .iter()
                .map(|e| EndpointRow {
                    path: e.path.clone(),
                    requests: e.requests,
                    error_rate: format_percent(e.error_rate),
                    p50: format_latency(e.latency_p50_ms),
                    p95: format_latency(e.latency_p95_ms),
                    p99: format_latency(e.latency_p99_ms),
                })
                .collect();
            print_table(rows);
            Ok(())
        }
    }
}

/// Show pod logs
pub async fn logs(
    client: &ApiClient,
    pod_name: &str,
    lines: usize,
    severity: &str,
    format: OutputFormat,
) -> Result<()> {
    let result = client
        .call_tool(
            "get_pod_logs",
            &json!({ "pod_name": pod_name, "lines": lines, "severity": severity }),
        )
        .await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            let report: LogReport = serde_json::from_value(result)?;

            println!(
                "{}: {} lines ({} errors, {} warnings)",
                report.pod, report.total_lines, report.error_count, report.warning_count,
            );
            if let Some(anomaly) = &report.anomaly_description {
                print_warning(anomaly);
            }
            println!();

            for entry in &report.logs {
                println!(
                    "{} {:5} {} {}",
                    entry.timestamp.format("%H:%M:%S"),
                    color_severity(&entry.severity.to_string()),
                    entry.pod,
                    entry.message,
                );
            }
            Ok(())
        }
    }
}

/// Show active alerts
pub async fn alerts(client: &ApiClient, severity: &str, format: OutputFormat) -> Result<()> {
    let result = client
        .call_tool("get_active_alerts", &json!({ "severity": severity }))
        .await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            let summary: AlertSummary = serde_json::from_value(result)?;

            if summary.alerts.is_empty() {
                print_warning("No active alerts");
                return Ok(());
            }

            let rows: Vec<AlertRow> = summary
                .alerts
                .iter()
                .map(|a| AlertRow {
                    id: a.id.clone(),
                    alert_type: a.alert_type.to_string(),
                    severity: color_severity(&a.severity.to_string()),
                    resource: a.resource.clone(),
                    since: format_timestamp(&a.timestamp.to_rfc3339()),
                })
                .collect();
            print_table(rows);

            println!(
                "\nTotal: {} ({} critical, {} warning, {} info)",
                summary.total_alerts, summary.critical, summary.warning, summary.info,
            );
            Ok(())
        }
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{table}");
}
