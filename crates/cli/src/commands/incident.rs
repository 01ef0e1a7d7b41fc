//! Incident response commands: analyze, runbook, bottlenecks, tools

use anyhow::{Context, Result};
use sentinel_lib::actions::{BottleneckReport, RunbookExecution};
use sentinel_lib::incident::IncidentSummary;
use serde_json::{json, Map, Value};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_severity, color_status, format_timestamp, print_json, print_success, print_warning,
    OutputFormat,
};

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Type")]
    finding_type: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Detail")]
    message: String,
}

/// Run the incident pipeline for an alert id
pub async fn analyze(
    client: &ApiClient,
    alert_id: &str,
    include_recommendations: bool,
    format: OutputFormat,
) -> Result<()> {
    let result = client
        .call_tool(
            "analyze_incident",
            &json!({
                "alert_id": alert_id,
                "include_recommendations": include_recommendations,
            }),
        )
        .await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            let summary: IncidentSummary = serde_json::from_value(result)?;

            println!(
                "Alert {} [{}] {} on {}",
                summary.alert_id,
                color_severity(&summary.severity.to_string()),
                summary.alert_type,
                summary.resource,
            );
            if let Some(anomaly) = &summary.anomaly {
                print_warning(anomaly);
            }

            if let Some(root_cause) = &summary.root_cause {
                println!("\nRoot cause: {}", root_cause.summary);
                for evidence in &root_cause.evidence {
                    println!("  - {evidence}");
                }
            }

            if !summary.recommendations.is_empty() {
                println!("\nRecommended actions:");
                for (i, step) in summary.recommendations.iter().enumerate() {
                    println!("  {}. {step}", i + 1);
                }
            }

            if let Some(error) = &summary.error {
                print_warning(&format!("Partial analysis: {error}"));
            }
            Ok(())
        }
    }
}

/// Execute a remediation runbook
pub async fn runbook(
    client: &ApiClient,
    runbook_id: &str,
    params: &[String],
    format: OutputFormat,
) -> Result<()> {
    let parameters = parse_params(params)?;
    let result = client
        .call_tool(
            "execute_runbook",
            &json!({ "runbook_id": runbook_id, "parameters": parameters }),
        )
        .await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            let record: RunbookExecution = serde_json::from_value(result)?;

            print_success(&format!(
                "Runbook {} {}",
                record.runbook_id,
                color_status(&record.status)
            ));
            println!("Executed at: {}", format_timestamp(&record.executed_at.to_rfc3339()));
            println!("Result: {}", record.result);
            Ok(())
        }
    }
}

/// Scan recent gateway history for bottlenecks
pub async fn bottlenecks(client: &ApiClient, threshold: &str, format: OutputFormat) -> Result<()> {
    let result = client
        .call_tool(
            "get_performance_bottlenecks",
            &json!({ "threshold": threshold }),
        )
        .await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            let report: BottleneckReport = serde_json::from_value(result)?;

            if report.findings.is_empty() {
                print_success(&report.summary);
                return Ok(());
            }

            let rows: Vec<FindingRow> = report
                .findings
                .iter()
                .map(|f| FindingRow {
                    finding_type: f.finding_type.clone(),
                    resource: f.resource.clone(),
                    severity: color_severity(&f.severity),
                    message: f.message.clone(),
                })
                .collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{table}");
            println!("\n{}", report.summary);
            Ok(())
        }
    }
}

/// List the tool surface advertised by the agent
pub async fn tools(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let tools = client.list_tools().await?;

    match format {
        OutputFormat::Json => {
            let names: Vec<_> = tools
                .iter()
                .map(|t| json!({ "name": t.name, "description": t.description }))
                .collect();
            print_json(&names)
        }
        OutputFormat::Table => {
            for tool in tools {
                println!("{:30} {}", tool.name, tool.description);
            }
            Ok(())
        }
    }
}

/// Parse `key=value` runbook parameters into a JSON object
fn parse_params(params: &[String]) -> Result<Value> {
    let mut map = Map::new();
    for param in params {
        let (key, value) = param
            .split_once('=')
            .with_context(|| format!("Invalid parameter '{param}', expected key=value"))?;
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(Value::Object(map))
}
