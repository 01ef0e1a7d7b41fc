//! Platform Sentinel CLI
//!
//! A command-line client for the sentinel agent's tool surface:
//! telemetry queries, alert listing, incident analysis, and runbooks.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{incident, telemetry};

/// Platform Sentinel CLI
#[derive(Parser)]
#[command(name = "sentinelctl")]
#[command(author, version, about = "CLI for the Platform Sentinel", long_about = None)]
pub struct Cli {
    /// Agent URL (can also be set via SENTINEL_API_URL env var)
    #[arg(long, env = "SENTINEL_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show cluster status and pod metrics
    Cluster {
        /// Namespace to query
        #[arg(long, short, default_value = "all")]
        namespace: String,
    },

    /// Show API gateway metrics
    Gateway {
        /// Time window for metrics (1m, 5m, 15m, 1h)
        #[arg(long, short, default_value = "5m")]
        window: String,
    },

    /// Fetch pod logs with anomaly detection
    Logs {
        /// Pod name (or "all" for an aggregated stream)
        pod_name: String,

        /// Number of log lines to generate
        #[arg(long, default_value_t = 100)]
        lines: usize,

        /// Filter by severity (ERROR, WARN, INFO, all)
        #[arg(long, default_value = "all")]
        severity: String,
    },

    /// List active alerts
    Alerts {
        /// Filter by severity (critical, warning, info, all)
        #[arg(long, short, default_value = "all")]
        severity: String,
    },

    /// Run incident analysis for an alert
    Analyze {
        /// Alert id to analyze
        alert_id: String,

        /// Skip remediation recommendations
        #[arg(long)]
        no_recommendations: bool,
    },

    /// Execute a remediation runbook
    Runbook {
        /// Runbook id (restart-pod, scale-deployment, clear-cache)
        runbook_id: String,

        /// Runbook parameters as key=value pairs
        #[arg(long = "param", short = 'p')]
        params: Vec<String>,
    },

    /// Detect performance bottlenecks from recent gateway history
    Bottlenecks {
        /// Severity threshold (low, medium, high)
        #[arg(long, default_value = "medium")]
        threshold: String,
    },

    /// List the tools the agent exposes
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = client::ApiClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Cluster { namespace } => {
            telemetry::cluster(&client, &namespace, cli.format).await?;
        }
        Commands::Gateway { window } => {
            telemetry::gateway(&client, &window, cli.format).await?;
        }
        Commands::Logs {
            pod_name,
            lines,
            severity,
        } => {
            telemetry::logs(&client, &pod_name, lines, &severity, cli.format).await?;
        }
        Commands::Alerts { severity } => {
            telemetry::alerts(&client, &severity, cli.format).await?;
        }
        Commands::Analyze {
            alert_id,
            no_recommendations,
        } => {
            incident::analyze(&client, &alert_id, !no_recommendations, cli.format).await?;
        }
        Commands::Runbook { runbook_id, params } => {
            incident::runbook(&client, &runbook_id, &params, cli.format).await?;
        }
        Commands::Bottlenecks { threshold } => {
            incident::bottlenecks(&client, &threshold, cli.format).await?;
        }
        Commands::Tools => {
            incident::tools(&client, cli.format).await?;
        }
    }

    Ok(())
}
