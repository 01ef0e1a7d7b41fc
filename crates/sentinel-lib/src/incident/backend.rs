//! Backend-assisted diagnosis over an OpenAI-style chat completion API
//!
//! Requests carry a bounded timeout; callers treat every failure here as
//! a cue to fall back to the deterministic engine, so nothing in this
//! module is allowed to stall or crash a pipeline run.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::diagnosis::{parse_recommendations, DiagnosisEngine};
use super::RootCause;
use crate::alerts::Alert;
use crate::models::{LogReport, PodDetails};

/// Connection settings for the diagnosis backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Diagnosis engine backed by a chat completion model
pub struct BackendEngine {
    client: reqwest::Client,
    config: BackendConfig,
}

impl BackendEngine {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create backend HTTP client")?;

        Ok(Self { client, config })
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach diagnosis backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend error ({status}): {body}");
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse backend response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("Backend returned no choices")
    }
}

#[async_trait]
impl DiagnosisEngine for BackendEngine {
    async fn diagnose(
        &self,
        alert: &Alert,
        pod: Option<&PodDetails>,
        logs: Option<&LogReport>,
    ) -> Result<RootCause> {
        let alert_json = serde_json::to_string(alert).unwrap_or_default();
        let pod_json = pod
            .and_then(|p| serde_json::to_string(p).ok())
            .unwrap_or_else(|| "{}".to_string());

        let prompt = format!(
            "You are a site reliability engineer. Analyze the alert and logs to find root cause.\n\
             Alert: {alert_json}\n\
             Pod details: {pod_json}\n\
             Log summary: errors={} warnings={}\n\
             Provide a concise root cause summary and evidence list.",
            logs.map_or(0, |l| l.error_count),
            logs.map_or(0, |l| l.warning_count),
        );

        let text = self.complete(&prompt).await?;

        Ok(RootCause {
            summary: text.trim().to_string(),
            evidence: vec!["AI analysis based on alert and logs".to_string()],
        })
    }

    async fn recommend(&self, root_cause: &RootCause) -> Result<Vec<String>> {
        let prompt = format!(
            "Provide 3 remediation steps for this incident.\n\
             Root cause: {}\n\
             Return a bullet list.",
            root_cause.summary,
        );

        let text = self.complete(&prompt).await?;
        Ok(parse_recommendations(&text))
    }
}
