//! HTTP client for the sentinel tool surface

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Client for the sentinel agent's /tools endpoints
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

/// Tool listing entry as advertised by the agent
#[derive(Debug, Clone, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// List the advertised tools
    pub async fn list_tools(&self) -> Result<Vec<ToolInfo>> {
        let url = self.base_url.join("tools").context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to reach sentinel agent")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Agent error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse tool list")
    }

    /// Invoke a tool by name
    ///
    /// The agent folds tool failures into a bare `{"error": ...}` value;
    /// that shape is surfaced as a client-side error so commands exit
    /// non-zero. Payloads that carry an `error` field next to other state
    /// (a partial incident analysis) are returned as results.
    pub async fn call_tool(&self, name: &str, args: &Value) -> Result<Value> {
        let url = self
            .base_url
            .join(&format!("tools/{name}"))
            .context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(args)
            .send()
            .await
            .context("Failed to reach sentinel agent")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Agent error ({}): {}", status, body);
        }

        let result: Value = response.json().await.context("Failed to parse response")?;
        if let Some(object) = result.as_object() {
            if object.len() == 1 {
                if let Some(error) = object.get("error").and_then(Value::as_str) {
                    anyhow::bail!("{error}");
                }
            }
        }

        Ok(result)
    }
}
