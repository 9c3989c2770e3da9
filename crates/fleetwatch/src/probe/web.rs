use std::time::Duration;

use anyhow::{Result, anyhow};
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use super::types::ProbeResult;
use crate::registry::DeviceTarget;

/// Best-effort probe of a printer's embedded status page.
///
/// The result is auxiliary telemetry: it is reported alongside the connection
/// probe but never feeds verdicts or recommendations.
pub struct WebStatusProbe {
    client: reqwest::Client,
    timeout_duration: Duration,
}

impl WebStatusProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(timeout_duration: Duration) -> Self {
        // devices live on the local network, never route them through a proxy
        let client = reqwest::Client::builder().no_proxy().build().unwrap_or_default();
        Self { client, timeout_duration }
    }

    /// `None` when the target has no status port configured
    pub async fn status(&self, target: &DeviceTarget) -> Option<ProbeResult> {
        let port = target.aux_port?;
        let url = format!("http://{}:{}/api/status", target.host, port);
        let start = Instant::now();

        let result = match self.fetch(&url).await {
            Ok(body) => ProbeResult::success("Status page reachable").with_details(body),
            Err(e) => {
                debug!(device = %target.id, url = %url, error = %e, "Web status unavailable");
                ProbeResult::failure(e.to_string())
            }
        };

        Some(result.with_elapsed(start.elapsed()))
    }

    async fn fetch(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout_duration)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP status check failed with status code: {}", status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}
