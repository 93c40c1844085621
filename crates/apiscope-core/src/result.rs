//! Normalized outcome of one relayed request

use serde::{Deserialize, Serialize};

/// What the relay reports back for an executed request.
///
/// Every field is optional on the wire except `is_healthy`, which is treated
/// as `false` when missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseResult {
    /// Downstream HTTP status (absent when the call never completed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Latency measured by the relay, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    /// True for a 2xx downstream status
    #[serde(default)]
    pub is_healthy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseResult {
    /// A result for a call that failed before the relay could report.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// "200", or "Error" when there is no status code.
    pub fn status_label(&self) -> String {
        self.status_code
            .map_or_else(|| "Error".to_string(), |s| s.to_string())
    }

    /// Human-readable rendering: status line, then error text or payload.
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        let health = if self.is_healthy { "OK" } else { "FAIL" };
        let latency = self
            .latency_ms
            .map_or_else(|| "-".to_string(), |ms| format!("{ms}ms"));
        lines.push(format!(
            "[{health}] Status: {}  Time: {latency}",
            self.status_label()
        ));

        if let Some(error) = &self.error {
            lines.push(error.clone());
        } else if let Some(data) = &self.response_data {
            lines.push(pretty(data));
        }

        lines.join("\n")
    }
}

fn pretty(v: &serde_json::Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}
