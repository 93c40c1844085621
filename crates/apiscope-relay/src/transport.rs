//! Relay transport: JSON-over-HTTP calls to the backend relay

use std::future::Future;

use tracing::debug;

use apiscope_core::ExploreError;

/// Executes a request against the target API and measures latency.
pub const EXECUTE_ROUTE: &str = "/api/health-check";
/// Renders a code snippet for one endpoint and language.
pub const SNIPPET_ROUTE: &str = "/api/generate-snippet";
/// Turns a documentation URL into an `ApiSchema`.
pub const PARSE_ROUTE: &str = "/api/parse";

/// Raw relay answer: status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply {
    pub status: u16,
    /// Parsed JSON; a non-JSON body becomes a JSON string, an empty one `null`
    pub body: serde_json::Value,
}

impl RelayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One POST with a JSON payload to a relay route.
///
/// Implementations make exactly one attempt: no retries, no timeout.
pub trait Relay: Clone + Send + Sync {
    fn post(
        &self,
        route: &str,
        payload: &serde_json::Value,
    ) -> impl Future<Output = Result<RelayReply, ExploreError>> + Send;
}

/// reqwest-backed relay client.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRelay {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self, ExploreError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ExploreError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }
}

impl Relay for HttpRelay {
    fn post(
        &self,
        route: &str,
        payload: &serde_json::Value,
    ) -> impl Future<Output = Result<RelayReply, ExploreError>> + Send {
        let url = self.url(route);
        let request = self.client.post(&url).json(payload);
        async move {
            debug!(%url, "relay call");
            let response = request
                .send()
                .await
                .map_err(|e| ExploreError::Network(e.to_string()))?;
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|e| ExploreError::Network(e.to_string()))?;
            debug!(%url, status, bytes = text.len(), "relay reply");
            Ok(RelayReply {
                status,
                body: decode_body(&text),
            })
        }
    }
}

fn decode_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}
