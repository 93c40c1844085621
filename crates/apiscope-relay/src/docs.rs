//! Documentation-URL parsing through the relay

use serde_json::json;
use tracing::info;

use apiscope_core::{ApiSchema, ExploreError};

use crate::transport::{PARSE_ROUTE, Relay};

/// Turns a documentation page URL into an [`ApiSchema`].
#[derive(Debug, Clone)]
pub struct DocsClient<R> {
    relay: R,
}

impl<R: Relay> DocsClient<R> {
    pub fn new(relay: R) -> Self {
        Self { relay }
    }

    /// # Errors
    ///
    /// `Network` when the relay is unreachable; `Backend` when parsing fails
    /// or the reply is not a schema.
    pub async fn parse(&self, url: &str) -> Result<ApiSchema, ExploreError> {
        let reply = self.relay.post(PARSE_ROUTE, &json!({"url": url})).await?;
        if !reply.is_success() {
            return Err(ExploreError::backend(
                reply.status,
                &reply.body,
                "Failed to parse documentation",
            ));
        }

        let schema: ApiSchema =
            serde_json::from_value(reply.body).map_err(|e| ExploreError::Backend {
                status: reply.status,
                message: format!("Malformed schema: {e}"),
            })?;
        info!(%url, title = %schema.title, endpoints = schema.endpoints.len(), "documentation parsed");
        Ok(schema)
    }
}
