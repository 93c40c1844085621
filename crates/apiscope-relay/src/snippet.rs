//! Code-snippet fetching

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use apiscope_core::{Endpoint, ExploreError, Language};

use crate::transport::{Relay, SNIPPET_ROUTE};

#[derive(Debug, Deserialize)]
struct SnippetReply {
    #[serde(alias = "code")]
    snippet: String,
}

/// Asks the relay to render one endpoint in one language.
#[derive(Debug, Clone)]
pub struct SnippetClient<R> {
    relay: R,
}

impl<R: Relay> SnippetClient<R> {
    pub fn new(relay: R) -> Self {
        Self { relay }
    }

    /// # Errors
    ///
    /// `Network` when the relay is unreachable; `Backend` for a non-2xx
    /// status or a reply without snippet text.
    pub async fn fetch(
        &self,
        endpoint: &Endpoint,
        base_url: &str,
        language: Language,
    ) -> Result<String, ExploreError> {
        let payload = json!({
            "endpoint": endpoint,
            "base_url": base_url,
            "language": language.as_str(),
        });
        debug!(endpoint = %endpoint.label(), %language, "fetching snippet");

        let reply = self.relay.post(SNIPPET_ROUTE, &payload).await?;
        if !reply.is_success() {
            return Err(ExploreError::backend(
                reply.status,
                &reply.body,
                "Snippet generation failed",
            ));
        }

        serde_json::from_value::<SnippetReply>(reply.body)
            .map(|r| r.snippet)
            .map_err(|e| ExploreError::Backend {
                status: reply.status,
                message: format!("Malformed snippet response: {e}"),
            })
    }
}
