//! Request execution through the relay

use serde_json::json;
use tracing::{debug, warn};

use apiscope_core::{
    Endpoint, ExploreError, RequestDescriptor, RequestInput, ResponseResult, build_request,
};

use crate::transport::{EXECUTE_ROUTE, Relay};

/// Sends request descriptors to the relay's execute route.
#[derive(Debug, Clone)]
pub struct RequestExecutor<R> {
    relay: R,
}

impl<R: Relay> RequestExecutor<R> {
    pub fn new(relay: R) -> Self {
        Self { relay }
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    /// One relay call for one descriptor.
    ///
    /// # Errors
    ///
    /// `Network` when the relay is unreachable, `Backend` when it answers
    /// with a non-2xx status or a body that is not a result object.
    pub async fn try_execute(
        &self,
        request: &RequestDescriptor,
    ) -> Result<ResponseResult, ExploreError> {
        debug!(request = %request.label(), "executing");
        let reply = self.relay.post(EXECUTE_ROUTE, &payload(request)).await?;

        if !reply.is_success() {
            return Err(ExploreError::backend(
                reply.status,
                &reply.body,
                "Relay request failed",
            ));
        }

        serde_json::from_value(reply.body).map_err(|e| ExploreError::Backend {
            status: reply.status,
            message: format!("Malformed relay response: {e}"),
        })
    }

    /// Like [`try_execute`](Self::try_execute), but folds every failure into
    /// a result with `is_healthy = false` and the error text.
    pub async fn execute(&self, request: &RequestDescriptor) -> ResponseResult {
        match self.try_execute(request).await {
            Ok(result) => result,
            Err(e) => {
                warn!(request = %request.label(), error = %e, "request failed");
                ResponseResult::failed(e.to_string())
            }
        }
    }

    /// Build and send in one step.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without touching the relay when the body is not
    /// JSON; otherwise as [`try_execute`](Self::try_execute).
    pub async fn send(
        &self,
        endpoint: &Endpoint,
        base_url: Option<&str>,
        input: &RequestInput,
    ) -> Result<ResponseResult, ExploreError> {
        let request = build_request(endpoint, base_url, input)?;
        self.try_execute(&request).await
    }
}

/// Relay payload; `body` is present only when the method carries one.
fn payload(request: &RequestDescriptor) -> serde_json::Value {
    let mut payload = json!({
        "url": request.url,
        "method": request.method,
        "params": request.params,
        "headers": request.headers,
    });
    if let Some(body) = &request.body {
        payload["body"] = body.clone();
    }
    payload
}
