//! In-process relays for unit tests

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::oneshot;

use apiscope_core::ExploreError;

use crate::transport::{EXECUTE_ROUTE, Relay, RelayReply};

/// Records every call and answers from a per-route script.
#[derive(Debug, Clone, Default)]
pub struct RecordingRelay {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
    replies: Arc<Mutex<HashMap<String, Result<RelayReply, ExploreError>>>>,
}

impl RecordingRelay {
    pub fn reply(self, route: &str, status: u16, body: Value) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(route.to_string(), Ok(RelayReply { status, body }));
        self
    }

    pub fn fail(self, route: &str, error: ExploreError) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(route.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Relay for RecordingRelay {
    fn post(
        &self,
        route: &str,
        payload: &Value,
    ) -> impl Future<Output = Result<RelayReply, ExploreError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((route.to_string(), payload.clone()));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(route)
            .cloned()
            .unwrap_or_else(|| {
                Ok(RelayReply {
                    status: 404,
                    body: serde_json::json!({"detail": "Not Found"}),
                })
            });
        async move { reply }
    }
}

/// Relay whose replies are held back until a gate opens.
///
/// Calls are keyed by the snippet language or, for executions, the request
/// URL. Keys without a gate answer immediately.
#[derive(Debug, Clone, Default)]
pub struct GatedRelay {
    gates: Arc<Mutex<HashMap<String, oneshot::Receiver<()>>>>,
}

impl GatedRelay {
    /// Hold replies for `key` until the returned sender fires.
    pub fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }
}

impl Relay for GatedRelay {
    fn post(
        &self,
        route: &str,
        payload: &Value,
    ) -> impl Future<Output = Result<RelayReply, ExploreError>> + Send {
        let key = payload
            .get("language")
            .or_else(|| payload.get("url"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let gate = self.gates.lock().unwrap().remove(&key);
        let body = if route == EXECUTE_ROUTE {
            serde_json::json!({
                "status_code": 200,
                "latency_ms": 1.0,
                "is_healthy": true,
                "response_data": {"url": key},
            })
        } else {
            serde_json::json!({"snippet": format!("{key} snippet")})
        };
        async move {
            if let Some(gate) = gate {
                gate.await.ok();
            }
            Ok(RelayReply { status: 200, body })
        }
    }
}
