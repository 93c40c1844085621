//! Error taxonomy for exploration actions
//!
//! Every variant is recoverable: the acting panel shows the message and the
//! rest of the session stays usable. Nothing here is retried automatically.

/// The request body text is not valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Request body is not valid JSON (line {line}, column {column}): {message}")]
pub struct BodyParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<serde_json::Error> for BodyParseError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExploreError {
    /// Detected before anything is sent
    #[error(transparent)]
    Validation(#[from] BodyParseError),
    /// The relay itself could not be reached
    #[error("Cannot reach relay: {0}")]
    Network(String),
    /// The relay or a backend service answered with a failure
    #[error("{message}")]
    Backend { status: u16, message: String },
    /// A dependent action was triggered with nothing selected
    #[error("{0}")]
    EmptyState(String),
}

impl ExploreError {
    /// Build a `Backend` error from a failure response body.
    ///
    /// Uses `detail` (with `errors` appended as JSON), then `message`, then
    /// `fallback` with the status code.
    pub fn backend(status: u16, body: &serde_json::Value, fallback: &str) -> Self {
        Self::Backend {
            status,
            message: failure_message(status, body, fallback),
        }
    }

    pub fn empty_state(what: impl Into<String>) -> Self {
        Self::EmptyState(what.into())
    }
}

fn failure_message(status: u16, body: &serde_json::Value, fallback: &str) -> String {
    if let Some(detail) = body.get("detail").filter(|d| !d.is_null()) {
        let mut message = json_text(detail);
        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            message.push_str(": ");
            message.push_str(&errors.to_string());
        }
        return message;
    }
    if let Some(message) = body.get("message").filter(|m| !m.is_null()) {
        return json_text(message);
    }
    format!("{fallback} (Status: {status})")
}

fn json_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
