//! Request building: endpoint + base URL + user input → request descriptor

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::BodyParseError;
use crate::schema::Endpoint;
use crate::template::{ParamSplit, substitute};

/// Body text a fresh panel starts with.
pub const DEFAULT_BODY: &str = "{\n  \n}";

/// A fully resolved, ready-to-send HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    /// Method exactly as the schema declares it
    pub method: String,
    /// Query parameters, sent as raw strings
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// Current user-entered values for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInput {
    pub path_values: HashMap<String, String>,
    pub query_values: HashMap<String, String>,
    pub body_text: String,
}

impl Default for RequestInput {
    fn default() -> Self {
        Self {
            path_values: HashMap::new(),
            query_values: HashMap::new(),
            body_text: DEFAULT_BODY.to_string(),
        }
    }
}

impl RequestInput {
    #[must_use]
    pub fn with_path(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_values.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_values.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, text: impl Into<String>) -> Self {
        self.body_text = text.into();
        self
    }
}

/// Headers attached to every request. Not user-editable.
pub fn fixed_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

/// Build the descriptor for one send.
///
/// - URL is `base_url` followed directly by the resolved path (no slash
///   normalization; a missing base URL yields a relative URL).
/// - Query params are the entered values of every non-path parameter,
///   verbatim. Nothing is coerced to the declared type and required
///   parameters are not enforced.
/// - A body is attached only for POST, PUT and PATCH.
///
/// # Errors
///
/// Returns `BodyParseError` when the endpoint carries a body and the body
/// text is not valid JSON.
pub fn build_request(
    endpoint: &Endpoint,
    base_url: Option<&str>,
    input: &RequestInput,
) -> Result<RequestDescriptor, BodyParseError> {
    let body = if endpoint.carries_body() {
        Some(serde_json::from_str::<serde_json::Value>(&input.body_text)?)
    } else {
        None
    };

    let split = ParamSplit::of(endpoint);
    let params = split
        .query
        .iter()
        .filter_map(|p| {
            input
                .query_values
                .get(&p.name)
                .map(|v| (p.name.clone(), v.clone()))
        })
        .collect();

    let url = format!(
        "{}{}",
        base_url.unwrap_or(""),
        substitute(&endpoint.path, &input.path_values)
    );

    Ok(RequestDescriptor {
        url,
        method: endpoint.method.clone(),
        params,
        headers: fixed_headers(),
        body,
    })
}

impl RequestDescriptor {
    /// Operation label for logs, e.g. "GET https://api.x.com/users/42"
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Parameter;
    use serde_json::json;

    fn get_user() -> Endpoint {
        Endpoint::new("GET", "/users/{id}")
            .with_parameter(Parameter::new("id").required())
            .with_parameter(Parameter::new("verbose"))
    }

    #[test]
    fn resolves_url_from_base_and_path() {
        let input = RequestInput::default().with_path("id", "42");
        let req = build_request(&get_user(), Some("https://api.x.com"), &input).unwrap();
        assert_eq!(req.url, "https://api.x.com/users/42");
        assert_eq!(req.method, "GET");
        assert!(req.params.is_empty());
    }

    #[test]
    fn no_slash_normalization() {
        let input = RequestInput::default().with_path("id", "1");
        let req = build_request(&get_user(), Some("https://api.x.com/"), &input).unwrap();
        assert_eq!(req.url, "https://api.x.com//users/1");
    }

    #[test]
    fn missing_base_url_gives_relative_url() {
        let input = RequestInput::default().with_path("id", "1");
        let req = build_request(&get_user(), None, &input).unwrap();
        assert_eq!(req.url, "/users/1");
    }

    #[test]
    fn unresolved_placeholder_is_sent_literally() {
        let req = build_request(&get_user(), Some("http://h"), &RequestInput::default()).unwrap();
        assert_eq!(req.url, "http://h/users/{id}");
    }

    #[test]
    fn query_values_are_raw_strings() {
        let ep = Endpoint::new("GET", "/search").with_parameter(Parameter {
            name: "limit".into(),
            param_type: "integer".into(),
            required: true,
            description: None,
        });
        let input = RequestInput::default().with_query("limit", "not-a-number");
        let req = build_request(&ep, Some("http://h"), &input).unwrap();
        assert_eq!(req.params.get("limit").map(String::as_str), Some("not-a-number"));
    }

    #[test]
    fn required_query_not_enforced() {
        let ep = Endpoint::new("GET", "/search").with_parameter(Parameter::new("q").required());
        let req = build_request(&ep, Some("http://h"), &RequestInput::default()).unwrap();
        assert!(req.params.is_empty());
    }

    #[test]
    fn path_values_never_leak_into_query() {
        let input = RequestInput::default()
            .with_path("id", "42")
            .with_query("id", "shadow")
            .with_query("verbose", "true")
            .with_query("undeclared", "x");
        let req = build_request(&get_user(), Some("http://h"), &input).unwrap();
        assert_eq!(req.params.len(), 1);
        assert_eq!(req.params.get("verbose").map(String::as_str), Some("true"));
    }

    #[test]
    fn headers_fixed_to_json() {
        let req = build_request(&get_user(), None, &RequestInput::default()).unwrap();
        assert_eq!(req.headers, fixed_headers());
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn no_body_for_get_or_delete_even_with_invalid_text() {
        for method in ["GET", "DELETE", "get"] {
            let ep = Endpoint::new(method, "/x");
            let input = RequestInput::default().with_body("{invalid");
            let req = build_request(&ep, None, &input).unwrap();
            assert!(req.body.is_none(), "{method} must not carry a body");
        }
    }

    #[test]
    fn body_attached_for_post_put_patch() {
        for method in ["POST", "PUT", "PATCH", "put"] {
            let ep = Endpoint::new(method, "/x");
            let input = RequestInput::default().with_body(r#"{"name": "a"}"#);
            let req = build_request(&ep, None, &input).unwrap();
            assert_eq!(req.body, Some(json!({"name": "a"})));
            assert_eq!(req.method, method);
        }
    }

    #[test]
    fn invalid_body_signals_parse_error() {
        let ep = Endpoint::new("PUT", "/x");
        let input = RequestInput::default().with_body("{invalid");
        let err = build_request(&ep, None, &input).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn default_body_is_an_empty_object() {
        let ep = Endpoint::new("POST", "/x");
        let req = build_request(&ep, None, &RequestInput::default()).unwrap();
        assert_eq!(req.body, Some(json!({})));
    }

    #[test]
    fn serializes_without_absent_body() {
        let req = build_request(&get_user(), Some("http://h"), &RequestInput::default()).unwrap();
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("body").is_none());
        assert_eq!(v["headers"]["Content-Type"], "application/json");
    }
}
