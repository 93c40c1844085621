//! Schema model: one parsed API description for the current session.
//!
//! An `ApiSchema` is immutable once received. A new parse replaces it
//! wholesale; nothing in this crate mutates it in place.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Methods whose requests carry a JSON body.
const BODY_METHODS: &[&str] = &["POST", "PUT", "PATCH"];

/// A parsed API description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiSchema {
    /// Title of the API
    pub title: String,
    /// Description of the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base URL that endpoint paths are appended to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Endpoints in documentation order
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// One documented route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Endpoint {
    /// Path template, e.g. "/users/{id}"
    pub path: String,
    /// HTTP method, kept exactly as the schema declares it
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Response shape, opaque to this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

/// A declared endpoint parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    pub name: String,
    /// Type tag such as "string" or "integer" (informational only)
    #[serde(rename = "type", default = "default_param_type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_param_type() -> String {
    "string".to_string()
}

impl Parameter {
    /// Shorthand for an optional string parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: default_param_type(),
            required: false,
            description: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl Endpoint {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            description: None,
            parameters: Vec::new(),
            response_schema: None,
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Operation label, e.g. "GET /users/{id}"
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Whether requests to this endpoint carry a JSON body.
    ///
    /// The comparison ignores case; the method itself is sent as declared.
    pub fn carries_body(&self) -> bool {
        BODY_METHODS
            .iter()
            .any(|m| m.eq_ignore_ascii_case(self.method.trim()))
    }

    /// Parameter names that occur more than once.
    pub fn duplicate_parameters(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for p in &self.parameters {
            if !seen.insert(p.name.as_str()) && !dups.contains(&p.name.as_str()) {
                dups.push(p.name.as_str());
            }
        }
        dups
    }
}

impl ApiSchema {
    /// Load a schema file (JSON or YAML).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(path.to_path_buf(), e.to_string()))?;
        Self::parse(path, &content)
    }

    /// Parse schema text.
    ///
    /// The extension decides the format (`.yaml`/`.yml`, `.json`); anything
    /// else is sniffed: a leading `{` means JSON, otherwise YAML.
    ///
    /// # Errors
    ///
    /// Returns error if the content is not a valid schema document
    pub fn parse(path: &Path, content: &str) -> Result<Self, SchemaError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let as_json = match ext.as_str() {
            "json" => true,
            "yaml" | "yml" => false,
            _ => content.trim_start().starts_with('{'),
        };

        if as_json {
            serde_json::from_str(content)
                .map_err(|e| SchemaError::Parse(format!("Invalid JSON: {e}")))
        } else {
            serde_yml::from_str(content)
                .map_err(|e| SchemaError::Parse(format!("Invalid YAML: {e}")))
        }
    }

    /// Select an endpoint by zero-based index or by label ("GET /users/{id}").
    ///
    /// The method part of a label matches case-insensitively.
    pub fn select(&self, selector: &str) -> Option<(usize, &Endpoint)> {
        let selector = selector.trim();
        if let Ok(index) = selector.parse::<usize>() {
            return self.endpoints.get(index).map(|e| (index, e));
        }
        let (method, path) = selector.split_once(char::is_whitespace)?;
        let path = path.trim();
        self.endpoints
            .iter()
            .enumerate()
            .find(|(_, e)| e.method.eq_ignore_ascii_case(method) && e.path == path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Generate JSON Schema for the API description format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(ApiSchema);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
