//! Endpoint catalog and schema validation
//!
//! Summarizes what can be explored in a schema (one entry per endpoint with
//! its path/query split) and flags schema problems before anything is sent.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::ApiSchema;
use crate::template::ParamSplit;

// ── Catalog types ──

/// Overview of a loaded schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Catalog {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub endpoints: Vec<EndpointSummary>,
    pub validations: Vec<Validation>,
}

/// One endpoint as presented to the user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EndpointSummary {
    /// Zero-based index, usable as a selector
    pub index: usize,
    /// Operation label, e.g. "GET /users/{id}"
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Placeholder names from the path template
    pub path_parameters: Vec<String>,
    /// Remaining parameters; required ones carry a trailing `*`
    pub query_parameters: Vec<String>,
    /// Whether a JSON body is sent
    pub body: bool,
}

/// A validation check result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub check: String,
    pub status: ValidationStatus,
    pub message: String,
}

/// Status of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl Validation {
    fn new(check: &str, status: ValidationStatus, message: String) -> Self {
        Self {
            check: check.into(),
            status,
            message,
        }
    }
}

// ── Schema validation ──

/// Validate a schema and produce validation results.
#[must_use]
pub fn validate_schema(schema: &ApiSchema) -> Vec<Validation> {
    let mut checks = Vec::new();

    match schema.base_url.as_deref() {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            checks.push(Validation::new(
                "base_url",
                ValidationStatus::Ok,
                format!("base_url: {url}"),
            ));
        }
        Some(url) => checks.push(Validation::new(
            "base_url",
            ValidationStatus::Warning,
            format!("base_url: {url} (missing http:// or https:// prefix)"),
        )),
        None => checks.push(Validation::new(
            "base_url",
            ValidationStatus::Warning,
            "base_url: not set (requests will use bare paths)".into(),
        )),
    }

    if schema.endpoints.is_empty() {
        checks.push(Validation::new(
            "endpoints",
            ValidationStatus::Warning,
            "endpoints: none found".into(),
        ));
    } else {
        checks.push(Validation::new(
            "endpoints",
            ValidationStatus::Ok,
            format!("endpoints: {} found", schema.endpoints.len()),
        ));
    }

    for endpoint in &schema.endpoints {
        let label = endpoint.label();

        for name in endpoint.duplicate_parameters() {
            checks.push(Validation::new(
                "parameters",
                ValidationStatus::Error,
                format!("{label}: parameter '{name}' declared more than once"),
            ));
        }

        let split = ParamSplit::of(endpoint);
        for name in &split.path {
            if !endpoint.parameters.iter().any(|p| &p.name == name) {
                checks.push(Validation::new(
                    "placeholders",
                    ValidationStatus::Warning,
                    format!("{label}: placeholder '{{{name}}}' has no declared parameter"),
                ));
            }
        }
    }

    checks
}

impl Catalog {
    #[must_use]
    pub fn from_schema(schema: &ApiSchema) -> Self {
        let endpoints = schema
            .endpoints
            .iter()
            .enumerate()
            .map(|(index, endpoint)| {
                let split = ParamSplit::of(endpoint);
                EndpointSummary {
                    index,
                    operation: endpoint.label(),
                    description: endpoint.description.clone(),
                    path_parameters: split.path,
                    query_parameters: split
                        .query
                        .iter()
                        .map(|p| {
                            if p.required {
                                format!("{}*", p.name)
                            } else {
                                p.name.clone()
                            }
                        })
                        .collect(),
                    body: endpoint.carries_body(),
                }
            })
            .collect();

        Self {
            title: schema.title.clone(),
            base_url: schema.base_url.clone(),
            endpoints,
            validations: validate_schema(schema),
        }
    }

    /// Human-readable rendering.
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} ({} endpoints)", self.title, self.endpoints.len()));
        if let Some(url) = &self.base_url {
            lines.push(format!("Base URL: {url}"));
        }
        lines.push(String::new());

        for ep in &self.endpoints {
            lines.push(format!("[{}] {}", ep.index, ep.operation));
            if let Some(desc) = &ep.description {
                lines.push(format!("  {desc}"));
            }
            if !ep.path_parameters.is_empty() {
                lines.push(format!("  Path: {}", ep.path_parameters.join(", ")));
            }
            if !ep.query_parameters.is_empty() {
                lines.push(format!("  Query: {}", ep.query_parameters.join(", ")));
            }
            if ep.body {
                lines.push("  Body: JSON".into());
            }
        }
        if !self.endpoints.is_empty() {
            lines.push(String::new());
        }

        lines.push("Schema validation:".into());
        for v in &self.validations {
            lines.push(format!("  [{}] {}", v.status, v.message));
        }

        lines.join("\n")
    }

    /// Returns true if any validation has Error status.
    pub fn has_errors(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Error)
    }

    /// Returns true if any validation has Warning status.
    pub fn has_warnings(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Warning)
    }
}
