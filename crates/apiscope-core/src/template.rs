//! Path templates: `{name}` placeholder extraction and substitution

use std::collections::HashMap;

use crate::schema::{Endpoint, Parameter};

/// Placeholder names in first-occurrence order, without duplicates.
///
/// A `{` with no closing `}` ends the scan; empty `{}` is ignored.
pub fn extract_placeholders(path: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = &after[..close];
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &after[close + 1..];
    }
    names
}

/// Replace every `{name}` occurrence with its value, verbatim.
///
/// Values are not URL-encoded. Placeholders without a supplied value stay
/// in the output literally.
pub fn substitute(path: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        let name = &after[..close];
        match values.get(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// An endpoint's parameters partitioned by where they go in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSplit {
    /// Names found in the path template
    pub path: Vec<String>,
    /// Every declared parameter not named in the template, in declared order
    pub query: Vec<Parameter>,
}

impl ParamSplit {
    pub fn of(endpoint: &Endpoint) -> Self {
        let path = extract_placeholders(&endpoint.path);
        let query = endpoint
            .parameters
            .iter()
            .filter(|p| !path.contains(&p.name))
            .cloned()
            .collect();
        Self { path, query }
    }

    pub fn query_names(&self) -> Vec<&str> {
        self.query.iter().map(|p| p.name.as_str()).collect()
    }
}
