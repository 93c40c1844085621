//! `.http` request-file rendering for request previews

use crate::request::RequestDescriptor;

/// Render a descriptor in `.http` format.
///
/// Query parameters go on `?`/`&` continuation lines, unencoded, so the
/// preview shows exactly what would be relayed.
pub fn to_http(request: &RequestDescriptor, comment: Option<&str>) -> String {
    let mut lines = Vec::new();

    if let Some(c) = comment {
        lines.push(format!("### {c}"));
    }

    lines.push(format!("{} {}", request.method, request.url));

    for (idx, (key, value)) in request.params.iter().enumerate() {
        let sep = if idx == 0 { '?' } else { '&' };
        lines.push(format!("    {sep}{key}={value}"));
    }

    for (key, value) in &request.headers {
        lines.push(format!("{key}: {value}"));
    }

    if let Some(body) = &request.body {
        lines.push(String::new());
        lines.push(serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()));
    }

    lines.join("\n")
}
