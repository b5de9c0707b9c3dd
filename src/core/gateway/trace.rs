//! Human-readable request logging with credential redaction.
//!
//! The gateway logs every outgoing request before transport. The rendition
//! mirrors the raw HTTP exchange (request line, host, headers, body) but the
//! `token` value is always replaced by a fixed marker so the literal secret
//! never reaches the logs. Rendering is infallible by construction; a URL
//! that fails to parse degrades to a best-effort line rather than an error.

use serde_json::{Map, Value};
use tracing::debug;

use super::descriptor::Method;

/// Fixed marker substituted for the `token` value in logged requests.
pub const REDACTION_MARKER: &str = "......";

/// Render a JSON scalar the way it appears on the wire in a query string.
pub(super) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the redacted query-string pairs for logging or transport.
///
/// When `redact` is set, the `token` value is replaced by the marker.
pub(super) fn query_pairs(params: &Map<String, Value>, redact: bool) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| {
            if redact && k == "token" {
                (k.clone(), REDACTION_MARKER.to_string())
            } else {
                (k.clone(), scalar_to_string(v))
            }
        })
        .collect()
}

/// Render the outgoing request as a multi-line, redacted HTTP transcript.
pub fn render_request(
    url: &str,
    query: &Map<String, Value>,
    method: Method,
    headers: &[(&str, &str)],
    body: Option<&Map<String, Value>>,
) -> String {
    let (host, path) = match reqwest::Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or_default().to_string(),
            parsed.path().to_string(),
        ),
        Err(_) => (String::new(), url.to_string()),
    };

    let query_string =
        serde_urlencoded::to_string(query_pairs(query, true)).unwrap_or_default();

    let mut lines = vec![
        "-------- HTTP Request --------".to_string(),
        format!("{} {}?{} HTTP/1.1", method, path, query_string),
        format!("Host: {}", host),
    ];

    for (name, value) in headers {
        lines.push(format!("{}: {}", name, value));
    }

    if let Some(body) = body {
        let mut safe_body = body.clone();
        if safe_body.contains_key("token") {
            safe_body.insert("token".to_string(), Value::String(REDACTION_MARKER.into()));
        }
        let rendered = serde_json::to_string_pretty(&Value::Object(safe_body))
            .unwrap_or_else(|_| "<unrenderable body>".to_string());
        lines.push(String::new());
        lines.push(rendered);
    }

    lines.push("-----------------------------".to_string());
    lines.join("\n")
}

/// Emit the redacted request transcript at debug level.
///
/// Log output goes to stderr; stdout belongs to the MCP stdio transport.
pub fn log_request(
    url: &str,
    query: &Map<String, Value>,
    method: Method,
    headers: &[(&str, &str)],
    body: Option<&Map<String, Value>>,
) {
    debug!("\n{}", render_request(url, query, method, headers, body));
}
