//! Common utilities shared across the ArcGIS tools.
//!
//! Result construction, coordinate parsing, and the small formatting
//! helpers (readable datum names, travel times, thousands separators)
//! that several tools need when rendering upstream payloads.

use rmcp::model::{CallToolResult, Content};
use serde_json::Value;
use tracing::warn;

/// Create an error result with a formatted message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Create a success result with text content.
pub fn success_result(content: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(content)])
}

/// Convert an elevation reference datum to readable form.
pub fn reference_to_readable(reference: &str) -> String {
    match reference.to_lowercase().as_str() {
        "meansealevel" => "above sea level".to_string(),
        "ellipsoid" => "above WGS84 ellipsoid".to_string(),
        _ => format!("({})", reference),
    }
}

/// Parse a `"longitude,latitude"` pair.
pub fn parse_lon_lat(location: &str) -> Option<(f64, f64)> {
    let (lon, lat) = location.split_once(',')?;
    Some((lon.trim().parse().ok()?, lat.trim().parse().ok()?))
}

/// Format a travel time in minutes as `N hr M min` / `M min`.
pub fn format_travel_time(total_minutes: f64) -> String {
    let hours = (total_minutes / 60.0) as i64;
    let minutes = (total_minutes % 60.0) as i64;
    if hours > 0 {
        format!("{} hr {} min", hours, minutes)
    } else {
        format!("{} min", minutes)
    }
}

/// Render an integer with thousands separators.
pub fn thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Render a float with thousands separators and the given precision.
pub fn thousands_f(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .map(|(i, f)| (i.to_string(), Some(f.to_string())))
        .unwrap_or((formatted, None));

    let int_value: i64 = int_part.parse().unwrap_or(0);
    let mut result = thousands(int_value);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(&frac);
    }
    if value < 0.0 && !result.starts_with('-') {
        result.insert(0, '-');
    }
    result
}

/// Get a string field, treating empty strings as absent.
pub fn nonempty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Render a JSON scalar for display (strings unquoted).
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
