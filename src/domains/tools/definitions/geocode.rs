//! Geocoding tool.
//!
//! Searches for an address, place, or point of interest via the World
//! Geocoding Service's `findAddressCandidates` operation.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::core::config::Config;
use crate::core::gateway::{CallDescriptor, Gateway};
use crate::domains::tools::ToolError;

use super::common::{display_value, error_result, nonempty_str, success_result};

/// Candidate attribute keys and their display labels.
const COMPONENT_LABELS: &[(&str, &str)] = &[
    ("StAddr", "Street"),
    ("City", "City"),
    ("Region", "State/Region"),
    ("RegionAbbr", "State Abbr."),
    ("Postal", "Postal Code"),
    ("PostalExt", "Postal Extension"),
    ("Country", "Country"),
    ("Addr_type", "Address Type"),
    ("Type", "Location Type"),
    ("PlaceName", "Place Name"),
    ("Place_addr", "Place Address"),
];

/// Parameters for the geocoding search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeParams {
    /// Complete address in a single string.
    #[serde(default)]
    #[schemars(description = "Complete address in a single string (e.g., \"1600 Pennsylvania Ave NW, DC\")")]
    pub single_line: String,

    /// Place name or address.
    #[serde(default)]
    #[schemars(description = "Place name or address (e.g., \"Starbucks\" or \"380 New York St\")")]
    pub address: String,

    /// Optional point to search near, as "longitude,latitude".
    #[serde(default)]
    #[schemars(description = "Optional point to search near, as \"longitude,latitude\"")]
    pub location: String,

    /// Optional POI category to search for.
    #[serde(default)]
    #[schemars(description = "Optional POI category to search for (e.g., \"gas station\")")]
    pub category: String,

    /// Fields to return in the response.
    #[serde(default = "default_out_fields")]
    #[schemars(description = "Fields to return in the response (default: all fields)")]
    pub out_fields: String,
}

fn default_out_fields() -> String {
    "*".to_string()
}

/// Geocoding tool implementation.
#[derive(Debug, Clone)]
pub struct GeocodeTool;

impl GeocodeTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "geocode";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Search for an address, place or point of interest. Returns up to five \
         candidates with coordinates, match scores, and address components.";

    /// Execute the tool logic.
    pub async fn execute(
        params: &GeocodeParams,
        gateway: &Gateway,
        config: &Config,
    ) -> CallToolResult {
        info!("Geocoding: {}", Self::query_summary(params));

        // One search mode applies per call: a full single-line address wins
        // over a plain address, which wins over a category search.
        let mut descriptor = CallDescriptor::get(format!(
            "{}/findAddressCandidates",
            config.services.geocode_url
        ))
        .param("f", "pjson")
        .param("outFields", params.out_fields.as_str())
        .param("maxLocations", 5)
        .param("outSR", 4326);

        if !params.single_line.is_empty() {
            descriptor = descriptor.param("singleLine", params.single_line.as_str());
        } else if !params.address.is_empty() {
            descriptor = descriptor.param("address", params.address.as_str());
        } else if !params.category.is_empty() {
            descriptor = descriptor.param("category", params.category.as_str());
        }

        if !params.location.is_empty() {
            descriptor = descriptor.param("location", params.location.as_str());
        }

        match gateway.execute(descriptor).await {
            Ok(data) => {
                let candidates = data
                    .get("candidates")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();

                if candidates.is_empty() {
                    return success_result("No matches found for the given search.".to_string());
                }

                success_result(Self::format_candidates(&candidates))
            }
            Err(e) => error_result(&e.to_string()),
        }
    }

    fn query_summary(params: &GeocodeParams) -> &str {
        if !params.single_line.is_empty() {
            &params.single_line
        } else if !params.address.is_empty() {
            &params.address
        } else if !params.category.is_empty() {
            &params.category
        } else {
            "<empty query>"
        }
    }

    /// Render the candidate list as Markdown.
    fn format_candidates(candidates: &[Value]) -> String {
        let mut sections = vec!["# Geocoding results".to_string()];

        for (i, candidate) in candidates.iter().enumerate() {
            let empty = Map::new();
            let attrs = candidate
                .get("attributes")
                .and_then(Value::as_object)
                .unwrap_or(&empty);

            let match_addr = attrs
                .get("Match_addr")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or("Unknown");
            let title = attrs
                .get("PlaceName")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(match_addr);

            let location = candidate.get("location");
            let x = location
                .and_then(|l| l.get("x"))
                .map(display_value)
                .unwrap_or_else(|| "Unknown".to_string());
            let y = location
                .and_then(|l| l.get("y"))
                .map(display_value)
                .unwrap_or_else(|| "Unknown".to_string());
            let score = candidate
                .get("score")
                .map(display_value)
                .unwrap_or_else(|| "Unknown".to_string());

            let mut lines = vec![
                format!("## Result {}: {}", i + 1, title),
                format!("**Address**: {}", match_addr),
                format!("**Coordinates**: {}, {}", y, x),
                format!("**Match Score**: {}", score),
            ];

            let components: Vec<String> = COMPONENT_LABELS
                .iter()
                .filter_map(|(key, label)| {
                    nonempty_str(candidate.get("attributes").unwrap_or(&Value::Null), key)
                        .map(|v| format!("**{}**: {}", label, v))
                })
                .collect();
            if !components.is_empty() {
                lines.push(components.join("\n"));
            }

            sections.push(lines.join("\n"));
        }

        sections.join("\n\n")
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GeocodeParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for this tool.
    pub fn create_route<S>(gateway: Arc<Gateway>, config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let gateway = gateway.clone();
            let config = config.clone();
            let args = ctx.arguments.clone().unwrap_or_default();
            async move {
                let params: GeocodeParams = serde_json::from_value(Value::Object(args))
                    .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
                Ok(Self::execute(&params, &gateway, &config).await)
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_format_candidates() {
        let candidates = vec![json!({
            "location": {"x": -77.0365, "y": 38.8977},
            "score": 100,
            "attributes": {
                "Match_addr": "1600 Pennsylvania Ave NW, Washington, DC",
                "PlaceName": "White House",
                "City": "Washington",
                "Region": "District of Columbia",
                "Postal": "20500"
            }
        })];
        let text = GeocodeTool::format_candidates(&candidates);
        assert!(text.contains("# Geocoding results"));
        assert!(text.contains("## Result 1: White House"));
        assert!(text.contains("**Coordinates**: 38.8977, -77.0365"));
        assert!(text.contains("**Match Score**: 100"));
        assert!(text.contains("**City**: Washington"));
        assert!(text.contains("**Postal Code**: 20500"));
    }

    #[test]
    fn test_format_candidates_without_place_name_uses_address() {
        let candidates = vec![json!({
            "location": {"x": 1.0, "y": 2.0},
            "score": 95,
            "attributes": {"Match_addr": "380 New York St"}
        })];
        let text = GeocodeTool::format_candidates(&candidates);
        assert!(text.contains("## Result 1: 380 New York St"));
    }

    #[tokio::test]
    async fn test_execute_single_line_wins_over_address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/findAddressCandidates"))
            .and(query_param("singleLine", "380 New York St, Redlands"))
            .and(query_param_is_missing("address"))
            .and(query_param("maxLocations", "5"))
            .and(query_param("outSR", "4326"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.services.geocode_url = server.uri();
        let gateway = Gateway::new(None);

        let params: GeocodeParams = serde_json::from_value(json!({
            "singleLine": "380 New York St, Redlands",
            "address": "ignored"
        }))
        .unwrap();
        let result = GeocodeTool::execute(&params, &gateway, &config).await;
        assert!(!result.is_error.unwrap_or(false));
        let rendered = format!("{:?}", result.content);
        assert!(rendered.contains("No matches found"));
    }
}
