//! Reverse geocoding tool.
//!
//! Converts geographic coordinates to the closest address. The coordinate
//! input is validated locally before any network call is made.

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

use super::common::{display_value, error_result, nonempty_str, parse_lon_lat, success_result};

/// Address attribute keys and their display labels.
const FIELD_LABELS: &[(&str, &str)] = &[
    ("Address", "Street Address"),
    ("Street", "Street"),
    ("City", "City"),
    ("Neighborhood", "Neighborhood"),
    ("District", "District"),
    ("Region", "State/Region"),
    ("Subregion", "County"),
    ("Postal", "Postal Code"),
    ("PostalExt", "Postal Extension"),
    ("CountryCode", "Country Code"),
    ("Country", "Country"),
    ("PlaceName", "Place Name"),
    ("AddNum", "Street Number"),
    ("StPreDir", "Street Pre-Direction"),
    ("StName", "Street Name"),
    ("StType", "Street Type"),
    ("StDir", "Street Direction"),
];

/// Parameters for the reverse geocoding lookup.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReverseGeocodeParams {
    /// Location as "longitude,latitude".
    #[schemars(description = "Location as \"longitude,latitude\" (e.g., \"-79.3871,43.6426\")")]
    pub location: String,

    /// Fields to include in the response.
    #[serde(default = "default_out_fields")]
    #[schemars(description = "Fields to include in the response (default: all fields)")]
    pub out_fields: String,
}

fn default_out_fields() -> String {
    "*".to_string()
}

/// Reverse geocoding tool implementation.
#[derive(Debug, Clone)]
pub struct ReverseGeocodeTool;

impl ReverseGeocodeTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "reverse_geocode";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Convert geographic coordinates to an address. Takes a \
         \"longitude,latitude\" pair and returns the closest address with \
         its components.";

    /// Execute the tool logic.
    pub async fn execute(
        params: &ReverseGeocodeParams,
        gateway: &Gateway,
        config: &Config,
    ) -> CallToolResult {
        if params.location.is_empty() || !params.location.contains(',') {
            return error_result("Error: Location must be formatted as 'longitude,latitude'");
        }
        let Some((lon, lat)) = parse_lon_lat(&params.location) else {
            return error_result(
                "Error: Invalid coordinates. Location must contain numeric longitude \
                 and latitude values.",
            );
        };

        info!("Reverse geocoding ({}, {})", lon, lat);

        let descriptor = CallDescriptor::get(format!(
            "{}/reverseGeocode",
            config.services.geocode_url
        ))
        .param("f", "pjson")
        .param("location", params.location.as_str())
        .param("outSr", 4326)
        .param("outFields", params.out_fields.as_str())
        .param("returnIntersection", "false");

        match gateway.execute(descriptor).await {
            Ok(data) => {
                if !data.contains_key("address") {
                    return success_result(format!(
                        "No address found at coordinates {}.",
                        params.location
                    ));
                }
                success_result(Self::format_address(lon, lat, &data))
            }
            Err(e) => error_result(&e.to_string()),
        }
    }

    /// Render the reverse geocoding result as Markdown.
    fn format_address(lon: f64, lat: f64, data: &Map<String, Value>) -> String {
        let address = data.get("address").cloned().unwrap_or(Value::Null);

        let full_address = nonempty_str(&address, "Match_addr")
            .or_else(|| nonempty_str(&address, "Address"))
            .unwrap_or("Address not available");

        let mut lines = vec![
            "# Reverse Geocoding Results".to_string(),
            format!("**Coordinates**: {}, {}", lat, lon),
            format!("**Full Address**: {}", full_address),
        ];

        if let Some(addr_type) = nonempty_str(&address, "Addr_type") {
            lines.push(format!("**Location Type**: {}", addr_type));
        }
        if let Some(score) = data.get("score") {
            lines.push(format!("**Match Score**: {}", display_value(score)));
        }

        let components: Vec<String> = FIELD_LABELS
            .iter()
            .filter_map(|(key, label)| {
                nonempty_str(&address, key).map(|v| format!("**{}**: {}", label, v))
            })
            .collect();
        if !components.is_empty() {
            lines.push("\n## Address Components".to_string());
            lines.extend(components);
        }

        if let Some(wkid) = data
            .get("location")
            .and_then(|l| l.get("spatialReference"))
            .and_then(|sr| sr.get("wkid"))
        {
            lines.push(format!("\n**Spatial Reference**: WKID {}", display_value(wkid)));
        }

        lines.join("\n")
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ReverseGeocodeParams>(),
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
                let params: ReverseGeocodeParams =
                    serde_json::from_value(Value::Object(args))
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

    fn as_map(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            panic!("expected object")
        };
        map
    }

    #[tokio::test]
    async fn test_execute_rejects_malformed_location() {
        let gateway = Gateway::new(None);
        let config = Config::default();

        let params = ReverseGeocodeParams {
            location: "no-comma".to_string(),
            out_fields: "*".to_string(),
        };
        let result = ReverseGeocodeTool::execute(&params, &gateway, &config).await;
        assert!(result.is_error.unwrap_or(false));

        let params = ReverseGeocodeParams {
            location: "abc,def".to_string(),
            out_fields: "*".to_string(),
        };
        let result = ReverseGeocodeTool::execute(&params, &gateway, &config).await;
        assert!(result.is_error.unwrap_or(false));
    }

    #[test]
    fn test_format_address() {
        let data = as_map(json!({
            "address": {
                "Match_addr": "55 John St, Toronto, Ontario",
                "Addr_type": "PointAddress",
                "City": "Toronto",
                "Region": "Ontario",
                "CountryCode": "CAN"
            },
            "location": {"spatialReference": {"wkid": 4326}}
        }));
        let text = ReverseGeocodeTool::format_address(-79.3871, 43.6426, &data);
        assert!(text.contains("# Reverse Geocoding Results"));
        assert!(text.contains("**Coordinates**: 43.6426, -79.3871"));
        assert!(text.contains("**Full Address**: 55 John St, Toronto, Ontario"));
        assert!(text.contains("**Location Type**: PointAddress"));
        assert!(text.contains("## Address Components"));
        assert!(!text.contains("**County**:"));
        assert!(text.contains("**Country Code**: CAN"));
        assert!(text.contains("**Spatial Reference**: WKID 4326"));
    }

    #[test]
    fn test_format_address_falls_back_to_address_field() {
        let data = as_map(json!({"address": {"Address": "Somewhere St"}}));
        let text = ReverseGeocodeTool::format_address(0.0, 0.0, &data);
        assert!(text.contains("**Full Address**: Somewhere St"));
    }
}
