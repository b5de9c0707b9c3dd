//! Nearby places search tool.
//!
//! Searches points of interest around a coordinate and optionally enriches
//! the top results with full place details. The detail lookup is a
//! best-effort secondary call: its errors are logged and discarded, and its
//! failure never fails the primary search.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::gateway::{CallDescriptor, Gateway};
use crate::domains::tools::ToolError;

use super::common::{error_result, nonempty_str, success_result};

/// Address component keys and their display labels, used when a place
/// carries no pre-formatted address.
const ADDRESS_COMPONENTS: &[(&str, &str)] = &[
    ("streetNumber", "Street Number"),
    ("streetName", "Street"),
    ("city", "City"),
    ("region", "Region"),
    ("postalCode", "Postal Code"),
    ("country", "Country"),
];

/// Parameters for the nearby places search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindNearbyPlacesParams {
    /// Longitude of the center point.
    #[schemars(description = "Longitude of the center point (e.g., -122.4194)")]
    pub x: f64,

    /// Latitude of the center point.
    #[schemars(description = "Latitude of the center point (e.g., 37.7749)")]
    pub y: f64,

    /// Number of results to return.
    #[serde(default = "default_page_size")]
    #[schemars(description = "Number of results to return (default: 10)")]
    pub page_size: i64,

    /// Optional category filter.
    #[serde(default)]
    #[schemars(description = "Optional category filter (e.g., \"restaurant\", \"hotel\", \"coffee\")")]
    pub categories: String,

    /// Search radius in meters.
    #[serde(default = "default_radius")]
    #[schemars(description = "Search radius in meters (default: 5000)")]
    pub radius: i64,

    /// Whether to include full details for the top places.
    #[serde(default)]
    #[schemars(description = "Whether to include full details for each place (default: false)")]
    pub include_details: bool,

    /// Maximum number of places to fetch details for.
    #[serde(default = "default_details_limit")]
    #[schemars(description = "Maximum number of places to get details for when includeDetails=true (default: 1)")]
    pub details_limit: i64,
}

fn default_page_size() -> i64 {
    10
}

fn default_radius() -> i64 {
    5000
}

fn default_details_limit() -> i64 {
    1
}

/// Nearby places search tool implementation.
#[derive(Debug, Clone)]
pub struct FindNearbyPlacesTool;

impl FindNearbyPlacesTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "find_nearby_places";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Find nearby places and points of interest with optional detailed information. \
         Searches around a longitude/latitude center point with an optional category \
         filter and radius, and can enrich the top results with full place details.";

    /// Execute the tool logic.
    pub async fn execute(
        params: &FindNearbyPlacesParams,
        gateway: &Gateway,
        config: &Config,
    ) -> CallToolResult {
        info!(
            "Searching places near ({}, {}) radius {}m",
            params.x, params.y, params.radius
        );

        let descriptor = CallDescriptor::get(format!("{}/near-point", config.services.places_url))
            .param("x", params.x)
            .param("y", params.y)
            .param("pageSize", params.page_size)
            .param("f", "pjson")
            .param_opt(
                "categories",
                (!params.categories.is_empty()).then_some(params.categories.as_str()),
            )
            .param_opt("radius", (params.radius > 0).then_some(params.radius));

        let data = match gateway.execute(descriptor).await {
            Ok(data) => data,
            Err(e) => return error_result(&e.to_string()),
        };

        let places = data
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        if places.is_empty() {
            return success_result("No places found matching your criteria.".to_string());
        }

        let mut sections = vec![format!("# Found {} nearby places", places.len())];

        if !params.include_details {
            sections.push(
                "*Note: Use find_nearby_places with includeDetails=true to see more \
                 information about specific places.*\n"
                    .to_string(),
            );
        }

        let mut detailed_count = 0;
        for place in &places {
            let mut block = Self::format_place_summary(place);

            let place_id = nonempty_str(place, "placeId");
            if params.include_details
                && detailed_count < params.details_limit
                && let Some(place_id) = place_id
                && let Some(detail) = fetch_place_detail(gateway, config, place_id).await
            {
                block.push_str("\n\n### Detailed Information\n");
                block.push_str(&detail);
                detailed_count += 1;
            }

            sections.push(block);
        }

        if params.include_details && places.len() as i64 > params.details_limit {
            sections.push(format!(
                "\n\n*Note: Detailed information has been limited to {} places. \
                 Increase the detailsLimit parameter to see more details.*",
                params.details_limit
            ));
        }

        success_result(sections.join("\n\n"))
    }

    /// Render the basic listing block for one place.
    fn format_place_summary(place: &Value) -> String {
        let name = nonempty_str(place, "name").unwrap_or("Unknown Place");
        let address = Self::format_address(place.get("address"));
        let category = place
            .get("category")
            .and_then(|c| nonempty_str(c, "label"))
            .unwrap_or("Uncategorized");

        let mut lines = vec![
            format!("## {}", name),
            format!("**Address**: {}", address),
            format!("**Category**: {}", category),
        ];

        if let Some(phone) = nonempty_str(place, "phone") {
            lines.push(format!("**Phone**: {}", phone));
        }
        if let Some(distance) = place.get("distance").and_then(Value::as_f64) {
            lines.push(format!("**Distance**: {} meters", distance));
        }
        if let Some(place_id) = nonempty_str(place, "placeId") {
            lines.push(format!("**Place ID**: `{}`", place_id));
        }
        if let Some(location) = place.get("location")
            && let (Some(x), Some(y)) = (
                location.get("x").and_then(Value::as_f64),
                location.get("y").and_then(Value::as_f64),
            )
        {
            lines.push(format!("**Coordinates**: {}, {}", y, x));
        }

        lines.join("\n")
    }

    /// Pick the formatted address, or assemble one from components.
    fn format_address(address: Option<&Value>) -> String {
        let Some(address) = address else {
            return "Address information not available".to_string();
        };

        if let Some(formatted) = nonempty_str(address, "formattedAddress") {
            return formatted.to_string();
        }

        let parts: Vec<String> = ADDRESS_COMPONENTS
            .iter()
            .filter_map(|(key, _)| nonempty_str(address, key).map(str::to_string))
            .collect();

        if parts.is_empty() {
            "Address information not available".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<FindNearbyPlacesParams>(),
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
                let params: FindNearbyPlacesParams =
                    serde_json::from_value(Value::Object(args))
                        .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
                Ok(Self::execute(&params, &gateway, &config).await)
            }
            .boxed()
        })
    }
}

/// Best-effort detail lookup for one place.
///
/// This is caller-level enrichment, not a gateway concern: the error channel
/// is deliberately discarded here after logging, and "not found" is not
/// distinguished from a transient failure - both mean "no detail available".
async fn fetch_place_detail(
    gateway: &Gateway,
    config: &Config,
    place_id: &str,
) -> Option<String> {
    let descriptor =
        CallDescriptor::get(format!("{}/{}", config.services.places_url, place_id))
            .param("f", "pjson");

    match gateway.execute(descriptor).await {
        Ok(data) => {
            let section = format_detail_section(&data);
            (!section.is_empty()).then_some(section)
        }
        Err(e) => {
            debug!("place detail lookup for {} discarded: {}", place_id, e);
            None
        }
    }
}

/// Render the supplementary detail block for an enriched place.
///
/// Only covers fields that are not already in the basic listing.
fn format_detail_section(data: &Map<String, Value>) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(address) = data.get("address") {
        let components: Vec<String> = ADDRESS_COMPONENTS
            .iter()
            .filter_map(|(key, label)| {
                nonempty_str(address, key).map(|v| format!("**{}**: {}", label, v))
            })
            .collect();
        if !components.is_empty() {
            lines.push("**Address Details**:".to_string());
            lines.extend(components);
        }
    }

    let mut contact: Vec<String> = Vec::new();
    if let Some(url) = data.get("url").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        contact.push(format!("**Website**: {}", url));
    }
    if let Some(email) = data.get("email").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        contact.push(format!("**Email**: {}", email));
    }
    if !contact.is_empty() {
        lines.push("\n**Contact Information**:".to_string());
        lines.extend(contact);
    }

    if let Some(hours) = data.get("openingHours").and_then(Value::as_object)
        && !hours.is_empty()
    {
        lines.push("\n**Opening Hours**:".to_string());
        for (day, times) in hours {
            lines.push(format!("*{}*: {}", day, super::common::display_value(times)));
        }
    }

    if let Some(description) = data
        .get("description")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        lines.push(format!("\n**Description**:\n{}", description));
    }

    if let Some(rating) = data.get("rating").and_then(Value::as_object) {
        let value = rating
            .get("value")
            .map(super::common::display_value)
            .unwrap_or_else(|| "N/A".to_string());
        let count = rating.get("count").and_then(Value::as_i64).unwrap_or(0);
        lines.push(format!("\n**Rating**: {}/5 ({} reviews)", value, count));
    }

    lines.join("\n")
}
