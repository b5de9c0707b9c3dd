//! Place details lookup tool.
//!
//! Fetches the full record for a single place by its Place ID. IDs come
//! from `find_nearby_places`.

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

/// Parameters for the place details lookup.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetailsParams {
    /// The unique identifier for a place.
    #[schemars(description = "The unique identifier for a place (obtained from find_nearby_places)")]
    pub place_id: String,
}

/// Place details tool implementation.
#[derive(Debug, Clone)]
pub struct PlaceDetailsTool;

impl PlaceDetailsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_place_details";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Get detailed information about a specific place using its Place ID. \
         You can find place IDs by first using find_nearby_places.";

    /// Execute the tool logic.
    pub async fn execute(
        params: &PlaceDetailsParams,
        gateway: &Gateway,
        config: &Config,
    ) -> CallToolResult {
        if params.place_id.is_empty() {
            return error_result(
                "Error: place_id is required. First use find_nearby_places to get a Place ID.",
            );
        }

        info!("Fetching place details for {}", params.place_id);

        let descriptor = CallDescriptor::get(format!(
            "{}/{}",
            config.services.places_url, params.place_id
        ))
        .param("f", "pjson");

        match gateway.execute(descriptor).await {
            Ok(data) => success_result(Self::format_details(&params.place_id, &data)),
            Err(e) => error_result(&format!(
                "Error retrieving place details: {} for place ID: {}",
                e, params.place_id
            )),
        }
    }

    /// Render the full place record as Markdown.
    fn format_details(place_id: &str, data: &Map<String, Value>) -> String {
        let name = data
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown Place");

        let mut lines = vec![format!("# {}", name), format!("**Place ID**: {}", place_id)];

        if let Some(address) = data.get("address") {
            let formatted =
                nonempty_str(address, "formattedAddress").unwrap_or("No address available");
            lines.push(format!("**Address**: {}", formatted));

            let components: Vec<String> = [
                ("streetNumber", "Street Number"),
                ("streetName", "Street"),
                ("city", "City"),
                ("region", "Region"),
                ("postalCode", "Postal Code"),
                ("country", "Country"),
            ]
            .iter()
            .filter_map(|(key, label)| {
                nonempty_str(address, key).map(|v| format!("**{}**: {}", label, v))
            })
            .collect();

            if !components.is_empty() {
                lines.push("\n## Address Components".to_string());
                lines.extend(components);
            }
        }

        if let Some(category) = data.get("category") {
            let label = nonempty_str(category, "label").unwrap_or("Uncategorized");
            lines.push(format!("**Category**: {}", label));
        }

        let mut contact: Vec<String> = Vec::new();
        for (key, label) in [("phone", "Phone"), ("url", "Website"), ("email", "Email")] {
            if let Some(value) = data.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()) {
                contact.push(format!("**{}**: {}", label, value));
            }
        }
        if !contact.is_empty() {
            lines.push("\n## Contact Information".to_string());
            lines.extend(contact);
        }

        if let Some(hours) = data.get("openingHours").and_then(Value::as_object)
            && !hours.is_empty()
        {
            lines.push("\n## Opening Hours".to_string());
            for (day, times) in hours {
                lines.push(format!("**{}**: {}", day, display_value(times)));
            }
        }

        if let Some(location) = data.get("location")
            && let (Some(x), Some(y)) = (
                location.get("x").and_then(Value::as_f64),
                location.get("y").and_then(Value::as_f64),
            )
        {
            lines.push(format!("\n**Coordinates**: {}, {}", y, x));
        }

        if let Some(description) = data
            .get("description")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
        {
            lines.push(format!("\n## Description\n{}", description));
        }

        if let Some(rating) = data.get("rating").and_then(Value::as_object) {
            let value = rating
                .get("value")
                .map(display_value)
                .unwrap_or_else(|| "N/A".to_string());
            let count = rating.get("count").and_then(Value::as_i64).unwrap_or(0);
            lines.push(format!("\n**Rating**: {}/5 ({} reviews)", value, count));
        }

        lines.join("\n")
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<PlaceDetailsParams>(),
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
                let params: PlaceDetailsParams =
                    serde_json::from_value(Value::Object(args))
                        .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
                Ok(Self::execute(&params, &gateway, &config).await)
            }
            .boxed()
        })
    }
}
