//! Turn-by-turn directions tool.
//!
//! Solves a route across two or more stops via the World Route service.

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

use super::common::{display_value, error_result, format_travel_time, success_result};

/// Parameters for the directions request.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DirectionsParams {
    /// Two or more locations as a semicolon-separated list of
    /// "longitude,latitude" pairs.
    #[schemars(description = "Two or more locations as a semicolon-separated list of \"longitude,latitude\" pairs (e.g., \"-122.68782,45.51238;-122.690176,45.522054\")")]
    pub stops: String,
}

/// Directions tool implementation.
#[derive(Debug, Clone)]
pub struct DirectionsTool;

impl DirectionsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_directions";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Get detailed turn-by-turn directions between locations. Takes two or \
         more stops and returns the route summary with total distance, travel \
         time, and individual maneuvers.";

    /// Execute the tool logic.
    pub async fn execute(
        params: &DirectionsParams,
        gateway: &Gateway,
        config: &Config,
    ) -> CallToolResult {
        let stop_points: Vec<&str> = params
            .stops
            .split(';')
            .filter(|s| !s.is_empty())
            .collect();
        if stop_points.len() < 2 {
            return error_result(
                "Error: At least two stops are required (origin and destination) in \
                 format 'lon1,lat1;lon2,lat2'",
            );
        }

        info!("Solving route across {} stops", stop_points.len());

        let descriptor =
            CallDescriptor::get(format!("{}/solve", config.services.routing_url))
                .param("f", "json")
                .param("stops", params.stops.as_str());

        match gateway.execute(descriptor).await {
            Ok(data) => {
                let has_route = data
                    .get("routes")
                    .and_then(|r| r.get("features"))
                    .and_then(Value::as_array)
                    .is_some_and(|f| !f.is_empty());
                if !has_route {
                    return success_result(
                        "No route found between the specified locations.".to_string(),
                    );
                }
                success_result(Self::format_route(&stop_points, &data))
            }
            Err(e) => error_result(&format!("Error getting directions: {}", e)),
        }
    }

    /// Render the route summary and maneuvers as Markdown.
    fn format_route(stop_points: &[&str], data: &Map<String, Value>) -> String {
        let attributes = data
            .get("routes")
            .and_then(|r| r.get("features"))
            .and_then(Value::as_array)
            .and_then(|f| f.first())
            .and_then(|f| f.get("attributes"))
            .cloned()
            .unwrap_or(Value::Null);

        let total_distance = attributes
            .get("Total_Miles")
            .or_else(|| attributes.get("Total_Kilometers"))
            .map(display_value)
            .unwrap_or_else(|| "Unknown".to_string());

        let total_time = match attributes.get("Total_Minutes").and_then(Value::as_f64) {
            Some(minutes) => format_travel_time(minutes),
            None => attributes
                .get("Total_Minutes")
                .map(display_value)
                .unwrap_or_else(|| "Unknown".to_string()),
        };

        let mut lines = vec![
            "# Route Directions".to_string(),
            format!("**From**: {}", stop_points[0]),
            format!("**To**: {}", stop_points[stop_points.len() - 1]),
        ];
        if stop_points.len() > 2 {
            lines.push(format!(
                "**Via**: {}",
                stop_points[1..stop_points.len() - 1].join("; ")
            ));
        }
        lines.push(format!("**Stops**: {} locations", stop_points.len()));
        lines.push(format!("**Total Distance**: {} miles", total_distance));
        lines.push(format!("**Estimated Travel Time**: {}", total_time));

        if let Some(features) = data
            .get("directions")
            .and_then(Value::as_array)
            .and_then(|d| d.first())
            .and_then(|d| d.get("features"))
            .and_then(Value::as_array)
            .filter(|f| !f.is_empty())
        {
            lines.push("\n## Turn-by-Turn Directions".to_string());
            for (i, direction) in features.iter().enumerate() {
                let attrs = direction.get("attributes").cloned().unwrap_or(Value::Null);
                let text = attrs
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown direction");
                let length = attrs.get("length").and_then(Value::as_f64).unwrap_or(0.0);

                let mut line = format!("{}. {}", i + 1, text);
                if length > 0.0 {
                    line.push_str(&format!(" ({:.1} miles)", length));
                }
                lines.push(line);
            }
        }

        lines.join("\n")
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<DirectionsParams>(),
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
                let params: DirectionsParams = serde_json::from_value(Value::Object(args))
                    .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
                Ok(Self::execute(&params, &gateway, &config).await)
            }
            .boxed()
        })
    }
}
