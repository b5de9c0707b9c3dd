//! Elevation lookup tool.
//!
//! Queries the Elevation service for ground height at a single point or at
//! a list of coordinates. Single points go through the GET `at-point`
//! operation; coordinate lists go through the POST `at-many-points` one.

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

use super::common::{error_result, reference_to_readable, success_result, thousands, thousands_f};

/// Parameters for the elevation lookup.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElevationParams {
    /// Longitude of a single point.
    #[serde(default)]
    #[schemars(description = "Longitude of a single point (e.g., -117.195)")]
    pub lon: Option<f64>,

    /// Latitude of a single point.
    #[serde(default)]
    #[schemars(description = "Latitude of a single point (e.g., 34.065)")]
    pub lat: Option<f64>,

    /// Multiple coordinates as a JSON array string.
    #[serde(default)]
    #[schemars(description = "Multiple coordinates as a JSON array string, e.g. \"[[-117.182,34.0555],[-117.185,34.057]]\". Used when lon/lat are not provided.")]
    pub coordinates: Option<String>,

    /// Elevation reference surface.
    #[serde(default)]
    #[schemars(description = "Elevation reference: \"meanSeaLevel\" (default) or \"ellipsoid\"")]
    pub relative_to: Option<String>,
}

/// Elevation tool implementation.
#[derive(Debug, Clone)]
pub struct ElevationTool;

impl ElevationTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_elevation";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Get ground elevation for locations. Takes a single lon/lat point or a \
         JSON array of coordinates and returns elevations in meters, with a \
         profile summary for multiple points.";

    /// Execute the tool logic.
    pub async fn execute(
        params: &ElevationParams,
        gateway: &Gateway,
        config: &Config,
    ) -> CallToolResult {
        match (params.lon, params.lat, &params.coordinates) {
            (Some(lon), Some(lat), _) => {
                info!("Elevation lookup at ({}, {})", lon, lat);

                let mut descriptor = CallDescriptor::get(format!(
                    "{}/at-point",
                    config.services.elevation_url
                ))
                .param("f", "json")
                .param("lon", lon)
                .param("lat", lat);
                if let Some(relative_to) = &params.relative_to {
                    descriptor = descriptor.param("relativeTo", relative_to.as_str());
                }

                match gateway.execute(descriptor).await {
                    Ok(data) => success_result(Self::format_point(lon, lat, &data)),
                    Err(e) => error_result(&format!("Error retrieving elevation data: {}", e)),
                }
            }
            (_, _, Some(coordinates)) if !coordinates.is_empty() => {
                info!("Elevation lookup for coordinate list");

                let mut descriptor = CallDescriptor::post(format!(
                    "{}/at-many-points",
                    config.services.elevation_url
                ))
                .param("f", "json")
                .param("coordinates", coordinates.as_str());
                if let Some(relative_to) = &params.relative_to {
                    descriptor = descriptor.param("relativeTo", relative_to.as_str());
                }

                match gateway.execute(descriptor).await {
                    Ok(data) => success_result(Self::format_many_points(&data)),
                    Err(e) => error_result(&format!("Error retrieving elevation data: {}", e)),
                }
            }
            _ => error_result(
                "Error: Either lon/lat or coordinates parameter must be provided.",
            ),
        }
    }

    /// The reference datum reported alongside the results.
    fn relative_to(data: &Map<String, Value>) -> &str {
        data.get("elevationInfo")
            .and_then(|i| i.get("relativeTo"))
            .and_then(Value::as_str)
            .unwrap_or("meanSeaLevel")
    }

    /// Render a single-point elevation result as Markdown.
    fn format_point(lon: f64, lat: f64, data: &Map<String, Value>) -> String {
        let reference = Self::relative_to(data);
        let point = data
            .get("result")
            .and_then(|r| r.get("point"))
            .cloned()
            .unwrap_or(Value::Null);

        let Some(z) = point.get("z").and_then(Value::as_f64) else {
            return format!(
                "No elevation data available for location ({}, {})",
                lat, lon
            );
        };

        let mut lines = vec![
            "# Elevation Data".to_string(),
            format!("**Location**: {}, {}", lat, lon),
            format!(
                "**Elevation**: {} meters {}",
                thousands(z.round() as i64),
                reference_to_readable(reference)
            ),
            format!("**Datum**: {}", reference),
        ];

        if let Some(wkid) = point
            .get("spatialReference")
            .and_then(|sr| sr.get("wkid"))
            .and_then(Value::as_i64)
        {
            lines.push(format!("**Spatial Reference**: WKID {}", wkid));
        }

        lines.join("\n")
    }

    /// Render a multi-point elevation result, with a profile summary when
    /// more than one point was requested.
    fn format_many_points(data: &Map<String, Value>) -> String {
        let reference = Self::relative_to(data);
        let points = data
            .get("result")
            .and_then(|r| r.get("points"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        if points.is_empty() {
            return "No elevation data returned for the specified coordinates.".to_string();
        }

        let mut lines = vec![
            "# Multiple Elevation Results".to_string(),
            format!("**Reference Datum**: {}", reference_to_readable(reference)),
            format!("**Points**: {}", points.len()),
            "\n## Point Elevations".to_string(),
        ];

        let mut elevations: Vec<f64> = Vec::new();
        for (i, point) in points.iter().enumerate() {
            let x = point.get("x").and_then(Value::as_f64).unwrap_or_default();
            let y = point.get("y").and_then(Value::as_f64).unwrap_or_default();
            match point.get("z").and_then(Value::as_f64) {
                Some(z) => {
                    elevations.push(z);
                    lines.push(format!(
                        "**Point {}** ({}, {}): {} meters",
                        i + 1,
                        y,
                        x,
                        thousands(z.round() as i64)
                    ));
                }
                None => lines.push(format!(
                    "**Point {}** ({}, {}): No elevation data available",
                    i + 1,
                    y,
                    x
                )),
            }
        }

        if points.len() > 1 && !elevations.is_empty() {
            let min = elevations.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = elevations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let average = elevations.iter().sum::<f64>() / elevations.len() as f64;

            lines.push("\n## Elevation Profile".to_string());
            lines.push(format!("**Minimum**: {} meters", thousands(min.round() as i64)));
            lines.push(format!("**Maximum**: {} meters", thousands(max.round() as i64)));
            lines.push(format!("**Average**: {} meters", thousands_f(average, 1)));
            lines.push(format!(
                "**Elevation Change**: {} meters",
                thousands((max - min).round() as i64)
            ));
        }

        lines.join("\n")
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ElevationParams>(),
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
                let params: ElevationParams = serde_json::from_value(Value::Object(args))
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
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn as_map(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            panic!("expected object")
        };
        map
    }

    #[test]
    fn test_format_point() {
        let data = as_map(json!({
            "elevationInfo": {"relativeTo": "meanSeaLevel"},
            "result": {
                "point": {
                    "x": -117.195,
                    "y": 34.065,
                    "z": 1699.0,
                    "spatialReference": {"wkid": 4326}
                }
            }
        }));
        let text = ElevationTool::format_point(-117.195, 34.065, &data);
        assert!(text.contains("# Elevation Data"));
        assert!(text.contains("**Location**: 34.065, -117.195"));
        assert!(text.contains("**Elevation**: 1,699 meters above sea level"));
        assert!(text.contains("**Datum**: meanSeaLevel"));
        assert!(text.contains("**Spatial Reference**: WKID 4326"));
    }

    #[test]
    fn test_format_point_without_z() {
        let data = as_map(json!({
            "result": {"point": {"x": 0.0, "y": 0.0}}
        }));
        let text = ElevationTool::format_point(-117.195, 34.065, &data);
        assert_eq!(
            text,
            "No elevation data available for location (34.065, -117.195)"
        );
    }

    #[test]
    fn test_format_many_points_with_profile() {
        let data = as_map(json!({
            "elevationInfo": {"relativeTo": "ellipsoid"},
            "result": {
                "points": [
                    {"x": -117.182, "y": 34.0555, "z": 1200.0},
                    {"x": -117.185, "y": 34.057, "z": 1400.0},
                    {"x": -117.188, "y": 34.059}
                ]
            }
        }));
        let text = ElevationTool::format_many_points(&data);
        assert!(text.contains("# Multiple Elevation Results"));
        assert!(text.contains("**Reference Datum**: above WGS84 ellipsoid"));
        assert!(text.contains("**Points**: 3"));
        assert!(text.contains("## Point Elevations"));
        assert!(text.contains("**Point 1** (34.0555, -117.182): 1,200 meters"));
        assert!(text.contains("**Point 3** (34.059, -117.188): No elevation data available"));
        assert!(text.contains("## Elevation Profile"));
        assert!(text.contains("**Minimum**: 1,200 meters"));
        assert!(text.contains("**Maximum**: 1,400 meters"));
        assert!(text.contains("**Average**: 1,300.0 meters"));
        assert!(text.contains("**Elevation Change**: 200 meters"));
    }

    #[test]
    fn test_format_many_points_profile_skips_points_without_data() {
        let data = as_map(json!({
            "result": {
                "points": [
                    {"x": 0.0, "y": 0.0, "z": 100.0},
                    {"x": 1.0, "y": 1.0}
                ]
            }
        }));
        let text = ElevationTool::format_many_points(&data);
        assert!(text.contains("## Elevation Profile"));
        assert!(text.contains("**Minimum**: 100 meters"));
        assert!(text.contains("**Maximum**: 100 meters"));
    }

    #[test]
    fn test_format_many_points_empty() {
        let data = as_map(json!({"result": {"points": []}}));
        let text = ElevationTool::format_many_points(&data);
        assert_eq!(
            text,
            "No elevation data returned for the specified coordinates."
        );
    }

    #[tokio::test]
    async fn test_execute_requires_point_or_coordinates() {
        let gateway = Gateway::new(None);
        let params: ElevationParams = serde_json::from_value(json!({})).unwrap();
        let result = ElevationTool::execute(&params, &gateway, &Config::default()).await;
        assert!(result.is_error.unwrap_or(false));
    }

    #[tokio::test]
    async fn test_execute_single_point_uses_at_point() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/at-point"))
            .and(query_param("lon", "-117.195"))
            .and(query_param("lat", "34.065"))
            .and(query_param("relativeTo", "ellipsoid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"point": {"x": -117.195, "y": 34.065, "z": 500.0}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.services.elevation_url = server.uri();
        let gateway = Gateway::new(None);

        let params: ElevationParams = serde_json::from_value(json!({
            "lon": -117.195, "lat": 34.065, "relativeTo": "ellipsoid"
        }))
        .unwrap();
        let result = ElevationTool::execute(&params, &gateway, &config).await;
        assert!(!result.is_error.unwrap_or(false));
    }

    #[tokio::test]
    async fn test_execute_coordinates_posts_at_many_points() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/at-many-points"))
            .and(body_partial_json(json!({
                "coordinates": "[[-117.182,34.0555],[-117.185,34.057]]"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"points": [
                    {"x": -117.182, "y": 34.0555, "z": 100.0},
                    {"x": -117.185, "y": 34.057, "z": 200.0}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.services.elevation_url = server.uri();
        let gateway = Gateway::new(None);

        let params: ElevationParams = serde_json::from_value(json!({
            "coordinates": "[[-117.182,34.0555],[-117.185,34.057]]"
        }))
        .unwrap();
        let result = ElevationTool::execute(&params, &gateway, &config).await;
        assert!(!result.is_error.unwrap_or(false));
    }
}
