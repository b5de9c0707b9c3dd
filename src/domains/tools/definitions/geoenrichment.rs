//! Demographic enrichment tool.
//!
//! Queries the GeoEnrichment service for demographic data and local facts
//! around a point or a caller-supplied study area. This is the one POST
//! endpoint in the suite: the study area definition travels in the request
//! body while `f` and `token` stay in the query string.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::core::config::Config;
use crate::core::gateway::{CallDescriptor, Gateway};
use crate::domains::tools::ToolError;

use super::common::{error_result, success_result, thousands, thousands_f};

/// Attribute keys that are bookkeeping rather than demographics.
const SKIPPED_ATTRIBUTES: &[&str] = &["OBJECTID", "ID", "apportionmentConfidence", "STDGEOID"];

/// Field-prefix to category mapping for grouping attributes.
const CATEGORY_PREFIXES: &[(&str, &str)] = &[
    ("POP", "Population"),
    ("AGE", "Age"),
    ("INC", "Income"),
    ("HOUSEHOLDS", "Households"),
    ("HOUSING", "Housing"),
    ("EDUCATION", "Education"),
    ("HEALTH", "Health"),
    ("RACE", "Demographics"),
    ("EMPLOY", "Employment"),
];

/// Parameters for the geoenrichment request.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoenrichmentParams {
    /// Longitude of the location.
    #[serde(default)]
    #[schemars(description = "Longitude of the location (e.g., -117.1956)")]
    pub x: Option<f64>,

    /// Latitude of the location.
    #[serde(default)]
    #[schemars(description = "Latitude of the location (e.g., 34.0572)")]
    pub y: Option<f64>,

    /// Optional JSON string defining the areas to analyze.
    #[serde(default)]
    #[schemars(description = "Optional JSON string defining the areas to analyze, e.g. \"[{\\\"geometry\\\":{\\\"x\\\":-117.1956,\\\"y\\\":34.0572}}]\". Used when x/y are not provided.")]
    pub study_areas: Option<String>,
}

/// Geoenrichment tool implementation.
#[derive(Debug, Clone)]
pub struct GeoenrichmentTool;

impl GeoenrichmentTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_geoenrichment";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Find demographic data and local facts for locations. Analyzes a point \
         (x/y) or caller-defined study areas and returns key demographic \
         attributes grouped by category.";

    /// Execute the tool logic.
    pub async fn execute(
        params: &GeoenrichmentParams,
        gateway: &Gateway,
        config: &Config,
    ) -> CallToolResult {
        let study_areas = match (params.x, params.y, &params.study_areas) {
            (Some(x), Some(y), _) => format!("[{{\"geometry\":{{\"x\":{},\"y\":{}}}}}]", x, y),
            (_, _, Some(areas)) if !areas.is_empty() => {
                // Callers sometimes hand over single-quoted pseudo-JSON.
                if areas.contains('\'') && !areas.contains('"') {
                    areas.replace('\'', "\"")
                } else {
                    areas.clone()
                }
            }
            _ => {
                return error_result(
                    "Error: Either x/y coordinates or studyAreas parameter must be provided",
                );
            }
        };

        info!("Requesting geoenrichment for study areas: {}", study_areas);

        let descriptor =
            CallDescriptor::post(format!("{}/enrich", config.services.geoenrichment_url))
                .param("f", "pjson")
                .param("studyAreas", study_areas)
                .param("dataCollections", json!(["KeyGlobalFacts"]));

        match gateway.execute(descriptor).await {
            Ok(data) => match Self::format_enrichment(&data) {
                Some(text) => success_result(text),
                None => success_result(
                    "No enrichment data available for the specified locations.".to_string(),
                ),
            },
            Err(e) if e.code() == Some(403) => error_result(
                "Authentication Error: Your account doesn't have permission to use \
                 geoenrichment services. This service may require a paid subscription \
                 or specific entitlements.",
            ),
            Err(e) => error_result(&format!("Error accessing geoenrichment service: {}", e)),
        }
    }

    /// Render the demographic feature set, or None when the payload holds
    /// no usable features.
    fn format_enrichment(data: &Map<String, Value>) -> Option<String> {
        let features = data
            .get("results")
            .and_then(Value::as_array)
            .and_then(|r| r.first())
            .and_then(|r| r.get("value"))
            .and_then(|v| v.get("FeatureSet"))
            .and_then(Value::as_array)
            .and_then(|fs| fs.first())
            .and_then(|fs| fs.get("features"))
            .and_then(Value::as_array)
            .filter(|f| !f.is_empty())?;

        let mut sections = vec!["# Demographic Data".to_string()];
        let multiple = features.len() > 1;

        for (i, feature) in features.iter().enumerate() {
            let Some(attributes) = feature.get("attributes").and_then(Value::as_object) else {
                continue;
            };
            if attributes.is_empty() {
                continue;
            }

            let location_info = feature
                .get("geometry")
                .and_then(|g| {
                    let x = g.get("x").and_then(Value::as_f64)?;
                    let y = g.get("y").and_then(Value::as_f64)?;
                    Some(format!("({}, {})", y, x))
                })
                .unwrap_or_default();

            if multiple {
                sections.push(format!("\n## Location {} {}", i + 1, location_info));
            } else {
                sections.push(format!("**Location**: {}", location_info));
            }

            let mut categories: Vec<(String, Vec<String>)> = Vec::new();
            for (key, value) in attributes {
                if SKIPPED_ATTRIBUTES.contains(&key.as_str()) || value.is_null() {
                    continue;
                }

                let category = Self::attribute_category(key);
                let entry = format!(
                    "**{}**: {}",
                    Self::attribute_label(key),
                    Self::attribute_value(key, value)
                );

                match categories.iter_mut().find(|(name, _)| *name == category) {
                    Some((_, items)) => items.push(entry),
                    None => categories.push((category, vec![entry])),
                }
            }

            categories.sort_by(|(a, _), (b, _)| a.cmp(b));
            for (name, mut items) in categories {
                sections.push(format!("\n{} {}", if multiple { "###" } else { "##" }, name));
                items.sort();
                sections.extend(items);
            }
        }

        Some(sections.join("\n"))
    }

    /// Map a field key to its display category via its prefix.
    fn attribute_category(key: &str) -> String {
        match key.split_once('_') {
            Some((prefix, _)) => CATEGORY_PREFIXES
                .iter()
                .find(|(p, _)| *p == prefix)
                .map(|(_, label)| label.to_string())
                .unwrap_or_else(|| prefix.to_string()),
            None => "General".to_string(),
        }
    }

    /// Humanize a field key: strip the prefix, capitalize each word.
    fn attribute_label(key: &str) -> String {
        let name = match key.split_once('_') {
            Some((_, rest)) => rest.replace('_', " "),
            None => key.to_string(),
        };
        name.split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>()
                        + &chars.as_str().to_lowercase(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Format an attribute value by type: percent fields, thousands
    /// separators for numbers, plain text otherwise.
    fn attribute_value(key: &str, value: &Value) -> String {
        let is_percent = key.contains("PERCENT") || key.contains("PCT") || key.ends_with("_P");
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => {
                thousands(n.as_i64().unwrap_or_default())
            }
            Value::Number(n) => {
                let f = n.as_f64().unwrap_or_default();
                if is_percent {
                    format!("{:.2}%", f)
                } else {
                    thousands_f(f, 2)
                }
            }
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GeoenrichmentParams>(),
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
                let params: GeoenrichmentParams =
                    serde_json::from_value(Value::Object(args))
                        .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
                Ok(Self::execute(&params, &gateway, &config).await)
            }
            .boxed()
        })
    }
}
