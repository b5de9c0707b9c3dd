//! Static basemap tile check tool.
//!
//! Tiles are image payloads, not JSON, so this tool only verifies that a
//! tile exists via the gateway's HEAD probe rather than fetching the data.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::core::config::Config;
use crate::core::gateway::Gateway;
use crate::domains::tools::ToolError;

use super::common::{error_result, success_result};

/// Tile probes are quick; don't wait the full call timeout for them.
const TILE_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameters for the basemap tile check.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BasemapTileParams {
    /// API version (default: v1).
    #[serde(default = "default_version")]
    #[schemars(description = "API version (default: v1)")]
    pub version: String,

    /// The base style category (default: arcgis).
    #[serde(default = "default_style_base")]
    #[schemars(description = "Base style category (default: arcgis)")]
    pub style_base: String,

    /// Map style name (e.g., navigation, streets, satellite).
    #[serde(default = "default_style_name")]
    #[schemars(description = "Map style name (e.g., navigation, streets, satellite)")]
    pub style_name: String,

    /// Tile row coordinate.
    #[serde(default = "default_row")]
    #[schemars(description = "Tile row coordinate")]
    pub row: i64,

    /// Zoom level.
    #[serde(default = "default_level")]
    #[schemars(description = "Zoom level")]
    pub level: i64,

    /// Tile column coordinate.
    #[serde(default = "default_column")]
    #[schemars(description = "Tile column coordinate")]
    pub column: i64,
}

fn default_version() -> String {
    "v1".to_string()
}

fn default_style_base() -> String {
    "arcgis".to_string()
}

fn default_style_name() -> String {
    "navigation".to_string()
}

fn default_row() -> i64 {
    17
}

fn default_level() -> i64 {
    52333
}

fn default_column() -> i64 {
    22866
}

/// Basemap tile check tool implementation.
#[derive(Debug, Clone)]
pub struct BasemapTileTool;

impl BasemapTileTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_basemap_tile";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Access static basemap tiles service with different styles. Checks whether the \
         requested tile exists and reports its coordinates, style, and URL.";

    /// Execute the tool logic.
    pub async fn execute(
        params: &BasemapTileParams,
        gateway: &Gateway,
        config: &Config,
    ) -> CallToolResult {
        let url = format!(
            "{}/{}/{}/{}/static/tile/{}/{}/{}",
            config.services.basemap_url,
            params.version,
            params.style_base,
            params.style_name,
            params.row,
            params.level,
            params.column
        );

        info!("Checking basemap tile: {}", url);

        match gateway.probe(&url, TILE_TIMEOUT).await {
            Ok(status) if status.as_u16() == 200 => {
                success_result(Self::format_tile_info(params, &url))
            }
            Ok(status) => success_result(format!(
                "Tile not found or not accessible. Status code: {}",
                status.as_u16()
            )),
            Err(e) => error_result(&e.to_string()),
        }
    }

    fn format_tile_info(params: &BasemapTileParams, url: &str) -> String {
        [
            "# Basemap Tile Information".to_string(),
            format!("**Version**: {}", params.version),
            format!("**Style Base**: {}", params.style_base),
            format!("**Style Name**: {}", params.style_name),
            format!(
                "**Coordinates**: Row={}, Level={}, Column={}",
                params.row, params.level, params.column
            ),
            "**Status**: Tile available".to_string(),
            format!("**URL**: {}", url),
        ]
        .join("\n")
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<BasemapTileParams>(),
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
                let params: BasemapTileParams =
                    serde_json::from_value(Value::Object(args))
                        .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
                Ok(Self::execute(&params, &gateway, &config).await)
            }
            .boxed()
        })
    }
}
