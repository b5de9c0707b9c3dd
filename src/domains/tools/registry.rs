//! Tool Registry - central registration for all tools.
//!
//! Provides tool metadata for listing. Dispatch happens through the rmcp
//! router built in [`super::router`].

use rmcp::model::Tool;

use super::definitions::{
    BasemapTileTool, DirectionsTool, ElevationTool, FindNearbyPlacesTool, GeocodeTool,
    GeoenrichmentTool, PlaceDetailsTool, ReverseGeocodeTool,
};

/// Tool registry - lists all available tools.
#[derive(Debug, Default)]
pub struct ToolRegistry;

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            BasemapTileTool::NAME,
            FindNearbyPlacesTool::NAME,
            PlaceDetailsTool::NAME,
            GeocodeTool::NAME,
            ReverseGeocodeTool::NAME,
            DirectionsTool::NAME,
            GeoenrichmentTool::NAME,
            ElevationTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            BasemapTileTool::to_tool(),
            FindNearbyPlacesTool::to_tool(),
            PlaceDetailsTool::to_tool(),
            GeocodeTool::to_tool(),
            ReverseGeocodeTool::to_tool(),
            DirectionsTool::to_tool(),
            GeoenrichmentTool::to_tool(),
            ElevationTool::to_tool(),
        ]
    }
}
