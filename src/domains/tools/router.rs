//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! Each tool knows how to create its own route; this module just wires them
//! together with the shared gateway and configuration.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::core::config::Config;
use crate::core::gateway::Gateway;

use super::definitions::{
    BasemapTileTool, DirectionsTool, ElevationTool, FindNearbyPlacesTool, GeocodeTool,
    GeoenrichmentTool, PlaceDetailsTool, ReverseGeocodeTool,
};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(gateway: Arc<Gateway>, config: Arc<Config>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(BasemapTileTool::create_route(gateway.clone(), config.clone()))
        .with_route(FindNearbyPlacesTool::create_route(gateway.clone(), config.clone()))
        .with_route(PlaceDetailsTool::create_route(gateway.clone(), config.clone()))
        .with_route(GeocodeTool::create_route(gateway.clone(), config.clone()))
        .with_route(ReverseGeocodeTool::create_route(gateway.clone(), config.clone()))
        .with_route(DirectionsTool::create_route(gateway.clone(), config.clone()))
        .with_route(GeoenrichmentTool::create_route(gateway.clone(), config.clone()))
        .with_route(ElevationTool::create_route(gateway, config))
}

#[cfg(test)]
mod tests {
    use super::super::registry::ToolRegistry;
    use super::*;

    struct TestServer {}

    fn test_parts() -> (Arc<Gateway>, Arc<Config>) {
        (Arc::new(Gateway::new(None)), Arc::new(Config::default()))
    }

    #[test]
    fn test_build_router() {
        let (gateway, config) = test_parts();
        let router: ToolRouter<TestServer> = build_tool_router(gateway, config);
        let tools = router.list_all();
        assert_eq!(tools.len(), 8);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"get_basemap_tile"));
        assert!(names.contains(&"find_nearby_places"));
        assert!(names.contains(&"get_place_details"));
        assert!(names.contains(&"geocode"));
        assert!(names.contains(&"reverse_geocode"));
        assert!(names.contains(&"get_directions"));
        assert!(names.contains(&"get_geoenrichment"));
        assert!(names.contains(&"get_elevation"));
    }

    #[test]
    fn test_registry_matches_router() {
        // Ensure registry and router have the same tools
        let (gateway, config) = test_parts();
        let registry = ToolRegistry::new();
        let registry_names = registry.tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(gateway, config);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }
}
