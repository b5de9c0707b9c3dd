//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol. The server exposes tools only; each tool is defined in
//! `domains/tools/definitions/` and registered through the dynamically
//! built `ToolRouter`, so adding a tool does not require modifying this
//! file.

use rmcp::{
    ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use super::gateway::Gateway;
use crate::domains::tools::build_tool_router;

/// The main MCP server handler.
///
/// Holds the configuration and the request gateway shared by every tool,
/// and coordinates tool dispatch through the router.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Shared request gateway for upstream ArcGIS calls.
    gateway: Arc<Gateway>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let gateway = Arc::new(Gateway::new(config.credentials.arcgis_api_key.clone()));

        Self {
            tool_router: build_tool_router::<Self>(gateway.clone(), config.clone()),
            config,
            gateway,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the shared gateway.
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "ArcGIS Location Services server. Provides tools for places search, \
                 geocoding, reverse geocoding, routing, demographic enrichment, \
                 elevation lookups, and basemap tile checks."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_reports_config_identity() {
        let server = McpServer::new(Config::default());
        assert_eq!(server.name(), "arcgis-location-services");
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_server_capabilities_are_tools_only() {
        let server = McpServer::new(Config::default());
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
    }
}
