//! ArcGIS Location Services MCP server.
//!
//! This crate provides a Model Context Protocol (MCP) server that exposes
//! the ArcGIS Location Services REST suite (places search, geocoding,
//! routing, geoenrichment, elevation, basemap tiles) as callable tools.
//!
//! # Architecture
//!
//! - **core**: Shared infrastructure - configuration, error handling, the
//!   request gateway every tool delegates to, and the transport layer
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: The MCP tools, one file per upstream endpoint
//!
//! The request gateway (`core::gateway`) is the heart of the crate: tools
//! describe one logical call as a [`core::CallDescriptor`] and receive
//! either the parsed JSON success body or a normalized
//! [`core::GatewayError`] - never a raw transport failure.
//!
//! # Example
//!
//! ```rust,no_run
//! use arcgis_location_mcp_server::{core::Config, core::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config);
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{CallDescriptor, Config, Error, Gateway, GatewayError, McpServer, Method, Result};
