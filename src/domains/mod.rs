//! Domains module containing business logic organized by bounded contexts.
//!
//! Each subdomain represents a specific area of functionality within the MCP
//! server. The only domain here is `tools`: the ArcGIS Location Services
//! endpoints exposed to MCP clients.

pub mod tools;
