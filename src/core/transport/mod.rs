//! Transport layer for the MCP server.
//!
//! The server communicates over STDIO, the standard MCP mode. The transport
//! service owns the connection lifecycle and delegates message processing to
//! the MCP server handler.

mod config;
mod error;
mod service;
mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;
