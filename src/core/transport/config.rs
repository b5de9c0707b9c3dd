//! Transport configuration types.

use serde::{Deserialize, Serialize};

/// Transport configuration options.
///
/// STDIO is the only transport: MCP clients spawn the server as a child
/// process and speak JSON-RPC over its stdin/stdout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport.
    #[default]
    Stdio,
}

impl TransportConfig {
    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
        }
    }
}
