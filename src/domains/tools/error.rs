//! Tool-specific error types.
//!
//! Tool failures that must cross the MCP boundary as protocol errors rather
//! than as rendered tool output. Argument deserialization in the routes is
//! the main producer; rendered failures (upstream errors, bad coordinates)
//! stay inside `CallToolResult` and never pass through here.

use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool arguments did not deserialize into the params struct.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool execution failed before a result could be rendered.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl ToolError {
    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }
}

/// Map tool failures onto the JSON-RPC error codes the MCP client expects.
impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidArguments(msg) => McpError::invalid_params(msg, None),
            ToolError::ExecutionFailed(msg) => McpError::internal_error(msg, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_invalid_arguments_becomes_invalid_params() {
        let err: McpError = ToolError::invalid_arguments("missing field `stops`").into();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("missing field `stops`"));
    }

    #[test]
    fn test_execution_failed_becomes_internal_error() {
        let err: McpError = ToolError::execution_failed("router poisoned").into();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert!(err.message.contains("router poisoned"));
    }
}
