//! Normalized gateway error type.

use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Normalized failure for one upstream call.
///
/// Every failure path through the gateway resolves to one of these variants;
/// no raw `reqwest` error crosses the gateway boundary. Each variant carries
/// a human-readable message and, where one exists, a numeric code suitable
/// for a one-line diagnostic.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, timeout. No HTTP status available.
    #[error("Request Error: {0}")]
    Transport(String),

    /// Non-2xx HTTP status. The code is the embedded ArcGIS error code when
    /// the body carried one, else the HTTP status itself.
    #[error("HTTP Error ({code}): {message}")]
    Status { code: i64, message: String },

    /// 2xx status but the body was not a JSON object.
    #[error("Invalid JSON response from ArcGIS API")]
    MalformedResponse,

    /// 2xx status with a decodable body that declares failure via a
    /// top-level `error` object. HTTP success never implies logical success.
    #[error("API Error ({code}): {message}")]
    Api { code: i64, message: String },

    /// Unexpected failure inside the gateway itself. Every upstream failure
    /// shape maps to one of the variants above, so the execute path does not
    /// produce this today; it is reserved for invariant violations in the
    /// gateway's own bookkeeping and stays part of the caller contract.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// The numeric status or error code, when this failure carries one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Status { code, .. } | Self::Api { code, .. } => Some(*code),
            Self::Transport(_) | Self::MalformedResponse | Self::Internal(_) => None,
        }
    }

    /// True when the failure happened before any HTTP status was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
