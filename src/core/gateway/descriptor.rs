//! Call descriptor types for the request gateway.
//!
//! A [`CallDescriptor`] captures one logical upstream call: target URL,
//! parameters, HTTP method, timeout, and an optional per-call token override.
//! Descriptors are built fluently by the tool that issues the call and
//! consumed by [`Gateway::execute`](super::Gateway::execute).

use std::time::Duration;

use serde_json::{Map, Value};

/// Default per-call timeout applied when the caller does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP methods supported by the gateway.
///
/// The upstream ArcGIS REST endpoints are driven exclusively through GET and
/// POST; restricting the type here makes an unsupported method a compile-time
/// impossibility rather than a runtime rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical request to an upstream ArcGIS endpoint.
///
/// Constructed fresh per invocation and owned by the calling tool. Parameter
/// keys are unique; values are JSON scalars (strings, numbers, booleans).
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    /// Absolute target URL.
    pub url: String,

    /// Request parameters. For GET these all become query parameters; for
    /// POST only `f` and `token` stay in the query string and the rest is
    /// serialized as the JSON body.
    pub params: Map<String, Value>,

    /// HTTP method for the exchange.
    pub method: Method,

    /// Per-call timeout.
    pub timeout: Duration,

    /// Optional credential override. Takes precedence over the gateway's
    /// process-wide default token.
    pub token: Option<String>,
}

impl CallDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Map::new(),
            method,
            timeout: DEFAULT_TIMEOUT,
            token: None,
        }
    }

    /// Create a GET descriptor for the given URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Create a POST descriptor for the given URL.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Set a parameter. Later calls with the same key overwrite earlier ones.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set a parameter only when `value` is `Some`.
    pub fn param_opt(self, key: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Override the default timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the process-wide credential for this call only.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
