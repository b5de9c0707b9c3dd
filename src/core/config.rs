//! Configuration management for the MCP server.
//!
//! A centralized configuration structure populated from environment
//! variables or defaults. The ArcGIS credential is read once at startup;
//! its absence is not fatal, calls simply proceed unauthenticated.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::transport::TransportConfig;

/// Environment variable holding the default ArcGIS API key.
pub const API_KEY_ENV: &str = "ARCGIS_LOCATION_SERVICE_API_KEY";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// ArcGIS credential configuration.
    pub credentials: CredentialsConfig,

    /// Upstream service base URLs.
    pub services: ServicesConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for the ArcGIS credential.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct CredentialsConfig {
    /// Default API key forwarded as the `token` parameter on every call
    /// that does not carry its own override. None means unauthenticated.
    pub arcgis_api_key: Option<String>,
}

/// Custom Debug implementation to redact the secret from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "arcgis_api_key",
                &self.arcgis_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Base URLs for the ArcGIS Location Services suite.
///
/// Defaults point at the production endpoints; tests override individual
/// entries to point at a local mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub basemap_url: String,
    pub places_url: String,
    pub geocode_url: String,
    pub routing_url: String,
    pub geoenrichment_url: String,
    pub elevation_url: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            basemap_url: "https://static-map-tiles-api.arcgis.com/arcgis/rest/services/static-basemap-tiles-service".to_string(),
            places_url: "https://places-api.arcgis.com/arcgis/rest/services/places-service/v1/places".to_string(),
            geocode_url: "https://geocode-api.arcgis.com/arcgis/rest/services/World/GeocodeServer".to_string(),
            routing_url: "https://route-api.arcgis.com/arcgis/rest/services/World/Route/NAServer/Route_World".to_string(),
            geoenrichment_url: "https://geoenrich.arcgis.com/arcgis/rest/services/World/geoenrichmentserver/Geoenrichment".to_string(),
            elevation_url: "https://elevation-api.arcgis.com/arcgis/rest/services/elevation-service/v1/elevation".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "arcgis-location-services".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            credentials: CredentialsConfig::default(),
            services: ServicesConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            config.credentials.arcgis_api_key = Some(api_key);
            info!("ArcGIS API key loaded from environment");
        } else {
            warn!(
                "{} not set - requests will be sent unauthenticated unless \
                 a per-call token is supplied",
                API_KEY_ENV
            );
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_credentials_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var(API_KEY_ENV, "test_key_12345");
        }
        let config = Config::from_env();
        assert_eq!(
            config.credentials.arcgis_api_key.as_deref(),
            Some("test_key_12345")
        );
        unsafe {
            std::env::remove_var(API_KEY_ENV);
        }
    }

    #[test]
    fn test_missing_credential_is_not_fatal() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var(API_KEY_ENV);
        }
        let config = Config::from_env();
        assert!(config.credentials.arcgis_api_key.is_none());
    }

    #[test]
    fn test_credentials_redacted_in_debug() {
        let creds = CredentialsConfig {
            arcgis_api_key: Some("super_secret_key".to_string()),
        };
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn test_default_service_urls_are_absolute() {
        let services = ServicesConfig::default();
        for url in [
            &services.basemap_url,
            &services.places_url,
            &services.geocode_url,
            &services.routing_url,
            &services.geoenrichment_url,
            &services.elevation_url,
        ] {
            assert!(url.starts_with("https://"), "not absolute: {}", url);
        }
    }
}
