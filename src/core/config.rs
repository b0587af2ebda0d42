//! Service configuration for the layer catalog, tile server and feature
//! query endpoints.
//!
//! Configuration can be built in code with the `with_*` methods or loaded
//! from JSON. Unspecified fields fall back to the defaults below.

use crate::core::constants::{SOURCE_MAX_ZOOM, SOURCE_MIN_ZOOM, WMS_FEATURE_COUNT};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the tile URL template of a layer is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileUrlStrategy {
    /// `{tile_server}/{layer}/{z}/{x}/{y}.pbf`
    #[default]
    Direct,
    /// Ask the token-gated API for a pre-authorized template.
    Authorized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the vector tile server (catalog, metadata and tiles)
    pub tile_server_url: String,
    /// Base URL of the REST API (WMS proxy, tile authorization, extents)
    pub api_base_url: String,
    /// Opaque bearer token attached to every outbound request
    pub token: Option<String>,
    /// Upper bound for every remote call
    pub request_timeout_ms: u64,
    pub user_agent: String,
    pub tile_url_strategy: TileUrlStrategy,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// FEATURE_COUNT sent with GetFeatureInfo queries
    pub feature_count: u32,
    /// Number of layer metadata documents kept in memory
    pub metadata_cache_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            tile_server_url: "http://localhost:7800".to_string(),
            api_base_url: "http://localhost:8000/api".to_string(),
            token: None,
            request_timeout_ms: 10_000,
            user_agent: concat!("terrastack/", env!("CARGO_PKG_VERSION")).to_string(),
            tile_url_strategy: TileUrlStrategy::Direct,
            min_zoom: SOURCE_MIN_ZOOM,
            max_zoom: SOURCE_MAX_ZOOM,
            feature_count: WMS_FEATURE_COUNT,
            metadata_cache_size: 64,
        }
    }
}

impl ServiceConfig {
    pub fn new(tile_server_url: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            tile_server_url: tile_server_url.into(),
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Parses a JSON document and validates the result.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_tile_url_strategy(mut self, strategy: TileUrlStrategy) -> Self {
        self.tile_url_strategy = strategy;
        self
    }

    pub fn with_feature_count(mut self, feature_count: u32) -> Self {
        self.feature_count = feature_count;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Tile server base URL without a trailing slash.
    pub fn tile_server(&self) -> &str {
        self.tile_server_url.trim_end_matches('/')
    }

    /// API base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("tile_server_url", &self.tile_server_url),
            ("api_base_url", &self.api_base_url),
        ] {
            if url.trim().is_empty() {
                return Err(MapError::Config(format!("{name} must not be empty")));
            }
            reqwest::Url::parse(url)
                .map_err(|e| MapError::Config(format!("{name} {url:?} is not a valid URL: {e}")))?;
        }
        if self.request_timeout_ms == 0 {
            return Err(MapError::Config(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.min_zoom > self.max_zoom {
            return Err(MapError::Config(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tile_url_strategy, TileUrlStrategy::Direct);
        assert_eq!(config.feature_count, 10);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_with_timeout_saturates() {
        let config = ServiceConfig::default().with_timeout(Duration::from_millis(2500));
        assert_eq!(config.request_timeout_ms, 2500);

        let config = ServiceConfig::default().with_timeout(Duration::MAX);
        assert_eq!(config.request_timeout_ms, u64::MAX);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = ServiceConfig::from_json(
            r#"{"tile_server_url": "http://tiles.example/", "tile_url_strategy": "authorized"}"#,
        )
        .unwrap();
        assert_eq!(config.tile_server(), "http://tiles.example");
        assert_eq!(config.tile_url_strategy, TileUrlStrategy::Authorized);
        assert_eq!(config.max_zoom, 22);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ServiceConfig::new("", "http://api.example");
        assert!(matches!(config.validate(), Err(MapError::Config(_))));

        let config = ServiceConfig::new("not a url", "http://api.example");
        assert!(matches!(config.validate(), Err(MapError::Config(_))));

        let config = ServiceConfig::default().with_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(MapError::Config(_))));
    }

    #[test]
    fn test_builder_methods() {
        let config = ServiceConfig::new("http://t", "http://a/api/")
            .with_token("secret")
            .with_feature_count(5)
            .with_timeout(Duration::from_millis(250));
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.api_base(), "http://a/api");
        assert_eq!(config.feature_count, 5);
        assert_eq!(config.request_timeout_ms, 250);
    }
}
