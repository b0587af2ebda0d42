use crate::core::config::{ServiceConfig, TileUrlStrategy};
use crate::data::service::{build_client, get_json};
use crate::{MapError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Anything that can produce the `{z}/{x}/{y}` tile URL template of a layer.
#[async_trait]
pub trait TileUrlResolver: Send + Sync {
    async fn tile_url(&self, layer_id: &str) -> Result<String>;
}

/// Serves tiles straight from the public tile server path.
pub struct DirectTileSource {
    base_url: String,
}

impl DirectTileSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn template(&self, layer_id: &str) -> String {
        format!("{}/{}/{{z}}/{{x}}/{{y}}.pbf", self.base_url, layer_id)
    }
}

#[async_trait]
impl TileUrlResolver for DirectTileSource {
    async fn tile_url(&self, layer_id: &str) -> Result<String> {
        Ok(self.template(layer_id))
    }
}

#[derive(Debug, Deserialize)]
struct TileUrlResponse {
    #[serde(default)]
    tile_url: Option<String>,
}

/// Asks the token-gated API for a pre-authorized tile URL template.
pub struct AuthorizedTileSource {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
    timeout: Duration,
}

impl AuthorizedTileSource {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            api_base: config.api_base().to_string(),
            token: config.token.clone(),
            timeout: config.request_timeout(),
        })
    }

    pub fn endpoint(&self, layer_id: &str) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &format!("{}/get_tile_url/", self.api_base),
            &[("table", layer_id)],
        )
        .map_err(|e| MapError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TileUrlResolver for AuthorizedTileSource {
    async fn tile_url(&self, layer_id: &str) -> Result<String> {
        let url = self.endpoint(layer_id)?;
        let response: TileUrlResponse = 
            get_json(&self.client, url, self.token.as_deref(), self.timeout).await?;
        response
            .tile_url
            .filter(|template| !template.is_empty())
            .ok_or_else(|| {
                MapError::Layer(format!("no tile URL returned for layer {layer_id}"))
            })
    }
}

/// Builds the resolver selected by the configuration.
pub fn resolver_for(config: &ServiceConfig) -> Result<Box<dyn TileUrlResolver>> {
    Ok(match config.tile_url_strategy {
        TileUrlStrategy::Direct => Box::new(DirectTileSource::new(config.tile_server())),
        TileUrlStrategy::Authorized => Box::new(AuthorizedTileSource::new(config)?),
    })
}
