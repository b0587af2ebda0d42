//! Remote layer catalog, metadata and feature-query services.

use crate::core::config::ServiceConfig;
use crate::core::viewport::ViewportExtent;
use crate::data::cache::MetadataCache;
use crate::data::feature::{Feature, FeatureCollection};
use crate::data::wms::FeatureInfoRequest;
use crate::layers::base::{Layer, LayerMetadata};
use crate::{MapError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Remote collaborators of the layer manager.
#[async_trait]
pub trait LayerService: Send + Sync {
    /// Every layer the tile server publishes.
    async fn fetch_catalog(&self) -> Result<Vec<Layer>>;

    /// Geometry type and attribute columns of one layer.
    async fn fetch_metadata(&self, layer_id: &str) -> Result<LayerMetadata>;

    /// Features near a clicked point.
    async fn fetch_feature_info(&self, request: &FeatureInfoRequest) -> Result<Vec<Feature>>;

    /// Bounding box of all features in a layer.
    async fn fetch_layer_extent(&self, layer_id: &str) -> Result<ViewportExtent>;
}

/// Builds the shared HTTP client with the configured user agent and timeout.
pub(crate) fn build_client(config: &ServiceConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .build()?)
}

/// GETs `url` with an optional bearer token and decodes the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: reqwest::Url,
    token: Option<&str>,
    timeout: Duration,
) -> Result<T> {
    log::debug!("GET {}", url);

    let mut request = client.get(url.clone());
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| request_error(e, &url, timeout))?;
    let status = response.status();
    if !status.is_success() {
        log::warn!("GET {} failed: {}", url, status);
        return Err(MapError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.bytes().await.map_err(|e| request_error(e, &url, timeout))?;
    Ok(serde_json::from_slice(&body)?)
}

fn request_error(error: reqwest::Error, url: &reqwest::Url, timeout: Duration) -> MapError {
    if error.is_timeout() {
        MapError::Timeout {
            what: url.to_string(),
            after: timeout,
        }
    } else {
        MapError::Network(error)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Accepts either an object keyed by layer id or an array of entries.
pub(crate) fn parse_catalog(value: Value) -> Result<Vec<Layer>> {
    let entries: Vec<(Option<String>, Value)> = match value {
        Value::Object(map) => map.into_iter().map(|(key, entry)| (Some(key), entry)).collect(),
        Value::Array(items) => items.into_iter().map(|entry| (None, entry)).collect(),
        other => {
            return Err(MapError::ParseError(format!(
                "layer catalog must be an object or array, got {other}"
            )))
        }
    };

    let mut layers = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let entry: CatalogEntry = serde_json::from_value(entry)?;
        let Some(id) = entry.id.or(key).filter(|id| !id.is_empty()) else {
            log::warn!("skipping catalog entry without an id");
            continue;
        };
        let name = entry.name.filter(|n| !n.is_empty()).unwrap_or_else(|| id.clone());
        layers.push(Layer::new(id, name));
    }
    Ok(layers)
}

#[derive(Debug, Deserialize)]
struct ExtentResponse {
    #[serde(default)]
    extent: Vec<f64>,
}

/// HTTP implementation against the tile server and the REST API.
pub struct HttpLayerService {
    client: reqwest::Client,
    config: ServiceConfig,
    cache: MetadataCache,
}

impl HttpLayerService {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: build_client(&config)?,
            cache: MetadataCache::new(config.metadata_cache_size),
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Metadata fetched earlier, without a request.
    pub fn cached_metadata(&self, layer_id: &str) -> Option<LayerMetadata> {
        self.cache.get(layer_id).map(|m| m.as_ref().clone())
    }

    pub fn catalog_url(&self) -> Result<reqwest::Url> {
        parse_url(&format!("{}/index.json", self.config.tile_server()))
    }

    pub fn metadata_url(&self, layer_id: &str) -> Result<reqwest::Url> {
        parse_url(&format!("{}/{}.json", self.config.tile_server(), layer_id))
    }

    pub fn extent_url(&self, layer_id: &str) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &format!("{}/layer-extent/", self.config.api_base()),
            &[("layer", layer_id)],
        )
        .map_err(|e| MapError::ParseError(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T> {
        get_json(
            &self.client,
            url,
            self.config.token.as_deref(),
            self.config.request_timeout(),
        )
        .await
    }
}

fn parse_url(url: &str) -> Result<reqwest::Url> {
    reqwest::Url::parse(url).map_err(|e| MapError::ParseError(format!("{url}: {e}")))
}

#[async_trait]
impl LayerService for HttpLayerService {
    async fn fetch_catalog(&self) -> Result<Vec<Layer>> {
        let value: Value = self.get(self.catalog_url()?).await?;
        let layers = parse_catalog(value)?;
        log::info!("fetched {} layers from catalog", layers.len());
        Ok(layers)
    }

    async fn fetch_metadata(&self, layer_id: &str) -> Result<LayerMetadata> {
        if let Some(metadata) = self.cache.get(layer_id) {
            log::debug!("metadata cache hit for {}", layer_id);
            return Ok(metadata.as_ref().clone());
        }
        let metadata: LayerMetadata = self.get(self.metadata_url(layer_id)?).await?;
        self.cache.insert(layer_id, metadata.clone());
        Ok(metadata)
    }

    async fn fetch_feature_info(&self, request: &FeatureInfoRequest) -> Result<Vec<Feature>> {
        let collection: FeatureCollection = self.get(request.url(self.config.api_base())?).await?;
        log::debug!(
            "GetFeatureInfo on {} returned {} features",
            request.layer_name,
            collection.features.len()
        );
        Ok(collection.features)
    }

    async fn fetch_layer_extent(&self, layer_id: &str) -> Result<ViewportExtent> {
        let response: ExtentResponse = self.get(self.extent_url(layer_id)?).await?;
        ViewportExtent::from_slice(&response.extent).ok_or_else(|| {
            MapError::ParseError(format!(
                "extent of layer {layer_id} must have 4 values, got {}",
                response.extent.len()
            ))
        })
    }
}
