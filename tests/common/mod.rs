#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use terrastack::data::feature::Feature;
use terrastack::prelude::*;

/// In-memory layer service with call counting and an optional delay on
/// metadata lookups.
#[derive(Default)]
pub struct FakeService {
    pub metadata: HashMap<String, LayerMetadata>,
    pub features: Vec<Feature>,
    pub delay: Option<Duration>,
    pub metadata_calls: AtomicUsize,
    pub last_request: Mutex<Option<FeatureInfoRequest>>,
}

impl FakeService {
    pub fn new() -> Self {
        let mut metadata = HashMap::default();
        metadata.insert(
            "plots".to_string(),
            LayerMetadata::new(
                "MultiPolygon",
                vec![
                    PropertyInfo::new("khata_no", "int4"),
                    PropertyInfo::new("owner", "text"),
                    PropertyInfo::new("area", "float8"),
                ],
            ),
        );
        metadata.insert(
            "wells".to_string(),
            LayerMetadata::new("Point", vec![PropertyInfo::new("depth", "float8")]),
        );
        metadata.insert(
            "roads".to_string(),
            LayerMetadata::new("LineString", Vec::new()),
        );
        metadata.insert(
            "surveys".to_string(),
            LayerMetadata::new("GeometryCollection", Vec::new()),
        );
        Self {
            metadata,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LayerService for FakeService {
    async fn fetch_catalog(&self) -> Result<Vec<Layer>> {
        let mut layers: Vec<Layer> = self
            .metadata
            .keys()
            .map(|id| Layer::new(id.clone(), id.to_uppercase()))
            .collect();
        layers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(layers)
    }

    async fn fetch_metadata(&self, layer_id: &str) -> Result<LayerMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.metadata
            .get(layer_id)
            .cloned()
            .ok_or_else(|| MapError::Http {
                status: 404,
                url: format!("http://tiles/{layer_id}.json"),
            })
    }

    async fn fetch_feature_info(&self, request: &FeatureInfoRequest) -> Result<Vec<Feature>> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(self.features.clone())
    }

    async fn fetch_layer_extent(&self, _layer_id: &str) -> Result<ViewportExtent> {
        Ok(ViewportExtent::new(75.6, 20.9, 75.8, 21.1))
    }
}

/// Style document that also counts source registrations.
#[derive(Default)]
pub struct CountingRenderer {
    pub document: StyleDocument,
    pub source_adds: usize,
}

impl MapRenderer for CountingRenderer {
    fn add_source(&mut self, source: SourceSpec) -> Result<()> {
        self.source_adds += 1;
        self.document.add_source(source)
    }

    fn remove_source(&mut self, source_id: &str) -> Result<()> {
        self.document.remove_source(source_id)
    }

    fn add_layer(&mut self, layer: StyleLayer) -> Result<()> {
        self.document.add_layer(layer)
    }

    fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        self.document.remove_layer(layer_id)
    }

    fn has_source(&self, source_id: &str) -> bool {
        self.document.has_source(source_id)
    }

    fn has_layer(&self, layer_id: &str) -> bool {
        self.document.has_layer(layer_id)
    }

    fn canvas_size(&self) -> Point {
        self.document.canvas_size()
    }
}

pub fn manager_with(service: Arc<FakeService>) -> LayerManager<CountingRenderer> {
    let _ = env_logger::builder().is_test(true).try_init();
    LayerManager::new(
        CountingRenderer::default(),
        service,
        Arc::new(DirectTileSource::new("http://tiles.example:7800")),
    )
}
