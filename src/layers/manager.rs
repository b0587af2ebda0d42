//! Layer lifecycle: keeps the set of active layers and the renderer's
//! sources and style layers in lockstep.
//!
//! Activation resolves a layer's metadata and tile URL remotely before
//! touching the renderer. The membership check and the in-flight guard are
//! taken synchronously, so a second activation of the same layer while the
//! first is resolving never fetches twice. Deactivating a layer whose
//! activation is still resolving abandons that activation.

use crate::core::config::ServiceConfig;
use crate::core::constants::{SOURCE_MAX_ZOOM, SOURCE_MIN_ZOOM, WMS_FEATURE_COUNT};
use crate::core::geo::{LatLng, Point};
use crate::core::viewport::{Viewport, ViewportExtent};
use crate::data::feature::{Feature, RenderedFeature};
use crate::data::filter::FilterDefinition;
use crate::data::service::{HttpLayerService, LayerService};
use crate::data::wms::FeatureInfoRequest;
use crate::layers::base::{GeometryKind, Layer, LayerMetadata};
use crate::layers::set::{ActiveLayer, ActiveLayerSet};
use crate::layers::style::LayerStyle;
use crate::prelude::HashMap;
use crate::rendering::renderer::{MapRenderer, SourceSpec, StyleLayer};
use crate::tiles::source::{resolver_for, TileUrlResolver};
use crate::ui::popup::{display_attributes, FeatureInfo, PopupAnchor};
use crate::{MapError, Result};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Outcome of a successful [`LayerManager::activate_layer`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The layer was registered with the renderer and added to the set.
    Activated,
    /// The layer was already active; nothing changed.
    AlreadyActive,
    /// Another activation of the same layer is still resolving.
    Pending,
    /// The layer was deactivated before its activation resolved.
    Abandoned,
}

struct State<R> {
    renderer: R,
    active: ActiveLayerSet,
    /// Layer id -> ticket of the activation currently resolving it
    in_flight: HashMap<String, u64>,
    next_ticket: u64,
}

/// Everything remote that activation needs.
struct Resolved {
    metadata: LayerMetadata,
    geometry: GeometryKind,
    style: LayerStyle,
    tile_url: String,
}

/// Owns the active layer set and the renderer handle.
pub struct LayerManager<R: MapRenderer> {
    service: Arc<dyn LayerService>,
    tiles: Arc<dyn TileUrlResolver>,
    state: Mutex<State<R>>,
    timeout: Duration,
    min_zoom: u8,
    max_zoom: u8,
    feature_count: u32,
}

impl<R: MapRenderer> LayerManager<R> {
    pub fn new(renderer: R, service: Arc<dyn LayerService>, tiles: Arc<dyn TileUrlResolver>) -> Self {
        Self {
            service,
            tiles,
            state: Mutex::new(State {
                renderer,
                active: ActiveLayerSet::new(),
                in_flight: HashMap::default(),
                next_ticket: 0,
            }),
            timeout: ServiceConfig::default().request_timeout(),
            min_zoom: SOURCE_MIN_ZOOM,
            max_zoom: SOURCE_MAX_ZOOM,
            feature_count: WMS_FEATURE_COUNT,
        }
    }

    /// Manager talking HTTP to the services described by `config`.
    pub fn from_config(config: &ServiceConfig, renderer: R) -> Result<Self> {
        let service = HttpLayerService::new(config.clone())?;
        let tiles: Arc<dyn TileUrlResolver> = Arc::from(resolver_for(config)?);
        Ok(Self::new(renderer, Arc::new(service), tiles)
            .with_timeout(config.request_timeout())
            .with_zoom_range(config.min_zoom, config.max_zoom)
            .with_feature_count(config.feature_count))
    }

    /// Upper bound for each remote call made by the manager.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Zoom range registered for data sources.
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Maximum number of features returned by a click query.
    pub fn with_feature_count(mut self, feature_count: u32) -> Self {
        self.feature_count = feature_count;
        self
    }

    fn state(&self) -> MutexGuard<'_, State<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn bounded<T>(&self, what: String, future: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, future)
            .await
            .map_err(|_| MapError::Timeout {
                what,
                after: self.timeout,
            })?
    }

    /// Layers published by the catalog.
    pub async fn catalog(&self) -> Result<Vec<Layer>> {
        self.bounded("layer catalog".to_string(), self.service.fetch_catalog())
            .await
    }

    /// Adds `layer` to the map unless it is already active or activating.
    ///
    /// On a metadata or tile URL failure, a missing or unsupported geometry
    /// type, or a renderer error, the active set is left unchanged and the
    /// error is logged and returned.
    pub async fn activate_layer(&self, layer: &Layer) -> Result<Activation> {
        let ticket = {
            let mut state = self.state();
            if state.active.contains(&layer.id) {
                log::debug!("layer {} is already active", layer.id);
                return Ok(Activation::AlreadyActive);
            }
            if state.in_flight.contains_key(&layer.id) {
                log::debug!("layer {} is already activating", layer.id);
                return Ok(Activation::Pending);
            }
            state.next_ticket += 1;
            let ticket = state.next_ticket;
            state.in_flight.insert(layer.id.clone(), ticket);
            ticket
        };

        let resolved = self.resolve(layer).await;

        let mut state = self.state();
        if state.in_flight.get(&layer.id) != Some(&ticket) {
            log::info!("activation of layer {} abandoned", layer.id);
            return Ok(Activation::Abandoned);
        }
        state.in_flight.remove(&layer.id);

        let result = resolved.and_then(|resolved| self.register(&mut state, layer, resolved));
        match &result {
            Ok(_) => log::info!("activated layer {}", layer.id),
            Err(e) => log::error!("failed to activate layer {}: {}", layer.id, e),
        }
        result
    }

    /// Activates several layers concurrently. Results are in input order.
    pub async fn activate_all(&self, layers: &[Layer]) -> Vec<Result<Activation>> {
        futures::future::join_all(layers.iter().map(|layer| self.activate_layer(layer))).await
    }

    async fn resolve(&self, layer: &Layer) -> Result<Resolved> {
        let metadata = self
            .bounded(
                format!("metadata of layer {}", layer.id),
                self.service.fetch_metadata(&layer.id),
            )
            .await?;

        let geometry = metadata
            .geometry_kind()
            .ok_or_else(|| MapError::MissingGeometry(layer.id.clone()))?;
        let kind = geometry
            .style_kind()
            .ok_or_else(|| MapError::UnsupportedGeometry(geometry.to_string()))?;

        let tile_url = self
            .bounded(
                format!("tile URL of layer {}", layer.id),
                self.tiles.tile_url(&layer.id),
            )
            .await?;

        Ok(Resolved {
            metadata,
            geometry,
            style: LayerStyle::new(kind),
            tile_url,
        })
    }

    fn register(&self, state: &mut State<R>, layer: &Layer, resolved: Resolved) -> Result<Activation> {
        let source_id = layer.source_id();
        state.renderer.add_source(SourceSpec {
            id: source_id.clone(),
            tiles: vec![resolved.tile_url.clone()],
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
        })?;

        let style_layer = StyleLayer {
            id: layer.style_layer_id(),
            kind: resolved.style.kind.to_string(),
            source: source_id.clone(),
            source_layer: Some(layer.id.clone()),
            paint: resolved.style.paint.clone(),
        };
        if let Err(e) = state.renderer.add_layer(style_layer) {
            if let Err(cleanup) = state.renderer.remove_source(&source_id) {
                log::warn!("could not roll back source {}: {}", source_id, cleanup);
            }
            return Err(e);
        }

        state.active.insert(ActiveLayer {
            layer: layer.clone(),
            geometry: resolved.geometry,
            style: resolved.style,
            metadata: resolved.metadata,
            tile_url: resolved.tile_url,
            overlays: Vec::new(),
        });
        Ok(Activation::Activated)
    }

    /// Removes a layer from the map. Returns whether anything changed:
    /// an active layer was removed or a pending activation was abandoned.
    pub fn deactivate_layer(&self, layer_id: &str) -> bool {
        let mut state = self.state();
        if state.in_flight.remove(layer_id).is_some() {
            log::info!("abandoning pending activation of layer {}", layer_id);
            return true;
        }
        let Some(active) = state.active.remove(layer_id) else {
            return false;
        };
        Self::unregister(&mut state.renderer, &active);
        log::info!("deactivated layer {}", layer_id);
        true
    }

    fn unregister(renderer: &mut R, active: &ActiveLayer) {
        for overlay in &active.overlays {
            if let Err(e) = renderer.remove_layer(overlay) {
                log::warn!("could not remove overlay {}: {}", overlay, e);
            }
        }
        let style_layer_id = active.layer.style_layer_id();
        if let Err(e) = renderer.remove_layer(&style_layer_id) {
            log::warn!("could not remove style layer {}: {}", style_layer_id, e);
        }
        let source_id = active.layer.source_id();
        if let Err(e) = renderer.remove_source(&source_id) {
            log::warn!("could not remove source {}: {}", source_id, e);
        }
    }

    /// Removes every layer from the map and abandons pending activations.
    pub fn teardown(&self) {
        let mut state = self.state();
        state.in_flight.clear();
        for active in state.active.drain() {
            Self::unregister(&mut state.renderer, &active);
        }
        log::debug!("layer manager torn down");
    }

    /// Attributes of a clicked feature on an active layer, with a popup
    /// anchor that keeps the popup inside the canvas. `None` when the layer
    /// is not active.
    pub fn handle_feature_click(
        &self,
        layer_id: &str,
        point: Point,
        feature: &RenderedFeature,
    ) -> Option<FeatureInfo> {
        let state = self.state();
        let active = state.active.get(layer_id)?;
        Some(FeatureInfo {
            layer_id: active.layer.id.clone(),
            layer_name: active.layer.display_name().to_string(),
            attributes: display_attributes(&active.metadata, feature),
            anchor: PopupAnchor::for_feature_popup(point, state.renderer.canvas_size()),
        })
    }

    /// Features of an active layer near `clicked`, optionally filtered.
    pub async fn query_features(
        &self,
        layer_id: &str,
        clicked: LatLng,
        viewport: &Viewport,
        filter: Option<&FilterDefinition>,
    ) -> Result<Vec<Feature>> {
        if !self.is_active(layer_id) {
            return Err(MapError::Layer(format!("layer {layer_id} is not active")));
        }
        let request = FeatureInfoRequest::from_viewport(layer_id, clicked, viewport)
            .with_filter(filter)
            .with_feature_count(self.feature_count);
        self.bounded(
            format!("feature info of layer {layer_id}"),
            self.service.fetch_feature_info(&request),
        )
        .await
    }

    /// Bounding box of all features in a layer.
    pub async fn layer_extent(&self, layer_id: &str) -> Result<ViewportExtent> {
        self.bounded(
            format!("extent of layer {layer_id}"),
            self.service.fetch_layer_extent(layer_id),
        )
        .await
    }

    /// Adds an auxiliary style layer drawing `layer_id`'s source. The
    /// overlay is removed together with the layer.
    pub fn add_overlay(&self, layer_id: &str, mut overlay: StyleLayer) -> Result<()> {
        let mut state = self.state();
        let State {
            renderer, active, ..
        } = &mut *state;
        let active = active
            .get_mut(layer_id)
            .ok_or_else(|| MapError::Layer(format!("layer {layer_id} is not active")))?;

        overlay.source = active.layer.source_id();
        overlay.source_layer = Some(active.layer.id.clone());
        let overlay_id = overlay.id.clone();
        renderer.add_layer(overlay)?;
        active.overlays.push(overlay_id);
        Ok(())
    }

    /// Removes an overlay added with [`add_overlay`](Self::add_overlay).
    pub fn remove_overlay(&self, overlay_id: &str) -> Result<bool> {
        let mut state = self.state();
        let State {
            renderer, active, ..
        } = &mut *state;
        let Some(owner) = active
            .iter()
            .find(|a| a.overlays.iter().any(|o| o == overlay_id))
            .map(|a| a.layer.id.clone())
        else {
            return Ok(false);
        };

        renderer.remove_layer(overlay_id)?;
        if let Some(owner) = active.get_mut(&owner) {
            owner.overlays.retain(|o| o != overlay_id);
        }
        Ok(true)
    }

    pub fn is_active(&self, layer_id: &str) -> bool {
        self.state().active.contains(layer_id)
    }

    pub fn is_pending(&self, layer_id: &str) -> bool {
        self.state().in_flight.contains_key(layer_id)
    }

    /// Ids of active layers in activation order.
    pub fn active_ids(&self) -> Vec<String> {
        self.state().active.ids()
    }

    /// Snapshot of the active layers in activation order.
    pub fn active_layers(&self) -> Vec<ActiveLayer> {
        self.state().active.iter().cloned().collect()
    }

    pub fn metadata(&self, layer_id: &str) -> Option<LayerMetadata> {
        self.state().active.get(layer_id).map(|a| a.metadata.clone())
    }

    /// Runs `f` with shared access to the renderer.
    pub fn with_renderer<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R) -> T,
    {
        f(&self.state().renderer)
    }

    pub fn len(&self) -> usize {
        self.state().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feature::Feature;
    use crate::layers::base::PropertyInfo;
    use crate::rendering::style_document::StyleDocument;
    use crate::tiles::source::DirectTileSource;
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticService {
        metadata: HashMap<String, LayerMetadata>,
    }

    #[async_trait]
    impl LayerService for StaticService {
        async fn fetch_catalog(&self) -> Result<Vec<Layer>> {
            Ok(self
                .metadata
                .keys()
                .map(|id| Layer::new(id.clone(), id.clone()))
                .collect())
        }

        async fn fetch_metadata(&self, layer_id: &str) -> Result<LayerMetadata> {
            tokio::task::yield_now().await;
            self.metadata
                .get(layer_id)
                .cloned()
                .ok_or_else(|| MapError::Http {
                    status: 404,
                    url: format!("http://tiles/{layer_id}.json"),
                })
        }

        async fn fetch_feature_info(&self, _request: &FeatureInfoRequest) -> Result<Vec<Feature>> {
            Ok(Vec::new())
        }

        async fn fetch_layer_extent(&self, _layer_id: &str) -> Result<ViewportExtent> {
            Ok(ViewportExtent::new(0.0, 0.0, 1.0, 1.0))
        }
    }

    fn manager() -> LayerManager<StyleDocument> {
        let mut metadata = HashMap::default();
        metadata.insert(
            "plots".to_string(),
            LayerMetadata::new(
                "MultiPolygon",
                vec![PropertyInfo::new("owner", "text"), PropertyInfo::new("area", "float8")],
            ),
        );
        metadata.insert("wells".to_string(), LayerMetadata::new("Point", Vec::new()));
        metadata.insert("tin".to_string(), LayerMetadata::new("Tin", Vec::new()));
        metadata.insert("blank".to_string(), LayerMetadata::default());

        LayerManager::new(
            StyleDocument::new(Point::new(800.0, 600.0)),
            Arc::new(StaticService { metadata }),
            Arc::new(DirectTileSource::new("http://tiles")),
        )
    }

    #[tokio::test]
    async fn test_activate_registers_source_and_layer() {
        let manager = manager();
        let plots = Layer::new("plots", "Plots");

        assert_eq!(manager.activate_layer(&plots).await.unwrap(), Activation::Activated);
        assert!(manager.is_active("plots"));
        manager.with_renderer(|doc| {
            assert_eq!(
                doc.source("plots-source").unwrap()["tiles"][0],
                "http://tiles/plots/{z}/{x}/{y}.pbf"
            );
            let layer = doc.layer("plots-layer").unwrap();
            assert_eq!(layer["type"], "fill");
            assert_eq!(layer["source-layer"], "plots");
        });
    }

    #[tokio::test]
    async fn test_second_activation_is_noop() {
        let manager = manager();
        let wells = Layer::new("wells", "Wells");
        manager.activate_layer(&wells).await.unwrap();
        assert_eq!(manager.activate_layer(&wells).await.unwrap(), Activation::AlreadyActive);
        assert_eq!(manager.len(), 1);
        manager.with_renderer(|doc| assert_eq!(doc.layer("wells-layer").unwrap()["type"], "circle"));
    }

    #[tokio::test]
    async fn test_failures_leave_set_unchanged() {
        let manager = manager();

        let err = manager.activate_layer(&Layer::new("tin", "")).await.unwrap_err();
        assert!(matches!(err, MapError::UnsupportedGeometry(ref kind) if kind == "Tin"));

        let err = manager.activate_layer(&Layer::new("blank", "")).await.unwrap_err();
        assert!(matches!(err, MapError::MissingGeometry(_)));

        let err = manager.activate_layer(&Layer::new("missing", "")).await.unwrap_err();
        assert!(matches!(err, MapError::Http { status: 404, .. }));

        assert!(manager.is_empty());
        assert!(!manager.is_pending("tin"));
        manager.with_renderer(|doc| assert!(doc.layer_ids().is_empty()));
    }

    #[tokio::test]
    async fn test_deactivate() {
        let manager = manager();
        assert!(!manager.deactivate_layer("plots"));

        manager.activate_layer(&Layer::new("plots", "Plots")).await.unwrap();
        assert!(manager.deactivate_layer("plots"));
        assert!(!manager.is_active("plots"));
        manager.with_renderer(|doc| {
            assert!(!doc.has_layer("plots-layer"));
            assert!(!doc.has_source("plots-source"));
        });
    }

    #[tokio::test]
    async fn test_feature_click() {
        let manager = manager();
        manager.activate_layer(&Layer::new("plots", "Plots")).await.unwrap();

        let feature = RenderedFeature::new(json!({"owner": "Patil"}).as_object().cloned().unwrap());
        let info = manager
            .handle_feature_click("plots", Point::new(790.0, 40.0), &feature)
            .unwrap();

        assert_eq!(info.layer_name, "Plots");
        assert_eq!(info.attribute("owner"), Some("Patil"));
        assert_eq!(info.attribute("area"), Some("N/A"));
        assert_eq!(info.anchor.origin, Point::new(600.0, 40.0));

        assert!(manager
            .handle_feature_click("wells", Point::new(0.0, 0.0), &feature)
            .is_none());
    }

    #[tokio::test]
    async fn test_overlays_follow_their_layer() {
        let manager = manager();
        manager.activate_layer(&Layer::new("plots", "Plots")).await.unwrap();

        let overlay = StyleLayer {
            id: "plots-heatmap".to_string(),
            kind: "heatmap".to_string(),
            source: String::new(),
            source_layer: None,
            paint: json!({}),
        };
        manager.add_overlay("plots", overlay.clone()).unwrap();
        assert!(manager.add_overlay("wells", overlay).is_err());
        manager.with_renderer(|doc| {
            assert_eq!(doc.layer("plots-heatmap").unwrap()["source"], "plots-source")
        });

        manager.deactivate_layer("plots");
        manager.with_renderer(|doc| assert!(doc.layer_ids().is_empty()));
        assert!(!manager.remove_overlay("plots-heatmap").unwrap());
    }

    #[tokio::test]
    async fn test_teardown_clears_everything() {
        let manager = manager();
        let results = manager
            .activate_all(&[Layer::new("plots", "Plots"), Layer::new("wells", "Wells")])
            .await;
        assert!(results.iter().all(|r| matches!(r, Ok(Activation::Activated))));
        assert_eq!(manager.len(), 2);

        manager.teardown();
        assert!(manager.is_empty());
        manager.with_renderer(|doc| assert!(doc.layer_ids().is_empty()));
    }

    #[tokio::test]
    async fn test_query_features_requires_active_layer() {
        let manager = manager();
        let viewport = Viewport::default();
        let err = manager
            .query_features("plots", LatLng::new(21.0, 75.7), &viewport, None)
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::Layer(_)));

        manager.activate_layer(&Layer::new("plots", "Plots")).await.unwrap();
        let features = manager
            .query_features("plots", LatLng::new(21.0, 75.7), &viewport, None)
            .await
            .unwrap();
        assert!(features.is_empty());
    }
}
