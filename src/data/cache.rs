use crate::layers::base::LayerMetadata;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// In-memory layer metadata cache using LRU eviction
#[derive(Debug, Clone)]
pub struct MetadataCache {
    cache: Arc<Mutex<LruCache<String, Arc<LayerMetadata>>>>,
}

impl MetadataCache {
    /// Create a new cache with the given capacity (64 when zero)
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 { 64 } else { capacity };
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn get(&self, layer_id: &str) -> Option<Arc<LayerMetadata>> {
        self.cache.lock().ok()?.get(layer_id).cloned()
    }

    pub fn insert(&self, layer_id: impl Into<String>, metadata: LayerMetadata) -> Arc<LayerMetadata> {
        let metadata = Arc::new(metadata);
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(layer_id.into(), Arc::clone(&metadata));
        }
        metadata
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.cache
            .lock()
            .ok()
            .map(|cache| cache.contains(layer_id))
            .unwrap_or(false)
    }

    pub fn remove(&self, layer_id: &str) -> Option<Arc<LayerMetadata>> {
        self.cache.lock().ok()?.pop(layer_id)
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(64)
    }
}
