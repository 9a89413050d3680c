use crate::error::Result;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Options that identify one loadable model.
pub trait ModelOptions {
    /// Stable key; equal keys must load identical weights.
    fn cache_key(&self) -> String;
}

// Entries hold STRONG references: a model stays resident from its first load
// until process exit. There is no eviction.
type CacheStorage = HashMap<(TypeId, String), Box<dyn Any + Send + Sync>>;

pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn storage(&self) -> MutexGuard<'_, CacheStorage> {
        // A panicking loader never leaves a partial entry behind.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the cached value for `(M, key)`, running `loader` on first use only.
    ///
    /// A failed load caches nothing, so the next call runs `loader` again.
    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());

        let mut cache = self.storage();
        if let Some(strong) = cache
            .get(&cache_key)
            .and_then(|boxed| boxed.downcast_ref::<Arc<M>>())
        {
            debug!(key, "model cache hit");
            return Ok(Arc::clone(strong));
        }

        debug!(key, "model cache miss, loading");
        let model = Arc::new(loader()?);
        cache.insert(cache_key, Box::new(Arc::clone(&model)));

        Ok(model)
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        self.storage().clear();
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.storage().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.storage().is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

/// The process-wide cache every pipeline builder loads through.
pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}
