use super::source::{FetchError, TileImage, TileSource};
use crate::core::geo::TileCoord;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

const DEFAULT_CAPACITY: usize = 256;

/// In-memory LRU cache in front of another tile source.
///
/// Only successful fetches are cached, so a tile that failed once is retried
/// on the next render. The lock is not held while the inner source fetches.
pub struct CachedTileSource<S> {
    inner: S,
    cache: Mutex<LruCache<TileCoord, TileImage>>,
}

impl<S: TileSource> CachedTileSource<S> {
    /// Create a new cache with the given capacity (zero falls back to the default)
    pub fn new(inner: S, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Check if a tile is in the cache
    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.cache
            .lock()
            .map(|cache| cache.contains(coord))
            .unwrap_or(false)
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all tiles from the cache
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl<S: TileSource> TileSource for CachedTileSource<S> {
    fn fetch(&self, coord: TileCoord) -> Result<TileImage, FetchError> {
        if let Some(tile) = self.cache.lock().ok().and_then(|mut c| c.get(&coord).cloned()) {
            log::trace!("cache hit for tile {}", coord);
            return Ok(tile);
        }

        let tile = self.inner.fetch(coord)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(coord, tile.clone());
        }
        Ok(tile)
    }
}
