//! Session-scoped asset loading and caching.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::data::AnimationAsset;
use crate::decode;
use crate::error::AssetError;

/// Host-side byte storage, addressed by asset path.
pub trait AssetSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError>;
}

/// Decoded-asset cache over an [`AssetSource`].
///
/// Explicitly constructed and owned by the game session, created at session
/// start and dropped with it; there is deliberately no process-wide
/// singleton. Assets are decoded once per path and shared by `Arc`.
pub struct AssetRegistry<S: AssetSource> {
    source: S,
    cache: LruCache<String, Arc<AnimationAsset>>,
}

impl<S: AssetSource> AssetRegistry<S> {
    /// Registry holding at most `capacity` decoded assets.
    pub fn new(source: S, capacity: NonZeroUsize) -> Self {
        Self {
            source,
            cache: LruCache::new(capacity),
        }
    }

    /// Load an asset, hitting the cache when possible.
    ///
    /// Decode failures propagate; a malformed asset is never silently
    /// replaced by a partial or cached substitute.
    pub fn load(&mut self, path: &str) -> Result<Arc<AnimationAsset>, AssetError> {
        if let Some(asset) = self.cache.get(path) {
            return Ok(Arc::clone(asset));
        }

        let bytes = self.source.read(path)?;
        let asset = decode::decode(&bytes).map_err(|source| AssetError::Decode {
            path: path.to_string(),
            source,
        })?;
        log::debug!(
            "decoded animation '{}' ({} parts, {} events) from '{path}'",
            asset.name,
            asset.parts.len(),
            asset.events.len()
        );

        let asset = Arc::new(asset);
        self.cache.put(path.to_string(), Arc::clone(&asset));
        Ok(asset)
    }

    /// Drop one cached entry (e.g. after the source file changed).
    pub fn invalidate(&mut self, path: &str) {
        self.cache.pop(path);
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of currently cached assets.
    #[inline]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
