/*
 *  assets.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Asset store boundary and the timed caches for logo/symbol handles
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Non-owning reference into an asset store. The store keeps the pixel data;
/// the engine only holds the handle plus a cached-validity timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Packed 1bpp raster, rows MSB first
#[derive(Debug, Clone)]
pub struct AssetRaster {
    pub width: u32,
    pub height: u32,
    pub bits: Vec<u8>,
}

/// Boundary to the external logo/symbol store. Decoding image files is the
/// store's business; the engine sees resolved handles and rasters only.
pub trait AssetStore: Send {
    /// Look up an asset by name
    fn resolve(&self, name: &str) -> Option<AssetHandle>;

    /// Whether a previously resolved handle should be re-resolved
    fn is_stale(&self, handle: &AssetHandle, now: Instant) -> bool;

    /// Pixel data for a resolved handle
    fn raster(&self, handle: &AssetHandle) -> Option<AssetRaster>;
}

/// One name-keyed cached handle, re-resolved after a staleness window.
///
/// An unresolved name is retried on the same cadence, so a logo that appears
/// on disk later shows up without a restart; meanwhile the panel is simply
/// omitted.
pub struct CachedAsset {
    name: String,
    handle: Option<AssetHandle>,
    checked_at: Option<Instant>,
    refresh_every: Duration,
}

impl CachedAsset {
    pub fn new(name: impl Into<String>, refresh_every: Duration) -> Self {
        Self {
            name: name.into(),
            handle: None,
            checked_at: None,
            refresh_every,
        }
    }

    pub fn set_name(&mut self, name: &str) {
        if self.name != name {
            self.name = name.to_string();
            self.handle = None;
            self.checked_at = None;
        }
    }

    pub fn name(&self) -> &str { &self.name }

    /// Current handle, consulting the store when the cache window lapsed
    pub fn get(&mut self, store: &dyn AssetStore, now: Instant) -> Option<&AssetHandle> {
        let due = match self.checked_at {
            None => true,
            Some(t) => now.duration_since(t) >= self.refresh_every,
        };
        let stale = self
            .handle
            .as_ref()
            .map(|h| store.is_stale(h, now))
            .unwrap_or(false);

        if due || stale {
            self.handle = store.resolve(&self.name);
            self.checked_at = Some(now);
        }
        self.handle.as_ref()
    }
}

/// In-memory store used by tests and the demo binary.
pub struct MemoryAssetStore {
    assets: HashMap<String, AssetRaster>,
    loaded_at: Instant,
    stale_after: Option<Duration>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
            loaded_at: Instant::now(),
            stale_after: None,
        }
    }

    pub fn with_staleness(mut self, stale_after: Duration) -> Self {
        self.stale_after = Some(stale_after);
        self
    }

    pub fn insert(&mut self, name: &str, raster: AssetRaster) {
        self.assets.insert(name.to_string(), raster);
    }
}

impl Default for MemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStore for MemoryAssetStore {
    fn resolve(&self, name: &str) -> Option<AssetHandle> {
        self.assets.get(name).map(|r| AssetHandle {
            name: name.to_string(),
            width: r.width,
            height: r.height,
        })
    }

    fn is_stale(&self, _handle: &AssetHandle, now: Instant) -> bool {
        match self.stale_after {
            Some(window) => now.duration_since(self.loaded_at) >= window,
            None => false,
        }
    }

    fn raster(&self, handle: &AssetHandle) -> Option<AssetRaster> {
        self.assets.get(&handle.name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster_1x1() -> AssetRaster {
        AssetRaster { width: 1, height: 1, bits: vec![0x80] }
    }

    #[test]
    fn unresolved_name_is_retried_after_window() {
        let mut store = MemoryAssetStore::new();
        let mut cache = CachedAsset::new("ard", Duration::from_secs(10));
        let t0 = Instant::now();

        assert!(cache.get(&store, t0).is_none());

        // asset appears, but the cache window has not lapsed yet
        store.insert("ard", raster_1x1());
        assert!(cache.get(&store, t0 + Duration::from_secs(5)).is_none());

        // window lapsed: re-resolved
        assert!(cache.get(&store, t0 + Duration::from_secs(10)).is_some());
    }

    #[test]
    fn name_change_drops_cached_handle() {
        let mut store = MemoryAssetStore::new();
        store.insert("ard", raster_1x1());
        let mut cache = CachedAsset::new("ard", Duration::from_secs(10));
        let t0 = Instant::now();
        assert!(cache.get(&store, t0).is_some());

        cache.set_name("zdf");
        assert!(cache.get(&store, t0).is_none());
    }

    #[test]
    fn stale_handle_forces_re_resolve() {
        let mut store = MemoryAssetStore::new().with_staleness(Duration::from_secs(1));
        store.insert("ard", raster_1x1());
        let mut cache = CachedAsset::new("ard", Duration::from_secs(3600));
        let t0 = Instant::now();
        assert!(cache.get(&store, t0).is_some());
        // long before the cache window, the store itself reports staleness
        assert!(cache.get(&store, t0 + Duration::from_secs(2)).is_some());
    }
}
