//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::cache::{tile_path, Cache, MemoryCache, TileImage};
use crate::core::capabilities::LayerCapabilities;
use crate::core::layer::Layer;
use crate::datasource::{FetchError, TileSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tile_grid::TileKey;

#[derive(Error, Debug)]
pub enum TileError {
    #[error("tile {key} of layer {layer} is outside of the layer tile limits")]
    OutOfBounds { layer: String, key: TileKey },
    #[error("fetching tile {key} of layer {layer} failed: {source}")]
    FetchFailed {
        layer: String,
        key: TileKey,
        source: FetchError,
    },
    #[error("tile {key} of layer {layer} is not cached")]
    Unavailable { layer: String, key: TileKey },
}

type InflightKey = (String, TileKey);

/// Resolves tiles from memory, disk cache or tile service.
pub struct TileResolver {
    capabilities: Arc<LayerCapabilities>,
    memory: Arc<MemoryCache>,
    disk: Box<dyn Cache>,
    /// Remote mode enabled
    source: Option<Box<dyn TileSource>>,
    inflight: Mutex<HashMap<InflightKey, Arc<Mutex<()>>>>,
}

impl TileResolver {
    pub fn new(
        capabilities: Arc<LayerCapabilities>,
        memory: Arc<MemoryCache>,
        disk: Box<dyn Cache>,
        source: Option<Box<dyn TileSource>>,
    ) -> TileResolver {
        info!("{}", disk.info());
        match &source {
            Some(source) => info!("{}", source.info()),
            None => info!("Remote tile service disabled"),
        }
        TileResolver {
            capabilities,
            memory,
            disk,
            source,
            inflight: Mutex::new(HashMap::new()),
        }
    }
    pub fn remote_enabled(&self) -> bool {
        self.source.is_some()
    }
    pub fn capabilities(&self) -> &LayerCapabilities {
        &self.capabilities
    }
    pub fn memory(&self) -> &Arc<MemoryCache> {
        &self.memory
    }
    pub fn check_bounds(&self, layer: &Layer, key: &TileKey) -> Result<(), TileError> {
        if self.capabilities.contains(&layer.identifier(), key) {
            Ok(())
        } else {
            Err(TileError::OutOfBounds {
                layer: layer.identifier(),
                key: *key,
            })
        }
    }
    /// Cached tile without any I/O
    pub fn cached(&self, layer: &Layer, key: &TileKey) -> Option<TileImage> {
        self.memory.get(&layer.identifier(), key)
    }
    /// Tile stored in the disk cache
    pub fn disk_cached(&self, layer: &Layer, key: &TileKey) -> bool {
        self.disk.exists(&tile_path(&layer.name, key))
    }
    /// Resolve a tile. Blocks on disk and network I/O.
    ///
    /// At most one acquisition per tile is in flight. Concurrent callers
    /// wait for it and are served from memory.
    pub fn resolve(&self, layer: &Layer, key: &TileKey) -> Result<TileImage, TileError> {
        self.check_bounds(layer, key)?;
        if let Some(image) = self.cached(layer, key) {
            return Ok(image);
        }
        let inflight_key = (layer.identifier(), *key);
        let lock = {
            let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            inflight
                .entry(inflight_key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            match self.cached(layer, key) {
                Some(image) => Ok(image),
                None => self.acquire(layer, key),
            }
        };
        drop(lock);
        // The last waiter removes the lock
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if inflight
            .get(&inflight_key)
            .map_or(false, |entry| Arc::strong_count(entry) == 1)
        {
            inflight.remove(&inflight_key);
        }
        result
    }
    fn acquire(&self, layer: &Layer, key: &TileKey) -> Result<TileImage, TileError> {
        let path = tile_path(&layer.name, key);
        if let Some(data) = self.disk.read(&path) {
            match TileImage::decode(data) {
                Ok(image) => {
                    self.memory.insert(&layer.identifier(), *key, image.clone());
                    return Ok(image);
                }
                Err(e) => warn!("Ignoring invalid cached tile {}: {}", path, e),
            }
        }
        let source = match &self.source {
            Some(source) => source,
            None => {
                return Err(TileError::Unavailable {
                    layer: layer.identifier(),
                    key: *key,
                })
            }
        };
        let image = source
            .fetch(layer, key)
            .and_then(|data| TileImage::decode(data).map_err(FetchError::from))
            .map_err(|e| {
                error!("Fetching {} of {} failed: {}", key, layer, e);
                TileError::FetchFailed {
                    layer: layer.identifier(),
                    key: *key,
                    source: e,
                }
            })?;
        if let Err(e) = self.disk.write(&path, image.data()) {
            error!("Writing {} failed: {}", path, e);
        }
        self.memory.insert(&layer.identifier(), *key, image.clone());
        Ok(image)
    }
}
