//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use image::{GenericImageView, ImageError, ImageFormat};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::sync::Arc;
use tile_grid::TileKey;

/// Validated PNG tile
#[derive(Clone, PartialEq)]
pub struct TileImage {
    data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
}

impl TileImage {
    /// Decode PNG data once to validate it and read its size
    pub fn decode(data: Vec<u8>) -> Result<TileImage, ImageError> {
        let img = image::load_from_memory_with_format(&data, ImageFormat::Png)?;
        let (width, height) = img.dimensions();
        Ok(TileImage {
            data: Arc::from(data),
            width,
            height,
        })
    }
    /// Encoded PNG bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for TileImage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "TileImage {{ {}x{}, {} bytes }}",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

struct Entry {
    image: TileImage,
    last_used: AtomicU64,
}

type LayerTiles = HashMap<TileKey, Entry>;

/// In-memory tile cache shared between resolvers
///
/// Unbounded unless created with a tile limit, in which case the least
/// recently used tile is evicted.
pub struct MemoryCache {
    layers: RwLock<HashMap<String, LayerTiles>>,
    limit: Option<usize>,
    clock: AtomicU64,
}

impl MemoryCache {
    pub fn new(limit: Option<usize>) -> MemoryCache {
        MemoryCache {
            layers: RwLock::new(HashMap::new()),
            limit: limit.filter(|l| *l > 0),
            clock: AtomicU64::new(0),
        }
    }
    pub fn unbounded() -> MemoryCache {
        MemoryCache::new(None)
    }
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
    pub fn get(&self, layer: &str, key: &TileKey) -> Option<TileImage> {
        let layers = self.layers.read().unwrap_or_else(PoisonError::into_inner);
        let entry = layers.get(layer)?.get(key)?;
        entry.last_used.store(self.tick(), Ordering::Relaxed);
        Some(entry.image.clone())
    }
    pub fn contains(&self, layer: &str, key: &TileKey) -> bool {
        let layers = self.layers.read().unwrap_or_else(PoisonError::into_inner);
        layers.get(layer).map_or(false, |tiles| tiles.contains_key(key))
    }
    pub fn insert(&self, layer: &str, key: TileKey, image: TileImage) {
        let mut layers = self.layers.write().unwrap_or_else(PoisonError::into_inner);
        let replaces = layers
            .get(layer)
            .map_or(false, |tiles| tiles.contains_key(&key));
        if let Some(limit) = self.limit {
            if !replaces {
                let mut len: usize = layers.values().map(|tiles| tiles.len()).sum();
                while len >= limit && evict_oldest(&mut layers) {
                    len -= 1;
                }
            }
        }
        let entry = Entry {
            image,
            last_used: AtomicU64::new(self.tick()),
        };
        layers
            .entry(layer.to_string())
            .or_insert(HashMap::new())
            .insert(key, entry);
    }
    /// Number of cached tiles
    pub fn len(&self) -> usize {
        let layers = self.layers.read().unwrap_or_else(PoisonError::into_inner);
        layers.values().map(|tiles| tiles.len()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        MemoryCache::unbounded()
    }
}

fn evict_oldest(layers: &mut HashMap<String, LayerTiles>) -> bool {
    let oldest = layers
        .iter()
        .flat_map(|(layer, tiles)| {
            tiles
                .iter()
                .map(move |(key, entry)| (entry.last_used.load(Ordering::Relaxed), layer, *key))
        })
        .min_by_key(|(last_used, _, _)| *last_used)
        .map(|(_, layer, key)| (layer.clone(), key));
    match oldest {
        Some((layer, key)) => {
            debug!("MemoryCache.evict {}/{}", layer, key);
            if let Some(tiles) = layers.get_mut(&layer) {
                tiles.remove(&key);
                if tiles.is_empty() {
                    layers.remove(&layer);
                }
            }
            true
        }
        None => false,
    }
}

/// Encoded single color PNG
#[cfg(test)]
pub(crate) fn png_tile(width: u32, height: u32) -> Vec<u8> {
    use std::io::Cursor;
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 60, 90, 255]));
    let mut data = Cursor::new(Vec::new());
    img.write_to(&mut data, ImageFormat::Png).unwrap();
    data.into_inner()
}
