//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::cache::memcache::{png_tile, MemoryCache, TileImage};
use std::sync::Arc;
use std::thread;
use tile_grid::TileKey;

fn tile() -> TileImage {
    TileImage::decode(png_tile(256, 256)).unwrap()
}

#[test]
fn test_decode() {
    let image = tile();
    assert_eq!((image.width, image.height), (256, 256));
    assert_eq!(&image.data()[1..4], b"PNG");
    assert!(TileImage::decode(b"<html>Not found</html>".to_vec()).is_err());
    assert!(TileImage::decode(Vec::new()).is_err());
}

#[test]
fn test_get_insert() {
    let cache = MemoryCache::unbounded();
    let key = TileKey::new(8, 419, 82);
    assert!(cache.is_empty());
    assert_eq!(cache.get("land:World", &key), None);

    cache.insert("land:World", key, tile());
    assert!(cache.contains("land:World", &key));
    assert!(!cache.contains("perth:Roads", &key));
    assert!(!cache.contains("land:World", &TileKey::new(9, 419, 82)));
    // equal keys address the same entry
    assert_eq!(
        cache.get("land:World", &TileKey::new(8, 419, 82)),
        Some(tile())
    );
    cache.insert("land:World", key, tile());
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_unbounded() {
    let cache = MemoryCache::new(Some(0));
    assert_eq!(cache.limit(), None);
    let image = tile();
    for x in 0..500 {
        cache.insert("land:World", TileKey::new(10, x, 0), image.clone());
    }
    assert_eq!(cache.len(), 500);
}

#[test]
fn test_lru_eviction() {
    let cache = MemoryCache::new(Some(3));
    let image = tile();
    let a = TileKey::new(10, 1, 1);
    let b = TileKey::new(10, 2, 1);
    let c = TileKey::new(10, 3, 1);
    let d = TileKey::new(10, 4, 1);
    cache.insert("land:World", a, image.clone());
    cache.insert("perth:Roads", b, image.clone());
    cache.insert("land:World", c, image.clone());
    // a becomes the most recently used tile
    assert!(cache.get("land:World", &a).is_some());
    cache.insert("land:World", d, image.clone());
    assert_eq!(cache.len(), 3);
    assert!(cache.contains("land:World", &a));
    assert!(!cache.contains("perth:Roads", &b));
    assert!(cache.contains("land:World", &c));
    assert!(cache.contains("land:World", &d));

    // replacing an entry does not evict
    cache.insert("land:World", c, image);
    assert_eq!(cache.len(), 3);
    assert!(cache.contains("land:World", &a));
}

#[test]
fn test_concurrent_access() {
    let cache = Arc::new(MemoryCache::unbounded());
    let image = tile();
    let handles = (0..8)
        .map(|t| {
            let cache = cache.clone();
            let image = image.clone();
            thread::spawn(move || {
                for x in 0..50 {
                    let key = TileKey::new(12, x, t);
                    cache.insert("land:World", key, image.clone());
                    assert!(cache.get("land:World", &key).is_some());
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(cache.len(), 400);
}
