//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

pub mod cache;
pub mod filecache;
pub mod memcache;

#[cfg(test)]
mod memcache_test;

pub use self::cache::{tile_path, Cache};
pub use self::filecache::Filecache;
pub use self::memcache::{MemoryCache, TileImage};
