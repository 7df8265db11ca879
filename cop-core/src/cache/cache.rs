//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::io;
use tile_grid::TileKey;

/// Persistent tile storage
pub trait Cache: Send + Sync {
    fn info(&self) -> String;
    /// Read cached object. `None` if not cached or unreadable.
    fn read(&self, path: &str) -> Option<Vec<u8>>;
    fn write(&self, path: &str, obj: &[u8]) -> Result<(), io::Error>;
    fn exists(&self, path: &str) -> bool;
}

/// Relative cache path of a tile: `layer/zoom/x/y.png`
pub fn tile_path(layer_name: &str, key: &TileKey) -> String {
    format!("{}/{}/{}/{}.png", layer_name, key.zoom, key.x, key.y)
}
