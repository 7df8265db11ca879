//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Geographic tile grid
//!
//! The grid covers the world in EPSG:4326 with two root tiles. Zoom level `z` has
//! `2^(z+1)` columns and `2^z` rows, origin at the bottom left (-180, -90).

use std::cmp;
use std::convert::TryFrom;
use std::fmt;

/// Width and height of a tile in pixels
pub const TILE_DIMENSION: u32 = 256;

/// Deepest zoom level whose tile indices fit into `i32`
pub const MAX_ZOOM: u8 = 29;

/// Geographic position in decimal degrees
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }
}

/// Fractional tile grid position.
///
/// The integer part is the tile index, the fractional part the position within the tile.
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct TileCoord {
    pub x: f64,
    pub y: f64,
}

impl TileCoord {
    pub fn new(x: f64, y: f64) -> TileCoord {
        TileCoord { x, y }
    }
    /// Index of the tile containing this position
    pub fn tile_index(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

/// Tile identity at a given zoom level. Used as cache key.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct TileKey {
    pub zoom: u8,
    pub x: i32,
    pub y: i32,
}

impl TileKey {
    pub fn new(zoom: u8, x: i32, y: i32) -> TileKey {
        TileKey { zoom, x, y }
    }
    /// Whether the tile index lies within the grid of its zoom level
    pub fn is_on_grid(&self) -> bool {
        let (cols, rows) = level_limit(self.zoom);
        self.x >= 0 && self.y >= 0 && (self.x as u32) < cols && (self.y as u32) < rows
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Geographic extent
#[derive(PartialEq, Clone, Debug)]
pub struct Extent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

/// World extent in decimal degrees
pub static WORLD_EXTENT: Extent = Extent {
    minx: -180.0,
    miny: -90.0,
    maxx: 180.0,
    maxy: 90.0,
};

/// Inclusive min and max tile indices of one zoom level
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TileRange {
    pub left: i32,
    pub right: i32,
    pub bottom: i32,
    pub top: i32,
}

impl TileRange {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.left <= x && x <= self.right && self.bottom <= y && y <= self.top
    }
    pub fn is_empty(&self) -> bool {
        self.right < self.left || self.top < self.bottom
    }
    /// Number of tiles covered
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            let cols = i64::from(self.right) - i64::from(self.left) + 1;
            let rows = i64::from(self.top) - i64::from(self.bottom) + 1;
            (cols as usize).saturating_mul(rows as usize)
        }
    }
    /// Tile keys of this range at `zoom`, column by column
    pub fn keys(&self, zoom: u8) -> impl Iterator<Item = TileKey> {
        let range = *self;
        (range.left..=range.right)
            .flat_map(move |x| (range.bottom..=range.top).map(move |y| TileKey::new(zoom, x, y)))
    }
    /// Restrict range to the valid tile indices of a zoom level
    pub fn clamp_to_level(&self, zoom: u8) -> TileRange {
        let (max_col, max_row) = level_max_index(zoom);
        TileRange {
            left: self.left.max(0),
            right: self.right.min(max_col),
            bottom: self.bottom.max(0),
            top: self.top.min(max_row),
        }
    }
}

fn columns(zoom: u8) -> f64 {
    (f64::from(zoom) + 1.0).exp2()
}

fn rows(zoom: u8) -> f64 {
    f64::from(zoom).exp2()
}

/// (columns, rows) of grid level
pub fn level_limit(zoom: u8) -> (u32, u32) {
    (columns(zoom) as u32, rows(zoom) as u32)
}

/// Highest (column, row) index of grid level, saturating at `i32::MAX`
pub fn level_max_index(zoom: u8) -> (i32, i32) {
    let (cols, rows) = level_limit(zoom);
    let last = |count: u32| i32::try_from(count.saturating_sub(1)).unwrap_or(i32::MAX);
    (last(cols), last(rows))
}

/// Fractional tile coordinate of a geographic position.
///
/// Longitudes outside [-180, 180] are not wrapped.
pub fn geo_to_tile(lat: f64, lon: f64, zoom: u8) -> TileCoord {
    TileCoord {
        x: (lon + 180.0) / 360.0 * columns(zoom),
        y: (lat + 90.0) / 180.0 * rows(zoom),
    }
}

/// Geographic position of a fractional tile coordinate
pub fn tile_to_geo(tx: f64, ty: f64, zoom: u8) -> GeoPoint {
    GeoPoint {
        lat: ty / rows(zoom) * 180.0 - 90.0,
        lon: tx / columns(zoom) * 360.0 - 180.0,
    }
}

/// Extent of a given tile in the grid given its x, y, and z
pub fn tile_extent(xtile: i32, ytile: i32, zoom: u8) -> Extent {
    let min = tile_to_geo(xtile as f64, ytile as f64, zoom);
    let max = tile_to_geo((xtile + 1) as f64, (ytile + 1) as f64, zoom);
    Extent {
        minx: min.lon,
        miny: min.lat,
        maxx: max.lon,
        maxy: max.lat,
    }
}

/// Tile index limits covering extent
pub fn tile_limits(extent: &Extent, zoom: u8) -> TileRange {
    const EPSILON: f64 = 0.0000001;
    let min = geo_to_tile(extent.miny, extent.minx, zoom);
    let max = geo_to_tile(extent.maxy, extent.maxx, zoom);
    let left = (min.x + EPSILON).floor() as i32;
    let bottom = (min.y + EPSILON).floor() as i32;
    // a degenerated extent still covers the tile it lies in
    let right = cmp::max(((max.x - EPSILON).ceil() as i32) - 1, left);
    let top = cmp::max(((max.y - EPSILON).ceil() as i32) - 1, bottom);
    TileRange {
        left,
        right,
        bottom,
        top,
    }
    .clamp_to_level(zoom)
}
