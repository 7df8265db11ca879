//! A library for geographic map tile grid calculations
//!
//! ## Grid transforms
//!
//! ```rust
//! use tile_grid::{geo_to_tile, tile_extent, tile_to_geo, Extent};
//!
//! let pt = geo_to_tile(-32.2138204, 115.0387413, 8);
//! assert_eq!(pt.tile_index(), (419, 82));
//! let geo = tile_to_geo(pt.x, pt.y, 8);
//! assert!((geo.lat - -32.2138204).abs() < 1e-9);
//!
//! assert_eq!(
//!     tile_extent(0, 0, 0),
//!     Extent {
//!         minx: -180.0,
//!         miny: -90.0,
//!         maxx: 0.0,
//!         maxy: 90.0,
//!     }
//! );
//! ```
//!
//! ## Viewport
//!
//! ```rust
//! use tile_grid::{CanvasSize, GeoPoint, ViewportController, ZoomBounds};
//!
//! let mut viewport = ViewportController::new(
//!     GeoPoint::new(-32.2138204, 115.0387413),
//!     10.0,
//!     CanvasSize { width: 800, height: 600 },
//!     ZoomBounds::default(),
//! );
//! let change = viewport.set_zoom(11.5);
//! assert!(change.is_zoom_transition());
//! for key in viewport.state().required_tiles.keys(viewport.state().zoom) {
//!     println!("Tile {}", key);
//! }
//! ```
//!
//! ## Geodesics
//!
//! ```rust
//! use tile_grid::geodesic;
//!
//! let d = geodesic::distance(-32.2138204, 115.0387413, -35.0913820, 138.0738741).unwrap();
//! assert!((d - 2_155_488.46).abs() < 1.0);
//! ```

pub mod geodesic;
mod grid;
mod grid_iterator;
mod viewport;

#[cfg(test)]
mod geodesic_test;
#[cfg(test)]
mod viewport_test;

pub use geodesic::GeodesicError;
pub use grid::{
    geo_to_tile, level_limit, level_max_index, tile_extent, tile_limits, tile_to_geo, Extent,
    GeoPoint, TileCoord, TileKey, TileRange, MAX_ZOOM, TILE_DIMENSION, WORLD_EXTENT,
};
pub use grid_iterator::GridIterator;
pub use viewport::{
    CanvasSize, PixelRect, ViewportChange, ViewportController, ViewportState, ZoomBounds,
};
