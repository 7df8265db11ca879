//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Viewport over the tile grid

use crate::grid::{
    geo_to_tile, tile_to_geo, Extent, GeoPoint, TileCoord, TileKey, TileRange, MAX_ZOOM,
    TILE_DIMENSION,
};

/// Canvas size in pixels
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// Canvas rectangle in pixels, y pointing down
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x <= x && x < self.x + self.width && self.y <= y && y < self.y + self.height
    }
}

/// Configured raster zoom limits. Values beyond `MAX_ZOOM` are clamped.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct ZoomBounds {
    pub min: u8,
    pub max: u8,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        ZoomBounds { min: 3, max: 19 }
    }
}

/// Snapshot of the viewport after the last recompute
#[derive(PartialEq, Clone, Debug)]
pub struct ViewportState {
    pub centre: GeoPoint,
    /// Integer raster zoom
    pub zoom: u8,
    pub canvas: CanvasSize,
    /// Visible tile indices (inclusive)
    pub required_tiles: TileRange,
    /// Tile coordinate of `centre`
    pub centre_point: TileCoord,
}

impl ViewportState {
    pub fn new(centre: GeoPoint, zoom: u8, canvas: CanvasSize) -> ViewportState {
        let centre_point = geo_to_tile(centre.lat, centre.lon, zoom);
        ViewportState {
            centre,
            zoom,
            canvas,
            required_tiles: required_tiles(&centre_point, &canvas),
            centre_point,
        }
    }

    /// Canvas offset of the top left required tile
    fn offset(&self) -> (f64, f64) {
        let dim = f64::from(TILE_DIMENSION);
        let left = f64::from(self.required_tiles.left);
        let top = f64::from(self.required_tiles.top);
        (
            f64::from(self.canvas.width) / 2.0 - (self.centre_point.x - left) * dim,
            f64::from(self.canvas.height) / 2.0 + (self.centre_point.y - (top + 1.0)) * dim,
        )
    }

    /// Canvas pixel position of a geographic point
    pub fn tile_to_canvas(&self, point: &GeoPoint) -> (f64, f64) {
        let dim = f64::from(TILE_DIMENSION);
        let (offset_x, offset_y) = self.offset();
        let pt = geo_to_tile(point.lat, point.lon, self.zoom);
        (
            (pt.x - f64::from(self.required_tiles.left)) * dim + offset_x,
            (f64::from(self.required_tiles.top) - pt.y + 1.0) * dim + offset_y,
        )
    }

    /// Geographic position of a canvas pixel
    pub fn canvas_to_geo(&self, x: f64, y: f64) -> GeoPoint {
        let dim = f64::from(TILE_DIMENSION);
        let (offset_x, offset_y) = self.offset();
        let tx = (x - offset_x) / dim + f64::from(self.required_tiles.left);
        let ty = 1.0 + f64::from(self.required_tiles.top) - (y - offset_y) / dim;
        tile_to_geo(tx, ty, self.zoom)
    }

    /// Canvas rectangle where the tile `key` is drawn
    pub fn tile_rect(&self, key: &TileKey) -> PixelRect {
        let dim = f64::from(TILE_DIMENSION);
        let (offset_x, offset_y) = self.offset();
        PixelRect {
            x: f64::from(key.x - self.required_tiles.left) * dim + offset_x,
            y: f64::from(self.required_tiles.top - key.y) * dim + offset_y,
            width: dim,
            height: dim,
        }
    }

    /// Geographic extent of the required tiles
    pub fn boundary(&self) -> Extent {
        let min = tile_to_geo(
            f64::from(self.required_tiles.left),
            f64::from(self.required_tiles.bottom),
            self.zoom,
        );
        let max = tile_to_geo(
            f64::from(self.required_tiles.right + 1),
            f64::from(self.required_tiles.top + 1),
            self.zoom,
        );
        Extent {
            minx: min.lon,
            miny: min.lat,
            maxx: max.lon,
            maxy: max.lat,
        }
    }
}

fn required_tiles(centre_point: &TileCoord, canvas: &CanvasSize) -> TileRange {
    let half_width = f64::from(canvas.width) / f64::from(TILE_DIMENSION * 2);
    let half_height = f64::from(canvas.height) / f64::from(TILE_DIMENSION * 2);
    TileRange {
        left: (centre_point.x - half_width).floor() as i32,
        right: (centre_point.x + half_width).floor() as i32,
        bottom: (centre_point.y - half_height).floor() as i32,
        top: (centre_point.y + half_height).floor() as i32,
    }
}

/// Effect of a viewport mutation
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ViewportChange {
    Unchanged,
    /// Continuous zoom changed within the same raster zoom
    Rescaled,
    Moved,
    Resized,
    /// Raster zoom changed, all tiles have to be fetched again
    ZoomLevel { from: u8, to: u8 },
}

impl ViewportChange {
    pub fn is_zoom_transition(&self) -> bool {
        matches!(self, ViewportChange::ZoomLevel { .. })
    }
    /// Whether the required tile set may have changed
    pub fn needs_tiles(&self) -> bool {
        matches!(
            self,
            ViewportChange::Moved | ViewportChange::Resized | ViewportChange::ZoomLevel { .. }
        )
    }
}

/// Owns centre, zoom and canvas size and keeps the required tiles up to date
#[derive(Clone, Debug)]
pub struct ViewportController {
    vector_zoom: f64,
    bounds: ZoomBounds,
    /// Effective minimum zoom for the current canvas width
    min_zoom: u8,
    state: ViewportState,
}

impl ViewportController {
    pub fn new(
        centre: GeoPoint,
        vector_zoom: f64,
        canvas: CanvasSize,
        bounds: ZoomBounds,
    ) -> ViewportController {
        let bounds = ZoomBounds {
            min: bounds.min.min(MAX_ZOOM),
            max: bounds.max.min(MAX_ZOOM),
        };
        let min_zoom = min_legal_zoom(canvas.width, &bounds);
        let vector_zoom = clamp_zoom(vector_zoom, min_zoom, bounds.max);
        ViewportController {
            vector_zoom,
            bounds,
            min_zoom,
            state: ViewportState::new(centre, vector_zoom.floor() as u8, canvas),
        }
    }
    pub fn state(&self) -> &ViewportState {
        &self.state
    }
    pub fn vector_zoom(&self) -> f64 {
        self.vector_zoom
    }
    /// Effective (min, max) raster zoom
    pub fn zoom_bounds(&self) -> (u8, u8) {
        (self.min_zoom, self.bounds.max)
    }
    /// Scale factor of raster tiles within the current raster zoom
    pub fn scale(&self) -> f64 {
        (self.vector_zoom - f64::from(self.state.zoom)).exp2()
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> ViewportChange {
        let canvas = CanvasSize { width, height };
        if canvas == self.state.canvas {
            return ViewportChange::Unchanged;
        }
        self.min_zoom = min_legal_zoom(width, &self.bounds);
        let from = self.state.zoom;
        self.vector_zoom = clamp_zoom(self.vector_zoom, self.min_zoom, self.bounds.max);
        self.state = ViewportState::new(self.state.centre, self.vector_zoom.floor() as u8, canvas);
        if self.state.zoom != from {
            ViewportChange::ZoomLevel {
                from,
                to: self.state.zoom,
            }
        } else {
            ViewportChange::Resized
        }
    }

    pub fn set_centre(&mut self, centre: GeoPoint) -> ViewportChange {
        if centre == self.state.centre {
            return ViewportChange::Unchanged;
        }
        self.state = ViewportState::new(centre, self.state.zoom, self.state.canvas);
        ViewportChange::Moved
    }

    pub fn move_to(&mut self, lat: f64, lon: f64) -> ViewportChange {
        self.set_centre(GeoPoint::new(lat, lon))
    }

    /// Set continuous zoom. Values outside the zoom bounds are clamped.
    pub fn set_zoom(&mut self, vector_zoom: f64) -> ViewportChange {
        if !vector_zoom.is_finite() {
            return ViewportChange::Unchanged;
        }
        let vector_zoom = clamp_zoom(vector_zoom, self.min_zoom, self.bounds.max);
        if vector_zoom == self.vector_zoom {
            return ViewportChange::Unchanged;
        }
        self.vector_zoom = vector_zoom;
        let from = self.state.zoom;
        let to = vector_zoom.floor() as u8;
        if to == from {
            return ViewportChange::Rescaled;
        }
        self.state = ViewportState::new(self.state.centre, to, self.state.canvas);
        ViewportChange::ZoomLevel { from, to }
    }

    /// Move the map content by a pixel delta (dragging)
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) -> ViewportChange {
        let x = f64::from(self.state.canvas.width) / 2.0 - dx;
        let y = f64::from(self.state.canvas.height) / 2.0 - dy;
        self.move_to_canvas_location(x, y)
    }

    /// Centre the map on a canvas position
    pub fn move_to_canvas_location(&mut self, x: f64, y: f64) -> ViewportChange {
        let centre = self.state.canvas_to_geo(x, y);
        self.set_centre(centre)
    }
}

/// Smallest zoom without visible gaps for the canvas width
fn min_legal_zoom(width: u32, bounds: &ZoomBounds) -> u8 {
    let mut zoom = bounds.min;
    while zoom < bounds.max
        && (f64::from(zoom) + 1.0).exp2() * f64::from(TILE_DIMENSION) < f64::from(width)
    {
        zoom += 1;
    }
    zoom
}

fn clamp_zoom(vector_zoom: f64, min: u8, max: u8) -> f64 {
    vector_zoom.max(f64::from(min)).min(f64::from(max))
}
