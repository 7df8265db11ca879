//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::grid::{GeoPoint, TileKey, TileRange, MAX_ZOOM};
use crate::viewport::{CanvasSize, ViewportChange, ViewportController, ViewportState, ZoomBounds};

fn perth() -> GeoPoint {
    GeoPoint::new(-32.2138204, 115.0387413)
}

fn perth_viewport() -> ViewportController {
    ViewportController::new(
        perth(),
        10.0,
        CanvasSize {
            width: 800,
            height: 600,
        },
        ZoomBounds::default(),
    )
}

#[test]
fn test_required_tiles() {
    let viewport = perth_viewport();
    let state = viewport.state();
    assert_eq!(state.zoom, 10);
    assert!((state.centre_point.x - 1678.4426171733332).abs() < 1e-9);
    assert!((state.centre_point.y - 328.73915505777774).abs() < 1e-9);
    assert_eq!(
        state.required_tiles,
        TileRange {
            left: 1676,
            right: 1680,
            bottom: 327,
            top: 329,
        }
    );
    // 800 / 256 ~ 3 tiles across the canvas
    let across = state.required_tiles.right - state.required_tiles.left;
    assert!(across >= 3 && across <= 4);
}

#[test]
fn test_resize_keeps_centre_point() {
    let mut viewport = perth_viewport();
    let centre_point = viewport.state().centre_point;
    let change = viewport.set_canvas_size(1024, 768);
    assert_eq!(change, ViewportChange::Resized);
    assert_eq!(viewport.state().centre_point, centre_point);
    assert_eq!(
        viewport.state().required_tiles,
        TileRange {
            left: 1676,
            right: 1680,
            bottom: 327,
            top: 330,
        }
    );
    assert_eq!(viewport.set_canvas_size(1024, 768), ViewportChange::Unchanged);
}

#[test]
fn test_canvas_round_trip() {
    let viewport = perth_viewport();
    let state = viewport.state();
    for &(x, y) in [
        (0.0, 0.0),
        (400.0, 300.0),
        (799.5, 599.5),
        (123.25, 456.75),
        (17.0, 580.0),
    ]
    .iter()
    {
        let geo = state.canvas_to_geo(x, y);
        let (cx, cy) = state.tile_to_canvas(&geo);
        assert!((cx - x).abs() < 1e-6, "x {} -> {}", x, cx);
        assert!((cy - y).abs() < 1e-6, "y {} -> {}", y, cy);
    }
}

#[test]
fn test_centre_on_canvas_centre() {
    let viewport = perth_viewport();
    let state = viewport.state();
    let (x, y) = state.tile_to_canvas(&perth());
    assert!((x - 400.0).abs() < 1e-6);
    assert!((y - 300.0).abs() < 1e-6);

    // north is up, east is right
    let (x, y) = state.tile_to_canvas(&GeoPoint::new(-32.1, 115.1));
    assert!(x > 400.0);
    assert!(y < 300.0);
}

#[test]
fn test_tile_rect() {
    let viewport = perth_viewport();
    let state = viewport.state();
    let (tx, ty) = state.centre_point.tile_index();
    let rect = state.tile_rect(&TileKey::new(10, tx, ty));
    assert!(rect.contains(400.0, 300.0));
    assert_eq!(rect.width, 256.0);

    // neighbour to the north is drawn one tile above
    let north = state.tile_rect(&TileKey::new(10, tx, ty + 1));
    assert!((rect.y - north.y - 256.0).abs() < 1e-9);
    assert_eq!(rect.x, north.x);

    // rect corners agree with the geographic transform
    let (cx, cy) = state.tile_to_canvas(&crate::grid::tile_to_geo(tx as f64, ty as f64 + 1.0, 10));
    assert!((cx - rect.x).abs() < 1e-6);
    assert!((cy - rect.y).abs() < 1e-6);
}

#[test]
fn test_boundary() {
    let state = ViewportState::new(
        GeoPoint::new(0.0, 0.0),
        3,
        CanvasSize {
            width: 512,
            height: 256,
        },
    );
    assert_eq!(
        state.required_tiles,
        TileRange {
            left: 7,
            right: 9,
            bottom: 3,
            top: 4,
        }
    );
    let boundary = state.boundary();
    assert_eq!(boundary.minx, -22.5);
    assert_eq!(boundary.maxx, 45.0);
    assert_eq!(boundary.miny, -22.5);
    assert_eq!(boundary.maxy, 22.5);
}

#[test]
fn test_zoom_transitions() {
    let mut viewport = perth_viewport();
    assert_eq!(viewport.set_zoom(10.4), ViewportChange::Rescaled);
    assert_eq!(viewport.state().zoom, 10);
    assert!((viewport.scale() - 0.4f64.exp2()).abs() < 1e-12);
    assert_eq!(viewport.set_zoom(10.4), ViewportChange::Unchanged);

    let before = viewport.state().required_tiles;
    assert_eq!(
        viewport.set_zoom(11.2),
        ViewportChange::ZoomLevel { from: 10, to: 11 }
    );
    assert_eq!(viewport.state().zoom, 11);
    assert_ne!(viewport.state().required_tiles, before);
    assert!(viewport.set_zoom(9.9).is_zoom_transition());
    assert!(!ViewportChange::Rescaled.needs_tiles());
    assert!(ViewportChange::Moved.needs_tiles());
}

#[test]
fn test_zoom_clamped() {
    let mut viewport = perth_viewport();
    viewport.set_zoom(25.0);
    assert_eq!(viewport.state().zoom, 19);
    assert_eq!(viewport.vector_zoom(), 19.0);
    viewport.set_zoom(-3.0);
    assert_eq!(viewport.state().zoom, 3);
    assert_eq!(viewport.set_zoom(f64::NAN), ViewportChange::Unchanged);
    assert_eq!(viewport.state().zoom, 3);
}

#[test]
fn test_zoom_bounds_limited_to_grid() {
    let mut viewport = ViewportController::new(
        perth(),
        40.0,
        CanvasSize {
            width: 800,
            height: 600,
        },
        ZoomBounds { min: 35, max: 40 },
    );
    assert_eq!(viewport.zoom_bounds(), (MAX_ZOOM, MAX_ZOOM));
    assert_eq!(viewport.state().zoom, MAX_ZOOM);
    viewport.set_zoom(f64::from(u8::MAX));
    assert_eq!(viewport.state().zoom, MAX_ZOOM);
    assert!(viewport.state().required_tiles.len() > 0);
}

#[test]
fn test_min_zoom_from_canvas_width() {
    let mut viewport = perth_viewport();
    assert_eq!(viewport.zoom_bounds(), (3, 19));
    viewport.set_zoom(3.0);
    // 2^(3+1) * 256 = 4096 < 5000
    let change = viewport.set_canvas_size(5000, 600);
    assert_eq!(change, ViewportChange::ZoomLevel { from: 3, to: 4 });
    assert_eq!(viewport.zoom_bounds(), (4, 19));
    assert_eq!(viewport.state().zoom, 4);
}

#[test]
fn test_pan() {
    let mut viewport = perth_viewport();
    let centre = viewport.state().centre;
    // content moves one tile to the right, centre moves one tile west
    assert_eq!(viewport.pan_pixels(256.0, 0.0), ViewportChange::Moved);
    let moved = viewport.state().centre;
    assert!((centre.lon - moved.lon - 360.0 / 2048.0).abs() < 1e-9);
    assert!((centre.lat - moved.lat).abs() < 1e-9);

    // content moves down, centre moves north
    viewport.pan_pixels(0.0, 128.0);
    assert!((viewport.state().centre.lat - moved.lat - 90.0 / 1024.0).abs() < 1e-9);
}

#[test]
fn test_move_to() {
    let mut viewport = perth_viewport();
    assert_eq!(viewport.move_to(-32.12673, 115.25), ViewportChange::Moved);
    assert_eq!(viewport.state().centre, GeoPoint::new(-32.12673, 115.25));
    assert_eq!(viewport.move_to(-32.12673, 115.25), ViewportChange::Unchanged);

    let target = viewport.state().canvas_to_geo(100.0, 100.0);
    viewport.move_to_canvas_location(100.0, 100.0);
    let (x, y) = viewport.state().tile_to_canvas(&target);
    assert!((x - 400.0).abs() < 1e-6);
    assert!((y - 300.0).abs() < 1e-6);
}
