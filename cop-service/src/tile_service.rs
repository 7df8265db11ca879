//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::capabilities::load_capabilities;
use cop_core::cache::{Filecache, MemoryCache, TileImage};
use cop_core::core::config::ServiceCfg;
use cop_core::core::layer::{Layer, LayerRegistry};
use cop_core::core::stats::FetchStatistics;
use cop_core::core::{ApplicationCfg, Config};
use cop_core::datasource::{HttpTileSource, TileSource};
use cop_core::service::{TileError, TileResolver};
use pbr::ProgressBar;
use std::cmp;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tile_grid::{
    tile_limits, CanvasSize, Extent, GeoPoint, GridIterator, PixelRect, TileKey, TileRange,
    ViewportChange, ViewportController, ViewportState, ZoomBounds, MAX_ZOOM, WORLD_EXTENT,
};
use tokio::sync::mpsc;
use tokio::task;

/// Tile of a layer to resolve
#[derive(Clone, Debug)]
pub struct TileRequest {
    pub layer: Layer,
    pub key: TileKey,
}

/// Outcome of a tile request
#[derive(Debug)]
pub struct ResolvedTile {
    /// Layer identifier
    pub layer: String,
    pub key: TileKey,
    pub result: Result<TileImage, TileError>,
}

/// Resolved tile with its canvas position
#[derive(Clone, Debug)]
pub struct TilePlacement {
    pub layer: String,
    pub key: TileKey,
    pub rect: PixelRect,
    pub alpha: f32,
    pub image: TileImage,
}

/// Map tiles of all visible layers for a viewport
pub struct TileService {
    resolver: Arc<TileResolver>,
    layers: LayerRegistry,
    viewport: ViewportController,
}

/// Number of tiles resolved concurrently
pub fn task_queue_size() -> usize {
    cmp::min(num_cpus::get() * 2, 64)
}

impl TileService {
    pub fn new(
        resolver: Arc<TileResolver>,
        layers: LayerRegistry,
        viewport: ViewportController,
    ) -> TileService {
        TileService {
            resolver,
            layers,
            viewport,
        }
    }
    pub fn resolver(&self) -> &Arc<TileResolver> {
        &self.resolver
    }
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }
    pub fn layers_mut(&mut self) -> &mut LayerRegistry {
        &mut self.layers
    }
    pub fn viewport(&self) -> &ViewportState {
        self.viewport.state()
    }
    pub fn vector_zoom(&self) -> f64 {
        self.viewport.vector_zoom()
    }
    /// Factor to scale placements by within the current raster zoom
    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    // Viewport events

    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> ViewportChange {
        self.viewport.set_canvas_size(width, height)
    }
    pub fn set_zoom(&mut self, vector_zoom: f64) -> ViewportChange {
        self.viewport.set_zoom(vector_zoom)
    }
    pub fn move_to(&mut self, lat: f64, lon: f64) -> ViewportChange {
        self.viewport.move_to(lat, lon)
    }
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) -> ViewportChange {
        self.viewport.pan_pixels(dx, dy)
    }
    pub fn move_to_canvas_location(&mut self, x: f64, y: f64) -> ViewportChange {
        self.viewport.move_to_canvas_location(x, y)
    }

    /// Canvas position of a geographic point
    pub fn to_canvas(&self, point: &GeoPoint) -> (f64, f64) {
        self.viewport.state().tile_to_canvas(point)
    }
    /// Geographic position of a canvas point
    pub fn to_geo(&self, x: f64, y: f64) -> GeoPoint {
        self.viewport.state().canvas_to_geo(x, y)
    }

    /// Tiles within the layer limits required for the current viewport,
    /// lowest layer first.
    pub fn required_tiles(&self) -> Vec<TileRequest> {
        let state = self.viewport.state();
        let capabilities = self.resolver.capabilities();
        let mut requests = Vec::new();
        for layer in self.layers.visible_layers() {
            let id = layer.identifier();
            for key in state.required_tiles.keys(state.zoom) {
                if key.is_on_grid() && capabilities.contains(&id, &key) {
                    requests.push(TileRequest {
                        layer: layer.clone(),
                        key,
                    });
                }
            }
        }
        requests
    }

    /// Result belongs to the current tile zoom level
    pub fn is_current(&self, tile: &ResolvedTile) -> bool {
        tile.key.zoom == self.viewport.state().zoom
    }

    /// Resolve the required tiles in the background.
    ///
    /// Tiles are delivered as they are resolved. Results of an earlier zoom
    /// level are identified with `is_current`. Must be called within a tokio
    /// runtime.
    pub fn resolve_viewport(&self) -> mpsc::Receiver<ResolvedTile> {
        let requests = self.required_tiles();
        let (tx, rx) = mpsc::channel(cmp::max(requests.len(), 1));
        task::spawn(dispatch(self.resolver.clone(), requests, tx));
        rx
    }

    /// Resolve the required tiles and wait for all of them.
    ///
    /// The viewport is borrowed until all tiles are resolved, so every
    /// result belongs to the current zoom level.
    pub async fn resolve_all(&self) -> Vec<ResolvedTile> {
        let mut rx = self.resolve_viewport();
        let mut tiles = Vec::new();
        while let Some(tile) = rx.recv().await {
            tiles.push(tile);
        }
        tiles
    }

    /// Draw list of the tiles available in memory, in drawing order.
    pub fn placements(&self) -> Vec<TilePlacement> {
        let state = self.viewport.state();
        let mut placements = Vec::new();
        for layer in self.layers.visible_layers() {
            for key in state.required_tiles.keys(state.zoom) {
                if let Some(image) = self.resolver.cached(layer, &key) {
                    placements.push(TilePlacement {
                        layer: layer.identifier(),
                        key,
                        rect: state.tile_rect(&key),
                        alpha: layer.alpha(),
                        image,
                    });
                }
            }
        }
        placements
    }

    fn progress_bar(&self, msg: &str, range: &TileRange) -> ProgressBar<Stdout> {
        let mut pb = ProgressBar::new(range.len() as u64);
        pb.message(msg);
        pb.show_speed = false;
        pb.show_percent = false;
        pb.show_time_left = false;
        pb
    }

    /// Fill the disk cache from the tile service for offline use
    pub fn seed(
        &self,
        layer_name: Option<&str>,
        minzoom: u8,
        maxzoom: u8,
        extent: Option<Extent>,
        progress: bool,
    ) -> Result<FetchStatistics, String> {
        if !self.resolver.remote_enabled() {
            return Err("Seeding requires the remote tile service".to_string());
        }
        if maxzoom > MAX_ZOOM {
            return Err(format!("Maximum zoom level is {}", MAX_ZOOM));
        }
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| format!("Couldn't initialize tokio runtime: {}", e))?;
        let extent = extent.unwrap_or_else(|| WORLD_EXTENT.clone());
        let mut stats = FetchStatistics::new();
        for layer in self.layers.layers() {
            if let Some(name) = layer_name {
                if name != layer.name && name != layer.identifier() {
                    continue;
                }
            }
            if progress {
                println!("Seeding layer '{}'...", layer);
            }
            let limits = (0..=maxzoom)
                .map(|zoom| self.seed_range(layer, &extent, zoom))
                .collect::<Vec<_>>();
            rt.block_on(self.seed_layer(layer, limits, minzoom, maxzoom, progress, &mut stats));
        }
        if progress {
            println!("");
        }
        Ok(stats)
    }

    /// Tiles covering `extent` within the layer limits
    fn seed_range(&self, layer: &Layer, extent: &Extent, zoom: u8) -> TileRange {
        let range = tile_limits(extent, zoom);
        let limits = self
            .resolver
            .capabilities()
            .limits(&layer.identifier(), zoom);
        TileRange {
            left: cmp::max(range.left, limits.min_col),
            right: cmp::min(range.right, limits.max_col),
            bottom: cmp::max(range.bottom, limits.min_row),
            top: cmp::min(range.top, limits.max_row),
        }
    }

    async fn seed_layer(
        &self,
        layer: &Layer,
        limits: Vec<TileRange>,
        minzoom: u8,
        maxzoom: u8,
        progress: bool,
        stats: &mut FetchStatistics,
    ) {
        let task_queue_size = task_queue_size();
        let mut tasks = Vec::with_capacity(task_queue_size);
        let mut pb = ProgressBar::new(0);
        let mut pb_z = !minzoom;
        for key in GridIterator::new(minzoom, maxzoom, limits.clone()) {
            if progress && key.zoom != pb_z {
                pb_z = key.zoom;
                let range = &limits[key.zoom as usize];
                debug!("level {}: {:?}", key.zoom, range);
                pb = self.progress_bar(&format!("Level {}: ", key.zoom), range);
                pb.tick();
            }
            if !self.resolver.disk_cached(layer, &key) {
                let resolver = self.resolver.clone();
                let task_layer = layer.clone();
                tasks.push(task::spawn_blocking(move || {
                    let start = Instant::now();
                    let result = resolver
                        .resolve(&task_layer, &key)
                        .map(|_| start.elapsed());
                    (key, result)
                }));
                if tasks.len() >= task_queue_size {
                    let (result, remaining) = await_one_task(tasks).await;
                    record_seed_result(stats, layer, result);
                    tasks = remaining;
                }
            }
            if progress {
                pb.inc();
            }
        }
        // Finish remaining tasks
        for result in futures_util::future::join_all(tasks).await {
            record_seed_result(stats, layer, result);
        }
    }
}

type SeedResult = (TileKey, Result<Duration, TileError>);

fn record_seed_result(
    stats: &mut FetchStatistics,
    layer: &Layer,
    result: Result<SeedResult, task::JoinError>,
) {
    let id = layer.identifier();
    match result {
        Ok((key, Ok(elapsed))) => stats.record(&id, key.zoom, elapsed),
        Ok((key, Err(e))) => {
            warn!("{}", e);
            stats.record_failure(&id, key.zoom);
        }
        Err(e) => error!("Seeding task failed: {}", e),
    }
}

async fn dispatch(
    resolver: Arc<TileResolver>,
    requests: Vec<TileRequest>,
    tx: mpsc::Sender<ResolvedTile>,
) {
    let task_queue_size = task_queue_size();
    let mut tasks = Vec::with_capacity(task_queue_size);
    for request in requests {
        let resolver = resolver.clone();
        let tx = tx.clone();
        tasks.push(task::spawn(async move {
            let resolved = task::spawn_blocking(move || {
                let TileRequest { layer, key } = request;
                let result = resolver.resolve(&layer, &key);
                ResolvedTile {
                    layer: layer.identifier(),
                    key,
                    result,
                }
            })
            .await;
            match resolved {
                Ok(tile) => {
                    // Receiver gone when the viewport was dropped
                    let _ = tx.send(tile).await;
                }
                Err(e) => error!("Tile task failed: {}", e),
            }
        }));
        if tasks.len() >= task_queue_size {
            let (_result, remaining) = await_one_task(tasks).await;
            tasks = remaining;
        }
    }
    futures_util::future::join_all(tasks).await;
}

async fn await_one_task<T>(
    tasks: Vec<task::JoinHandle<T>>,
) -> (Result<T, task::JoinError>, Vec<task::JoinHandle<T>>) {
    let (result, _index, remaining) = futures_util::future::select_all(tasks).await;
    (result, remaining)
}

impl<'a> Config<'a, ApplicationCfg> for TileService {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let capabilities = load_capabilities(config)?;
        let layers = LayerRegistry::from_config(config)?;
        let disk = Filecache::from_config(config)?;
        let source: Option<Box<dyn TileSource>> = if config.service.remote {
            Some(Box::new(HttpTileSource::from_config(&config.service)?))
        } else {
            None
        };
        let memory = Arc::new(MemoryCache::new(config.cache.memory_limit));
        let resolver = TileResolver::new(Arc::new(capabilities), memory, Box::new(disk), source);

        let vp = &config.viewport;
        if vp.minzoom > vp.maxzoom || vp.maxzoom > MAX_ZOOM {
            return Err(format!(
                "Invalid zoom range {}-{}",
                vp.minzoom, vp.maxzoom
            ));
        }
        let viewport = ViewportController::new(
            GeoPoint::new(vp.centre.0, vp.centre.1),
            vp.zoom,
            CanvasSize {
                width: vp.width,
                height: vp.height,
            },
            ZoomBounds {
                min: vp.minzoom,
                max: vp.maxzoom,
            },
        );
        Ok(TileService::new(Arc::new(resolver), layers, viewport))
    }
    fn gen_config() -> String {
        let mut config = String::new();
        config.push_str(TOML_HEADER);
        config.push_str(&<HttpTileSource as Config<ServiceCfg>>::gen_config());
        config.push_str(&<Filecache as Config<ApplicationCfg>>::gen_config());
        config.push_str(TOML_VIEWPORT);
        config.push_str(&<LayerRegistry as Config<ApplicationCfg>>::gen_config());
        config
    }
}

const TOML_HEADER: &'static str = "# COP map configuration\n";

const TOML_VIEWPORT: &'static str = r#"
[viewport]
minzoom = 3
maxzoom = 19
# Start position (lat, lon)
centre = [-32.12673, 115.25]
zoom = 8.0
# Canvas size until the window is shown
width = 800
height = 600
"#;
