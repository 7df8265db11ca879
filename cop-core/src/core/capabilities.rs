//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Per-layer tile limits read from a WMTS capabilities document.

use elementtree::Element;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::convert::TryFrom;
use std::io::{self, BufReader, Read};
use thiserror::Error;
use tile_grid::{level_limit, level_max_index, TileKey, MAX_ZOOM};

/// Inclusive tile index range of a layer at one zoom level.
///
/// Rows count from the bottom of the grid like `TileKey::y`, whereas WMTS
/// rows count from the top. Parsed limits are flipped accordingly.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileLimits {
    pub min_row: i32,
    pub max_row: i32,
    pub min_col: i32,
    pub max_col: i32,
}

impl TileLimits {
    /// Whole grid of a zoom level
    pub fn for_level(zoom: u8) -> TileLimits {
        let (max_col, max_row) = level_max_index(zoom);
        TileLimits {
            min_row: 0,
            max_row,
            min_col: 0,
            max_col,
        }
    }
    pub fn contains(&self, key: &TileKey) -> bool {
        key.x >= self.min_col
            && key.x <= self.max_col
            && key.y >= self.min_row
            && key.y <= self.max_row
    }
}

#[derive(Error, Debug)]
pub enum CapabilitiesError {
    #[error("reading capabilities failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid capabilities XML: {0}")]
    Xml(#[from] elementtree::Error),
    #[error("capabilities document has no Contents")]
    MissingContents,
    #[error("invalid tile matrix limits: {0}")]
    InvalidLimits(String),
}

/// Tile limits per layer identifier and zoom level.
#[derive(Clone, Default, Debug)]
pub struct LayerCapabilities {
    layers: HashMap<String, BTreeMap<u8, TileLimits>>,
    default_layer: String,
}

impl LayerCapabilities {
    /// Capabilities without declared limits
    pub fn new(default_layer: &str) -> LayerCapabilities {
        LayerCapabilities {
            layers: HashMap::new(),
            default_layer: default_layer.to_string(),
        }
    }

    pub fn from_file(
        path: &str,
        gridset: &str,
        default_layer: &str,
    ) -> Result<LayerCapabilities, CapabilitiesError> {
        let file = File::open(path)?;
        LayerCapabilities::from_reader(BufReader::new(file), gridset, default_layer)
    }

    /// Parse the `Contents` of a WMTS capabilities document.
    ///
    /// Only tile matrix set links of `gridset` are read. A layer with
    /// unparsable limits is kept without declared limits.
    pub fn from_reader<R: Read>(
        reader: R,
        gridset: &str,
        default_layer: &str,
    ) -> Result<LayerCapabilities, CapabilitiesError> {
        let root = Element::from_reader(reader)?;
        let contents = child(&root, "Contents").ok_or(CapabilitiesError::MissingContents)?;
        let mut capabilities = LayerCapabilities::new(default_layer);
        for layer in children(contents, "Layer") {
            let identifier = match child_text(layer, "Identifier") {
                Some(id) => id.to_string(),
                None => {
                    warn!("Skipping capabilities layer without identifier");
                    continue;
                }
            };
            match layer_limits(layer, gridset) {
                Ok(limits) => {
                    if limits.is_empty() {
                        debug!("Layer {} has no {} tile limits", identifier, gridset);
                    } else {
                        capabilities.layers.insert(identifier, limits);
                    }
                }
                Err(e) => warn!("Ignoring tile limits of layer {}: {}", identifier, e),
            }
        }
        info!(
            "Tile limits of {} layers loaded",
            capabilities.layers.len()
        );
        Ok(capabilities)
    }

    pub fn insert(&mut self, layer: &str, zoom: u8, limits: TileLimits) {
        self.layers
            .entry(layer.to_string())
            .or_insert(BTreeMap::new())
            .insert(zoom, limits);
    }

    pub fn default_layer(&self) -> &str {
        &self.default_layer
    }

    /// Identifiers of layers with declared limits
    pub fn layer_ids(&self) -> Vec<&str> {
        let mut ids = self.layers.keys().map(|k| k.as_str()).collect::<Vec<_>>();
        ids.sort();
        ids
    }

    /// Limits declared for the layer itself
    pub fn declared(&self, layer: &str, zoom: u8) -> Option<&TileLimits> {
        self.layers.get(layer).and_then(|levels| levels.get(&zoom))
    }

    /// Declared limits of the layer, else of the default layer
    pub fn bounds(&self, layer: &str, zoom: u8) -> Option<TileLimits> {
        self.declared(layer, zoom)
            .or_else(|| self.declared(&self.default_layer, zoom))
            .cloned()
    }

    /// Effective limits. The whole grid if nothing is declared.
    pub fn limits(&self, layer: &str, zoom: u8) -> TileLimits {
        self.bounds(layer, zoom)
            .unwrap_or_else(|| TileLimits::for_level(zoom))
    }

    pub fn contains(&self, layer: &str, key: &TileKey) -> bool {
        self.limits(layer, key.zoom).contains(key)
    }
}

fn child<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    element.children().find(|c| c.tag().name() == name)
}

fn children<'a>(element: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
    element.children().filter(move |c| c.tag().name() == name)
}

fn child_text<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    child(element, name).map(|c| c.text().trim())
}

fn layer_limits(
    layer: &Element,
    gridset: &str,
) -> Result<BTreeMap<u8, TileLimits>, CapabilitiesError> {
    let mut levels = BTreeMap::new();
    for link in children(layer, "TileMatrixSetLink") {
        if child_text(link, "TileMatrixSet") != Some(gridset) {
            continue;
        }
        if let Some(set_limits) = child(link, "TileMatrixSetLimits") {
            for matrix_limits in children(set_limits, "TileMatrixLimits") {
                let (zoom, limits) = matrix_limits_entry(matrix_limits)?;
                levels.insert(zoom, limits);
            }
        }
    }
    Ok(levels)
}

fn matrix_limits_entry(element: &Element) -> Result<(u8, TileLimits), CapabilitiesError> {
    // Tile matrix identifiers look like "EPSG:4326:8"
    let matrix = child_text(element, "TileMatrix")
        .ok_or(CapabilitiesError::InvalidLimits("missing TileMatrix".to_string()))?;
    let zoom = matrix
        .rsplit(':')
        .next()
        .and_then(|z| z.parse::<u8>().ok())
        .filter(|z| *z <= MAX_ZOOM)
        .ok_or(CapabilitiesError::InvalidLimits(format!(
            "unsupported tile matrix '{}'",
            matrix
        )))?;
    let index = |name: &str| -> Result<i32, CapabilitiesError> {
        let text = child_text(element, name).unwrap_or("");
        text.parse::<i32>().map_err(|_| {
            CapabilitiesError::InvalidLimits(format!("{} '{}' of {}", name, text, matrix))
        })
    };
    let min_wmts_row = index("MinTileRow")?;
    let max_wmts_row = index("MaxTileRow")?;
    let min_col = index("MinTileCol")?;
    let max_col = index("MaxTileCol")?;
    // WMTS rows count from the top
    let last_row = i64::from(level_limit(zoom).1) - 1;
    let flip = |row: i32| -> Result<i32, CapabilitiesError> {
        i32::try_from(last_row - i64::from(row)).map_err(|_| {
            CapabilitiesError::InvalidLimits(format!("tile row {} of {}", row, matrix))
        })
    };
    Ok((
        zoom,
        TileLimits {
            min_row: flip(max_wmts_row)?,
            max_row: flip(min_wmts_row)?,
            min_col,
            max_col,
        },
    ))
}
