//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::layer::Layer;
use std::io;
use thiserror::Error;
use tile_grid::TileKey;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] curl::Error),
    #[error("HTTP status {status} from {url}")]
    Status { status: u32, url: String },
    #[error("invalid PNG tile: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Remote tile provider
pub trait TileSource: Send + Sync {
    fn info(&self) -> String;
    /// Fetch encoded tile
    fn fetch(&self, layer: &Layer, key: &TileKey) -> Result<Vec<u8>, FetchError>;
}
