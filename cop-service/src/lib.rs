//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate log;

mod capabilities;
pub mod tile_service;

pub use capabilities::load_capabilities;
pub use tile_service::{ResolvedTile, TilePlacement, TileRequest, TileService};
