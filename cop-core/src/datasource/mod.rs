//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

pub mod datasource;
pub mod http;
#[cfg(test)]
mod http_test;

pub use self::datasource::{FetchError, TileSource};
pub use self::http::{http_get, HttpTileSource};
