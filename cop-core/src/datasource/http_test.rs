//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{parse_config, ApplicationCfg};
use crate::core::layer::Layer;
use crate::core::Config;
use crate::datasource::datasource::{FetchError, TileSource};
use crate::datasource::http::{http_get, HttpTileSource};
use std::time::Duration;
use tile_grid::TileKey;

#[test]
fn test_tile_url() {
    let source = HttpTileSource::new("192.168.1.112", 8080);
    let layer = Layer::new("land", "World");
    assert_eq!(
        source.tile_url(&layer, &TileKey::new(8, 419, 82)),
        "http://192.168.1.112:8080/geoserver/gwc/service/tms/1.0.0/land:World@EPSG:4326@png/8/419/82.png"
    );
    let layer = Layer::new("perth", "Street Names");
    assert_eq!(
        source.tile_url(&layer, &TileKey::new(3, 1, 2)),
        "http://192.168.1.112:8080/geoserver/gwc/service/tms/1.0.0/perth:Street%20Names@EPSG:4326@png/3/1/2.png"
    );
}

#[test]
fn test_capabilities_url() {
    let source = HttpTileSource::new("localhost", 7070);
    assert_eq!(
        source.capabilities_url(),
        "http://localhost:7070/geoserver/gwc/service/wmts?REQUEST=GetCapabilities&Version=2.0.0&TileMatrixSet=EPSG:4326"
    );
}

#[test]
fn test_from_config() {
    let toml = r#"
        [service]
        host = "tiles.example.com"
        port = 80
        tms_path = "/gwc/service/tms/1.0.0/"
        gridset = "EPSG:4326x2"
        timeout = 5

        [cache]
        remote_base = "/tmp/cop/cache"
        local_base = "/tmp/cop/default_cache"
        "#;
    let config: ApplicationCfg = parse_config(toml.to_string(), "").unwrap();
    let source = HttpTileSource::from_config(&config.service).unwrap();
    assert_eq!(source.timeout, Some(Duration::from_secs(5)));
    assert_eq!(
        source.tile_url(&Layer::new("land", "World"), &TileKey::new(0, 1, 0)),
        "http://tiles.example.com:80/gwc/service/tms/1.0.0/land:World@EPSG:4326x2@png/0/1/0.png"
    );
    assert_eq!(
        source.info(),
        "Tile service: http://tiles.example.com:80/gwc/service/tms/1.0.0"
    );
}

#[test]
fn test_connection_refused() {
    // nothing listens on port 1
    let result = http_get("http://127.0.0.1:1/tile.png", Some(Duration::from_secs(2)));
    assert!(matches!(result, Err(FetchError::Http(_))));
}

#[test]
#[ignore]
fn test_fetch_tile() {
    let source = HttpTileSource::new("127.0.0.1", 7070);
    let data = source
        .fetch(&Layer::new("land", "World"), &TileKey::new(3, 12, 2))
        .unwrap();
    assert_eq!(&data[1..4], b"PNG");
}
