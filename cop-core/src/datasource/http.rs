//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::ServiceCfg;
use crate::core::layer::Layer;
use crate::core::Config;
use crate::datasource::datasource::{FetchError, TileSource};
use curl::easy::Easy;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::time::Duration;
use tile_grid::TileKey;

/// Characters escaped in layer identifiers. `:` and `@` are kept, they are
/// part of the tile service syntax.
const IDENTIFIER: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Tiles from a GeoWebCache TMS endpoint
#[derive(Clone, Debug)]
pub struct HttpTileSource {
    /// `http://host:port`
    pub server_url: String,
    pub tms_path: String,
    pub wmts_path: String,
    pub gridset: String,
    pub timeout: Option<Duration>,
}

impl HttpTileSource {
    pub fn new(host: &str, port: u16) -> HttpTileSource {
        HttpTileSource {
            server_url: format!("http://{}:{}", host, port),
            tms_path: crate::core::config::default_tms_path(),
            wmts_path: crate::core::config::default_wmts_path(),
            gridset: crate::core::config::default_gridset(),
            timeout: None,
        }
    }
    pub fn tile_url(&self, layer: &Layer, key: &TileKey) -> String {
        format!(
            "{}/{}/{}@{}@png/{}/{}/{}.png",
            self.server_url,
            self.tms_path,
            utf8_percent_encode(&layer.identifier(), IDENTIFIER),
            self.gridset,
            key.zoom,
            key.x,
            key.y
        )
    }
    pub fn capabilities_url(&self) -> String {
        format!(
            "{}/{}?REQUEST=GetCapabilities&Version=2.0.0&TileMatrixSet={}",
            self.server_url, self.wmts_path, self.gridset
        )
    }
    pub fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        http_get(url, self.timeout)
    }
}

impl TileSource for HttpTileSource {
    fn info(&self) -> String {
        format!("Tile service: {}/{}", self.server_url, self.tms_path)
    }
    fn fetch(&self, layer: &Layer, key: &TileKey) -> Result<Vec<u8>, FetchError> {
        let url = self.tile_url(layer, key);
        debug!("HttpTileSource.fetch {}", url);
        self.get(&url)
    }
}

/// Blocking HTTP GET. Responses other than 200 are errors.
pub fn http_get(url: &str, timeout: Option<Duration>) -> Result<Vec<u8>, FetchError> {
    let mut data = Vec::new();
    let mut easy = Easy::new();
    easy.url(url)?;
    if let Some(timeout) = timeout {
        easy.connect_timeout(timeout)?;
        easy.timeout(timeout)?;
    }
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|chunk| {
            data.extend_from_slice(chunk);
            Ok(chunk.len())
        })?;
        transfer.perform()?;
    }
    let status = easy.response_code()?;
    if status != 200 {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(data)
}

fn trim_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}

impl<'a> Config<'a, ServiceCfg> for HttpTileSource {
    fn from_config(cfg: &ServiceCfg) -> Result<Self, String> {
        if cfg.host.is_empty() {
            return Err("Tile service host missing".to_string());
        }
        Ok(HttpTileSource {
            server_url: format!("http://{}:{}", cfg.host, cfg.port),
            tms_path: trim_path(&cfg.tms_path),
            wmts_path: trim_path(&cfg.wmts_path),
            gridset: cfg.gridset.clone(),
            timeout: cfg.timeout.map(Duration::from_secs),
        })
    }
    fn gen_config() -> String {
        let toml = r#"
[service]
# Fetch missing tiles from the tile service
remote = false
host = "127.0.0.1"
port = 7070
#tms_path = "geoserver/gwc/service/tms/1.0.0"
#wmts_path = "geoserver/gwc/service/wmts"
#gridset = "EPSG:4326"
# Local WMTS capabilities document (Default: requested from the tile service)
#capabilities = "wmts.xml"
# Layer whose tile limits apply to layers without own limits
default_layer = "land:World"
# Request timeout in seconds
#timeout = 10
"#;
        toml.to_string()
    }
}
