//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use regex::Regex;
use serde::Deserialize;
use std;
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use tera::{Context, Tera};
use toml::Value;

pub trait Config<'a, C: Deserialize<'a>>
where
    Self: std::marker::Sized,
{
    /// Read configuration
    fn from_config(config: &C) -> Result<Self, String>;
    /// Generate configuration template
    fn gen_config() -> String;
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationCfg {
    pub service: ServiceCfg,
    pub cache: CacheCfg,
    #[serde(default)]
    pub viewport: ViewportCfg,
    #[serde(rename = "layergroup", default)]
    pub layergroups: Vec<LayerGroupCfg>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServiceCfg {
    /// Fetch missing tiles from the remote tile service
    #[serde(default)]
    pub remote: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// TMS endpoint path on the tile server
    #[serde(default = "default_tms_path")]
    pub tms_path: String,
    /// WMTS endpoint path on the tile server (capabilities)
    #[serde(default = "default_wmts_path")]
    pub wmts_path: String,
    #[serde(default = "default_gridset")]
    pub gridset: String,
    /// Local capabilities document. Fetched from the WMTS endpoint when missing.
    pub capabilities: Option<String>,
    /// Layer whose tile limits apply to layers without declared limits
    #[serde(default = "default_layer")]
    pub default_layer: String,
    /// HTTP request timeout in seconds
    pub timeout: Option<u64>,
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    7070
}

pub fn default_tms_path() -> String {
    "geoserver/gwc/service/tms/1.0.0".to_string()
}

pub fn default_wmts_path() -> String {
    "geoserver/gwc/service/wmts".to_string()
}

pub fn default_gridset() -> String {
    "EPSG:4326".to_string()
}

pub fn default_layer() -> String {
    "land:World".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct CacheCfg {
    /// Tile cache directory used with remote service
    pub remote_base: String,
    /// Tile cache directory used without remote service
    pub local_base: String,
    /// Maximal number of tiles kept in memory (Default: unlimited)
    pub memory_limit: Option<usize>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ViewportCfg {
    #[serde(default = "default_minzoom")]
    pub minzoom: u8,
    #[serde(default = "default_maxzoom")]
    pub maxzoom: u8,
    /// Start position (lat, lon)
    #[serde(default = "default_centre")]
    pub centre: (f64, f64),
    #[serde(default = "default_start_zoom")]
    pub zoom: f64,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ViewportCfg {
    fn default() -> Self {
        ViewportCfg {
            minzoom: default_minzoom(),
            maxzoom: default_maxzoom(),
            centre: default_centre(),
            zoom: default_start_zoom(),
            width: default_width(),
            height: default_height(),
        }
    }
}

pub fn default_minzoom() -> u8 {
    3
}

pub fn default_maxzoom() -> u8 {
    19
}

pub fn default_centre() -> (f64, f64) {
    (-32.12673, 115.25)
}

pub fn default_start_zoom() -> f64 {
    8.0
}

pub fn default_width() -> u32 {
    800
}

pub fn default_height() -> u32 {
    600
}

#[derive(Deserialize, Clone, Debug)]
pub struct LayerGroupCfg {
    pub name: String,
    #[serde(rename = "layer", default)]
    pub layers: Vec<LayerCfg>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LayerCfg {
    pub name: String,
    /// Workspace on the tile server (Default: layer group name)
    pub workspace: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Opacity in percent
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    #[serde(default)]
    pub zlevel: i32,
}

pub fn default_visible() -> bool {
    true
}

pub fn default_opacity() -> u8 {
    100
}

pub const DEFAULT_CONFIG: &'static str = r#"
[service]
remote = false
host = "127.0.0.1"
port = 7070
default_layer = "land:World"

[cache]
remote_base = "/tmp/cop/cache"
local_base = "/tmp/cop/default_cache"

[viewport]
minzoom = 3
maxzoom = 19
centre = [-32.12673, 115.25]
zoom = 8.0

[[layergroup]]
name = "land"

[[layergroup.layer]]
name = "World"
zlevel = 200
"#;

/// Load and parse the config file into an config struct.
pub fn read_config<'a, T: Deserialize<'a>>(path: &str) -> Result<T, String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => {
            return Err("Could not find config file!".to_string());
        }
    };
    let mut config_toml = String::new();
    if let Err(err) = file.read_to_string(&mut config_toml) {
        return Err(format!("Error while reading config: [{}]", err));
    };

    parse_config(config_toml, path)
}

/// Parse the configuration into an config struct.
pub fn parse_config<'a, T: Deserialize<'a>>(config_toml: String, path: &str) -> Result<T, String> {
    // Check for old ${var} expressions
    let re = Regex::new(r"\$\{([[:alnum:]]+)\}").map_err(|e| e.to_string())?;
    if re.is_match(&config_toml) {
        return Err(
            "Replace old environment variable syntax ${VARNAME} with `{{env.VARNAME}}`".to_string(),
        );
    }

    // Parse template
    let mut tera = Tera::default();
    tera.add_raw_template(path, &config_toml)
        .map_err(|e| format!("Template error: {}", e))?;
    let mut context = Context::new();
    let mut env = HashMap::new();
    for (key, value) in env::vars() {
        env.insert(key, value);
    }
    context.insert("env", &env);
    let toml = tera.render(path, &context).map_err(|e| {
        format!(
            "Template error: {}",
            e.source().map_or(e.to_string(), |s| s.to_string())
        )
    })?;

    toml.parse::<Value>()
        .and_then(|cfg| cfg.try_into::<T>())
        .map_err(|err| format!("{} - {}", path, err))
}
