//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use cop_core::core::capabilities::LayerCapabilities;
use cop_core::core::{ApplicationCfg, Config};
use cop_core::datasource::HttpTileSource;

/// Load tile limits from the configured capabilities document.
///
/// Without a local document the capabilities are requested from the tile
/// service in remote mode. An unreachable service leaves all layers without
/// declared limits.
pub fn load_capabilities(config: &ApplicationCfg) -> Result<LayerCapabilities, String> {
    let service = &config.service;
    if let Some(ref path) = service.capabilities {
        info!("Reading capabilities from {}", path);
        return LayerCapabilities::from_file(path, &service.gridset, &service.default_layer)
            .map_err(|e| format!("{}: {}", path, e));
    }
    if !service.remote {
        info!("No capabilities document, using grid limits");
        return Ok(LayerCapabilities::new(&service.default_layer));
    }
    let source = HttpTileSource::from_config(service)?;
    let url = source.capabilities_url();
    info!("Requesting capabilities from {}", url);
    let capabilities = source
        .get(&url)
        .map_err(|e| e.to_string())
        .and_then(|xml| {
            LayerCapabilities::from_reader(&xml[..], &service.gridset, &service.default_layer)
                .map_err(|e| e.to_string())
        });
    match capabilities {
        Ok(capabilities) => Ok(capabilities),
        Err(e) => {
            warn!("Capabilities not available, using grid limits: {}", e);
            Ok(LayerCapabilities::new(&service.default_layer))
        }
    }
}
