//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{parse_config, read_config, ApplicationCfg, DEFAULT_CONFIG};

#[test]
fn test_default_config() {
    let config: ApplicationCfg = parse_config(DEFAULT_CONFIG.to_string(), "").unwrap();
    assert!(!config.service.remote);
    assert_eq!(config.service.port, 7070);
    assert_eq!(config.service.gridset, "EPSG:4326");
    assert_eq!(config.service.tms_path, "geoserver/gwc/service/tms/1.0.0");
    assert_eq!(config.service.default_layer, "land:World");
    assert_eq!(config.cache.local_base, "/tmp/cop/default_cache");
    assert_eq!(config.cache.memory_limit, None);
    assert_eq!(config.viewport.minzoom, 3);
    assert_eq!(config.viewport.maxzoom, 19);
    assert_eq!(config.viewport.centre, (-32.12673, 115.25));
    assert_eq!(config.layergroups.len(), 1);
    assert_eq!(config.layergroups[0].name, "land");
    assert_eq!(config.layergroups[0].layers[0].name, "World");
    assert_eq!(config.layergroups[0].layers[0].workspace, None);
    assert!(config.layergroups[0].layers[0].visible);
    assert_eq!(config.layergroups[0].layers[0].opacity, 100);
    assert_eq!(config.layergroups[0].layers[0].zlevel, 200);
}

#[test]
fn test_minimal_config() {
    let toml = r#"
        [service]
        remote = true
        host = "192.168.1.112"

        [cache]
        remote_base = "/home/cop/cache"
        local_base = "../default_cache"
        memory_limit = 4096
        "#;
    let config: ApplicationCfg = parse_config(toml.to_string(), "").unwrap();
    assert!(config.service.remote);
    assert_eq!(config.service.host, "192.168.1.112");
    assert_eq!(config.service.port, 7070);
    assert_eq!(config.service.capabilities, None);
    assert_eq!(config.cache.memory_limit, Some(4096));
    assert_eq!(config.viewport.width, 800);
    assert_eq!(config.viewport.zoom, 8.0);
    assert!(config.layergroups.is_empty());
}

#[test]
fn test_env_template() {
    std::env::set_var("COP_TEST_CACHE_DIR", "/var/cache/cop");
    let toml = r#"
        [service]
        [cache]
        remote_base = "{{env.COP_TEST_CACHE_DIR}}/remote"
        local_base = "{{env.COP_TEST_CACHE_DIR}}/local"
        "#;
    let config: ApplicationCfg = parse_config(toml.to_string(), "").unwrap();
    assert_eq!(config.cache.remote_base, "/var/cache/cop/remote");
    assert_eq!(config.cache.local_base, "/var/cache/cop/local");

    let toml = r#"
        [cache]
        remote_base = "${HOME}/cache"
        "#;
    let config: Result<ApplicationCfg, _> = parse_config(toml.to_string(), "");
    assert_eq!(
        config.err().unwrap(),
        "Replace old environment variable syntax ${VARNAME} with `{{env.VARNAME}}`"
    );
}

#[test]
fn test_parse_error() {
    let config: Result<ApplicationCfg, _> = read_config("src/core/mod.rs");
    assert!(config
        .err()
        .unwrap()
        .starts_with("src/core/mod.rs - unexpected character found: `/`"));

    let config: Result<ApplicationCfg, _> = read_config("wrongfile");
    assert_eq!("Could not find config file!", config.err().unwrap());

    let toml = r#"
        [service]
        "#;
    let config: Result<ApplicationCfg, _> = parse_config(toml.to_string(), "");
    assert_eq!(" - missing field `cache`", config.err().unwrap());
}
