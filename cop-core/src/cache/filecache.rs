//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::cache::cache::Cache;
use crate::core::{ApplicationCfg, Config};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

#[derive(Clone, Debug)]
pub struct Filecache {
    pub basepath: String,
}

impl Filecache {
    pub fn new(basepath: &str) -> Filecache {
        Filecache {
            basepath: basepath.trim_end_matches('/').to_string(),
        }
    }
    fn fullpath(&self, path: &str) -> String {
        format!("{}/{}", self.basepath, path)
    }
}

impl Cache for Filecache {
    fn info(&self) -> String {
        format!("Tile cache directory: {}", self.basepath)
    }
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        let fullpath = self.fullpath(path);
        debug!("Filecache.read {}", fullpath);
        let mut f = File::open(&fullpath).ok()?;
        let mut data = Vec::new();
        match f.read_to_end(&mut data) {
            Ok(_) => Some(data),
            Err(e) => {
                warn!("Error reading {}: {}", fullpath, e);
                None
            }
        }
    }
    fn write(&self, path: &str, obj: &[u8]) -> Result<(), io::Error> {
        let fullpath = self.fullpath(path);
        debug!("Filecache.write {}", fullpath);
        let p = Path::new(&fullpath);
        if let Some(dir) = p.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut f = File::create(&fullpath)?;
        f.write_all(obj)
    }
    fn exists(&self, path: &str) -> bool {
        Path::new(&self.fullpath(path)).exists()
    }
}

impl<'a> Config<'a, ApplicationCfg> for Filecache {
    /// Cache root depends on the service mode
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let base = if config.service.remote {
            &config.cache.remote_base
        } else {
            &config.cache.local_base
        };
        if base.is_empty() {
            return Err("Empty tile cache directory".to_string());
        }
        Ok(Filecache::new(base))
    }
    fn gen_config() -> String {
        let toml = r#"
[cache]
# Tile cache directory used with remote service
remote_base = "/tmp/cop/cache"
# Tile cache directory used without remote service
local_base = "/tmp/cop/default_cache"
# Maximal number of tiles kept in memory (Default: unlimited)
#memory_limit = 10000
"#;
        toml.to_string()
    }
}
