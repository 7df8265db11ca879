//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{ApplicationCfg, LayerCfg, LayerGroupCfg};
use crate::core::Config;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, PartialEq, Debug)]
pub struct Layer {
    pub name: String,
    /// Workspace on the tile server
    pub workspace: String,
    /// Layer group (menu entry)
    pub group: String,
    pub visible: bool,
    /// Opacity in percent (0-100)
    pub opacity: u8,
    /// Drawing order, higher values are drawn on top
    pub z_level: i32,
}

impl Layer {
    pub fn new(workspace: &str, name: &str) -> Layer {
        Layer {
            name: name.to_string(),
            workspace: workspace.to_string(),
            group: workspace.to_string(),
            visible: true,
            opacity: 100,
            z_level: 0,
        }
    }
    /// Tile service identifier (`workspace:name`)
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.workspace, self.name)
    }
    pub fn show_hide(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
    pub fn set_opacity(&mut self, percent: u8) {
        self.opacity = percent.min(100);
    }
    /// Opacity as drawing factor 0.0-1.0
    pub fn alpha(&self) -> f32 {
        self.opacity as f32 / 100.0
    }
    pub fn set_z_level(&mut self, z_level: i32) {
        self.z_level = z_level;
    }
    fn from_layer_config(group: &str, cfg: &LayerCfg) -> Layer {
        Layer {
            name: cfg.name.clone(),
            workspace: cfg.workspace.clone().unwrap_or_else(|| group.to_string()),
            group: group.to_string(),
            visible: cfg.visible,
            opacity: cfg.opacity.min(100),
            z_level: cfg.zlevel,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.workspace, self.name)
    }
}

impl<'a> Config<'a, LayerGroupCfg> for Vec<Layer> {
    fn from_config(group_cfg: &LayerGroupCfg) -> Result<Self, String> {
        let mut layers = Vec::new();
        for layer_cfg in &group_cfg.layers {
            if layer_cfg.name.is_empty() {
                return Err(format!("Layer without name in group '{}'", group_cfg.name));
            }
            if layers.iter().any(|l: &Layer| l.name == layer_cfg.name) {
                return Err(format!(
                    "Duplicate layer '{}' in group '{}'",
                    layer_cfg.name, group_cfg.name
                ));
            }
            layers.push(Layer::from_layer_config(&group_cfg.name, layer_cfg));
        }
        Ok(layers)
    }
    fn gen_config() -> String {
        let toml = r#"
[[layergroup]]
# Layer group name. Also the default workspace of its layers
name = "land"

[[layergroup.layer]]
name = "World"
# Workspace on the tile server (Default: group name)
#workspace = "land"
#visible = true
# Opacity in percent
#opacity = 100
# Drawing order, higher values are drawn on top
zlevel = 200
"#;
        toml.to_string()
    }
}

/// Layers organized in groups
#[derive(Clone, Default, Debug)]
pub struct LayerRegistry {
    groups: BTreeMap<String, Vec<Layer>>,
}

impl LayerRegistry {
    pub fn new() -> LayerRegistry {
        LayerRegistry::default()
    }
    pub fn add_layer(&mut self, layer: Layer) {
        let group = self.groups.entry(layer.group.clone()).or_insert(Vec::new());
        if let Some(existing) = group.iter_mut().find(|l| l.name == layer.name) {
            *existing = layer;
        } else {
            group.push(layer);
        }
    }
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(|k| k.as_str()).collect()
    }
    pub fn group(&self, group: &str) -> Option<&Vec<Layer>> {
        self.groups.get(group)
    }
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.groups.values().flat_map(|layers| layers.iter())
    }
    pub fn layer(&self, group: &str, name: &str) -> Option<&Layer> {
        self.groups
            .get(group)
            .and_then(|layers| layers.iter().find(|l| l.name == name))
    }
    pub fn layer_mut(&mut self, group: &str, name: &str) -> Option<&mut Layer> {
        self.groups
            .get_mut(group)
            .and_then(|layers| layers.iter_mut().find(|l| l.name == name))
    }
    /// Find layer by service identifier (`workspace:name`)
    pub fn find(&self, identifier: &str) -> Option<&Layer> {
        self.layers().find(|l| l.identifier() == identifier)
    }
    /// Toggle layer visibility. Returns the new visibility.
    pub fn show_hide(&mut self, group: &str, name: &str) -> Option<bool> {
        self.layer_mut(group, name).map(|l| l.show_hide())
    }
    /// Visible layers in drawing order (lowest z-level first)
    pub fn visible_layers(&self) -> Vec<&Layer> {
        let mut layers = self.layers().filter(|l| l.visible).collect::<Vec<_>>();
        layers.sort_by_key(|l| l.z_level);
        layers
    }
    pub fn len(&self) -> usize {
        self.groups.values().map(|layers| layers.len()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> Config<'a, ApplicationCfg> for LayerRegistry {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let mut registry = LayerRegistry::new();
        for group_cfg in &config.layergroups {
            if registry.groups.contains_key(&group_cfg.name) {
                return Err(format!("Duplicate layer group '{}'", group_cfg.name));
            }
            let layers = <Vec<Layer> as Config<LayerGroupCfg>>::from_config(group_cfg)?;
            registry.groups.insert(group_cfg.name.clone(), layers);
        }
        Ok(registry)
    }
    fn gen_config() -> String {
        <Vec<Layer> as Config<LayerGroupCfg>>::gen_config()
    }
}
