use serde::Serialize;

use crate::model::{PropertyMap, PropertyValue};

/// Schema-checked properties applied to one named plugin instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginConfig {
    pub name: String,
    pub kind: String,
    pub type_name: String,
    pub properties: PropertyMap,
}

impl PluginConfig {
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

pub type ComponentConfig = PluginConfig;
pub type LanguageConfig = PluginConfig;
pub type DataFormatConfig = PluginConfig;
