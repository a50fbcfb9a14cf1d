use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{builder::DuplicatePolicy, schema::FieldType};

#[derive(Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directories searched, in order, for `classpath:` script references.
    pub script_roots: Vec<PathBuf>,
    pub duplicates: DuplicatePolicy,
    /// Reject configuration keys the target kind does not declare.
    pub strict_properties: bool,
    pub catalog: CatalogExtensions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script_roots: Vec::new(),
            duplicates: DuplicatePolicy::default(),
            strict_properties: true,
            catalog: CatalogExtensions::default(),
        }
    }
}

/// Extra configurable kinds, on top of the built-in catalog.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogExtensions {
    pub components: BTreeMap<String, KindDeclaration>,
    pub languages: BTreeMap<String, KindDeclaration>,
    pub data_formats: BTreeMap<String, KindDeclaration>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct KindDeclaration {
    pub type_name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, FieldType>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl KindDeclaration {
    pub fn validate(&self, kind: &str) -> Result<()> {
        ensure!(!kind.is_empty(), "Catalog kind names cannot be empty");
        ensure!(
            !self.type_name.is_empty(),
            "Catalog kind '{}' must declare a type_name",
            kind
        );

        for required in &self.required {
            ensure!(
                self.properties.contains_key(required),
                "Catalog kind '{}' marks '{}' as required but does not declare it",
                kind,
                required
            );
        }

        Ok(())
    }
}

pub fn load_config(config_path: PathBuf) -> Result<Config> {
    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {:?}", config_path))?;

    let config: Config =
        toml::from_str(&contents).with_context(|| format!("Failed to parse {:?}", config_path))?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    let declarations = config
        .catalog
        .components
        .iter()
        .chain(&config.catalog.languages)
        .chain(&config.catalog.data_formats);

    for (kind, declaration) in declarations {
        declaration
            .validate(kind)
            .with_context(|| format!("Invalid catalog declaration '{}'", kind))?;
    }

    for root in &config.script_roots {
        ensure!(
            !root.as_os_str().is_empty(),
            "Script roots cannot contain empty paths"
        );
    }

    Ok(())
}
