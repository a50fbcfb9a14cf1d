mod bean;
mod error_handler;
mod plugin_config;
mod rest;
mod route;
mod value;

use indexmap::IndexMap;
use serde::Serialize;

pub use bean::{Bean, BeanOrigin, BeanRegistry};
pub use error_handler::{ErrorHandler, ExceptionPolicy, HandlerStrategy};
pub use plugin_config::{ComponentConfig, DataFormatConfig, LanguageConfig, PluginConfig};
pub use rest::{HttpMethod, RestDefinition, Verb};
pub use route::{Processor, Route, Step};
pub use value::{PropertyMap, PropertyValue};

/// The frozen result of evaluating one script.
///
/// Nothing in a `Model` refers back to the script runtime, so two loads of
/// the same script compare equal while owning independent data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Model {
    pub(crate) routes: Vec<Route>,
    pub(crate) rests: IndexMap<String, RestDefinition>,
    pub(crate) beans: BeanRegistry,
    pub(crate) components: IndexMap<String, ComponentConfig>,
    pub(crate) languages: IndexMap<String, LanguageConfig>,
    pub(crate) data_formats: IndexMap<String, DataFormatConfig>,
    pub(crate) error_handlers: IndexMap<String, ErrorHandler>,
}

impl Model {
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds a route by its explicit id.
    pub fn route(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.id.as_deref() == Some(id))
    }

    pub fn rest_definitions(&self) -> impl Iterator<Item = &RestDefinition> {
        self.rests.values()
    }

    pub fn rest(&self, path: &str) -> Option<&RestDefinition> {
        self.rests.get(path)
    }

    pub fn beans(&self) -> &BeanRegistry {
        &self.beans
    }

    pub fn bean(&self, name: &str) -> Option<&Bean> {
        self.beans.get(name)
    }

    pub fn beans_of_type(&self, type_name: &str) -> Vec<&Bean> {
        self.beans.find_by_type(type_name)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentConfig> {
        self.components.get(name)
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentConfig> {
        self.components.values()
    }

    pub fn language(&self, name: &str) -> Option<&LanguageConfig> {
        self.languages.get(name)
    }

    pub fn languages(&self) -> impl Iterator<Item = &LanguageConfig> {
        self.languages.values()
    }

    pub fn data_format(&self, name: &str) -> Option<&DataFormatConfig> {
        self.data_formats.get(name)
    }

    pub fn data_formats(&self) -> impl Iterator<Item = &DataFormatConfig> {
        self.data_formats.values()
    }

    pub fn error_handler(&self, id: &str) -> Option<&ErrorHandler> {
        self.error_handlers.get(id)
    }

    pub fn error_handlers(&self) -> impl Iterator<Item = &ErrorHandler> {
        self.error_handlers.values()
    }

    /// Routes that reference the given error handler.
    pub fn routes_using(&self, error_handler: &str) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|r| r.error_handler.as_deref() == Some(error_handler))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
