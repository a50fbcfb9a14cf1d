use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    builder::{BuilderContext, DuplicatePolicy},
    configs::{Config, resolve_script_roots, validate_config},
    error::LoadError,
    model::Model,
    schema::Catalog,
    script::{Evaluator, Script, ScriptSource},
};

/// Turns script references into [`Model`]s.
///
/// A loader only holds read-only settings; every [`load`](Loader::load)
/// gets its own builder context and VM, so one loader can serve many threads.
#[derive(Debug, Clone)]
pub struct Loader {
    catalog: Arc<Catalog>,
    script_roots: Vec<PathBuf>,
    duplicates: DuplicatePolicy,
    strict_properties: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(Catalog::builtin()),
            script_roots: Vec::new(),
            duplicates: DuplicatePolicy::default(),
            strict_properties: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        validate_config(config).context("Invalid routescript configuration")?;

        let mut catalog = Catalog::builtin();
        catalog
            .extend(&config.catalog)
            .context("Failed to extend the configuration catalog")?;

        Ok(Self {
            catalog: Arc::new(catalog),
            script_roots: resolve_script_roots(config)?,
            duplicates: config.duplicates,
            strict_properties: config.strict_properties,
        })
    }

    pub fn with_script_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.script_roots.push(root.into());
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn with_strict_properties(mut self, strict: bool) -> Self {
        self.strict_properties = strict;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn script_roots(&self) -> &[PathBuf] {
        &self.script_roots
    }

    pub fn load(&self, reference: impl Into<ScriptSource>) -> Result<Model, LoadError> {
        let source = reference.into();
        let script = source
            .resolve(&self.script_roots)
            .map_err(|cause| LoadError::new(source.to_string(), cause))?;

        self.load_script(&script)
    }

    pub fn load_str(&self, name: &str, text: &str) -> Result<Model, LoadError> {
        self.load(ScriptSource::inline(name, text))
    }

    fn load_script(&self, script: &Script) -> Result<Model, LoadError> {
        let context = BuilderContext::new(Arc::clone(&self.catalog))
            .with_duplicates(self.duplicates)
            .with_strict_properties(self.strict_properties);

        let context = Evaluator.evaluate(script, context).map_err(|cause| {
            warn!(script = %script.name, error = %cause, "script failed to load");
            LoadError::new(script.name.as_str(), cause)
        })?;

        let model = context.finalize();
        info!(
            script = %script.name,
            routes = model.routes().len(),
            rests = model.rest_definitions().count(),
            beans = model.beans().len(),
            "script loaded"
        );

        Ok(model)
    }
}

/// Loads a script with the built-in catalog and default settings.
pub fn load(reference: impl Into<ScriptSource>) -> Result<Model, LoadError> {
    Loader::new().load(reference)
}
