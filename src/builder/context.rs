use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    builder::{DuplicatePolicy, Instruction, Outcome, RestId, RouteId, VerbId, VerbSetting},
    error::DslError,
    model::{
        Bean, BeanRegistry, ErrorHandler, ExceptionPolicy, HandlerStrategy, HttpMethod, Model,
        PluginConfig, Processor, PropertyMap, PropertyValue, RestDefinition, Route, Step, Verb,
    },
    schema::{Catalog, ConfigTarget, KindSchema},
};

/// Accumulates registrations while a script runs.
///
/// Every instruction is validated when it is executed; nothing is deferred
/// to [`finalize`](BuilderContext::finalize).
#[derive(Debug)]
pub struct BuilderContext {
    catalog: Arc<Catalog>,
    duplicates: DuplicatePolicy,
    strict_properties: bool,
    routes: Vec<Route>,
    rests: IndexMap<String, RestDefinition>,
    beans: BeanRegistry,
    components: IndexMap<String, PluginConfig>,
    languages: IndexMap<String, PluginConfig>,
    data_formats: IndexMap<String, PluginConfig>,
    error_handlers: IndexMap<String, ErrorHandler>,
    failure: Option<DslError>,
}

impl BuilderContext {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            duplicates: DuplicatePolicy::default(),
            strict_properties: true,
            routes: Vec::new(),
            rests: IndexMap::new(),
            beans: BeanRegistry::default(),
            components: IndexMap::new(),
            languages: IndexMap::new(),
            data_formats: IndexMap::new(),
            error_handlers: IndexMap::new(),
            failure: None,
        }
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

    pub fn execute(&mut self, instruction: Instruction) -> Result<Outcome, DslError> {
        match instruction {
            Instruction::RegisterRoute { input } => self.register_route(input).map(Outcome::Route),
            Instruction::AppendStep { route, step } => {
                self.append_step(route, step).map(|_| Outcome::Applied)
            }
            Instruction::SetRouteId { route, id } => {
                self.set_route_id(route, id).map(|_| Outcome::Applied)
            }
            Instruction::AttachErrorHandler { route, handler } => self
                .attach_error_handler(route, handler)
                .map(|_| Outcome::Applied),
            Instruction::RegisterRest { path } => self.register_rest(path).map(Outcome::Rest),
            Instruction::AddVerb { rest, method, uri } => {
                self.add_verb(rest, method, uri).map(Outcome::Verb)
            }
            Instruction::ConfigureVerb { verb, setting } => {
                self.configure_verb(verb, setting).map(|_| Outcome::Applied)
            }
            Instruction::RegisterBean(bean) => self.register_bean(bean).map(|_| Outcome::Applied),
            Instruction::ResolveConfig { target, name, kind } => self
                .resolve_config(target, &name, kind.as_deref())
                .map(|_| Outcome::Applied),
            Instruction::Configure {
                target,
                name,
                kind,
                properties,
            } => self
                .configure(target, name, kind, properties)
                .map(|_| Outcome::Applied),
            Instruction::RegisterErrorHandler {
                id,
                kind,
                properties,
            } => self
                .register_error_handler(id, kind, properties)
                .map(|_| Outcome::Applied),
        }
    }

    fn register_route(&mut self, input: String) -> Result<RouteId, DslError> {
        if input.trim().is_empty() {
            return Err(DslError::Syntax {
                message: "from(...) requires a non-empty endpoint uri".to_string(),
            });
        }

        debug!(input = %input, "registering route");
        self.routes.push(Route::new(input));
        Ok(RouteId(self.routes.len() - 1))
    }

    fn append_step(&mut self, route: RouteId, step: Step) -> Result<(), DslError> {
        match &step {
            Step::Process {
                processor: Processor::Bean(name),
            } if !self.beans.contains(name) => {
                return Err(DslError::unresolved("bean", name.as_str()));
            }
            Step::Transform { language, .. } if !self.language_resolves(language) => {
                return Err(DslError::unresolved("language", language.as_str()));
            }
            Step::To { uri } if uri.trim().is_empty() => {
                return Err(DslError::Syntax {
                    message: "to(...) requires a non-empty endpoint uri".to_string(),
                });
            }
            _ => {}
        }

        self.route_mut(route)?.outputs.push(step);
        Ok(())
    }

    fn set_route_id(&mut self, route: RouteId, id: String) -> Result<(), DslError> {
        let taken = self
            .routes
            .iter()
            .enumerate()
            .any(|(index, r)| index != route.0 && r.id.as_deref() == Some(id.as_str()));
        if taken {
            return Err(DslError::DuplicateName {
                kind: "route".to_string(),
                name: id,
            });
        }

        self.route_mut(route)?.id = Some(id);
        Ok(())
    }

    fn attach_error_handler(&mut self, route: RouteId, handler: String) -> Result<(), DslError> {
        if !self.error_handlers.contains_key(&handler) {
            return Err(DslError::unresolved("error handler", handler));
        }

        self.route_mut(route)?.error_handler = Some(handler);
        Ok(())
    }

    fn register_rest(&mut self, path: String) -> Result<RestId, DslError> {
        if path.is_empty() {
            return Err(DslError::Syntax {
                message: "rest(...) requires a path".to_string(),
            });
        }
        if self.rests.contains_key(&path) {
            return Err(DslError::DuplicateRestPath { path });
        }

        debug!(path = %path, "registering rest definition");
        let (index, _) = self.rests.insert_full(
            path.clone(),
            RestDefinition {
                path,
                verbs: Vec::new(),
            },
        );
        Ok(RestId(index))
    }

    fn add_verb(
        &mut self,
        rest: RestId,
        method: HttpMethod,
        uri: Option<String>,
    ) -> Result<VerbId, DslError> {
        let definition = self.rest_mut(rest)?;
        definition.verbs.push(Verb::new(method, uri));
        Ok(VerbId {
            rest,
            index: definition.verbs.len() - 1,
        })
    }

    fn configure_verb(&mut self, verb: VerbId, setting: VerbSetting) -> Result<(), DslError> {
        let target = self
            .rest_mut(verb.rest)?
            .verbs
            .get_mut(verb.index)
            .ok_or_else(|| stale_handle("verb"))?;

        match setting {
            VerbSetting::Consumes(media_type) => target.consumes = Some(media_type),
            VerbSetting::Produces(media_type) => target.produces = Some(media_type),
            VerbSetting::To(uri) => target.to = Some(uri),
        }
        Ok(())
    }

    fn register_bean(&mut self, bean: Bean) -> Result<(), DslError> {
        if bean.name.is_empty() || bean.type_name.is_empty() {
            return Err(DslError::Syntax {
                message: "bean(...) requires a name and a type".to_string(),
            });
        }
        self.check_duplicate("bean", &bean.name, self.beans.contains(&bean.name))?;

        debug!(bean = %bean.name, type_name = %bean.type_name, "registering bean");
        if let Some(previous) = self.beans.insert(bean) {
            warn!(bean = %previous.name, "bean registration replaced an earlier one");
        }
        Ok(())
    }

    fn configure(
        &mut self,
        target: ConfigTarget,
        name: String,
        kind: Option<String>,
        properties: PropertyMap,
    ) -> Result<(), DslError> {
        if target == ConfigTarget::ErrorHandler {
            return Err(DslError::Syntax {
                message: "error handlers are declared with error_handler(...)".to_string(),
            });
        }

        let catalog = Arc::clone(&self.catalog);
        let configured = self.configs(target).get(&name);
        let schema = resolve_schema(
            &catalog,
            target,
            &name,
            configured.map(|c| c.kind.as_str()),
            kind.as_deref(),
        )?;

        self.validate_properties(schema, &name, &properties)?;
        self.check_duplicate(target.label(), &name, configured.is_some())?;

        debug!(
            config_target = %target,
            instance = %name,
            kind = %schema.kind,
            "applying configuration"
        );
        let config = PluginConfig {
            name: name.clone(),
            kind: schema.kind.clone(),
            type_name: schema.type_name.clone(),
            properties,
        };
        if self.configs_mut(target).insert(name, config).is_some() {
            warn!(config_target = %target, "configuration replaced an earlier one");
        }
        Ok(())
    }

    fn register_error_handler(
        &mut self,
        id: String,
        kind: String,
        properties: PropertyMap,
    ) -> Result<(), DslError> {
        let catalog = Arc::clone(&self.catalog);
        let schema = error_handler_schema(&catalog, &kind)?;

        self.validate_properties(schema, &id, &properties)?;
        self.check_duplicate("error handler", &id, self.error_handlers.contains_key(&id))?;

        let policy = exception_policy(schema, &id, &properties)?;

        debug!(id = %id, kind = %kind, "registering error handler");
        let handler = ErrorHandler {
            id: id.clone(),
            kind,
            type_name: schema.type_name.clone(),
            properties,
            policy,
        };
        if self.error_handlers.insert(id, handler).is_some() {
            warn!("error handler registration replaced an earlier one");
        }
        Ok(())
    }

    fn resolve_config(
        &self,
        target: ConfigTarget,
        name: &str,
        kind: Option<&str>,
    ) -> Result<(), DslError> {
        if target == ConfigTarget::ErrorHandler {
            let kind = kind.ok_or_else(|| DslError::Syntax {
                message: format!("error handler '{}' needs a kind", name),
            })?;
            return error_handler_schema(&self.catalog, kind).map(|_| ());
        }

        let configured = self.configs(target).get(name).map(|c| c.kind.as_str());
        resolve_schema(&self.catalog, target, name, configured, kind).map(|_| ())
    }

    fn validate_properties(
        &self,
        schema: &KindSchema,
        name: &str,
        properties: &PropertyMap,
    ) -> Result<(), DslError> {
        let unknown = schema.validate(name, properties, self.strict_properties, |bean| {
            self.beans.contains(bean)
        })?;

        for property in unknown {
            warn!(
                instance = %name,
                type_name = %schema.type_name,
                property = %property,
                "keeping property the schema does not declare"
            );
        }
        Ok(())
    }

    fn check_duplicate(&self, kind: &str, name: &str, exists: bool) -> Result<(), DslError> {
        if exists && self.duplicates == DuplicatePolicy::Reject {
            return Err(DslError::DuplicateName {
                kind: kind.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn language_resolves(&self, language: &str) -> bool {
        self.languages.contains_key(language)
            || self
                .catalog
                .lookup(ConfigTarget::Language, language)
                .is_some()
    }

    fn configs(&self, target: ConfigTarget) -> &IndexMap<String, PluginConfig> {
        match target {
            ConfigTarget::Component => &self.components,
            ConfigTarget::Language => &self.languages,
            ConfigTarget::DataFormat => &self.data_formats,
            ConfigTarget::ErrorHandler => {
                unreachable!("error handlers are not plugin configurations")
            }
        }
    }

    fn configs_mut(&mut self, target: ConfigTarget) -> &mut IndexMap<String, PluginConfig> {
        match target {
            ConfigTarget::Component => &mut self.components,
            ConfigTarget::Language => &mut self.languages,
            ConfigTarget::DataFormat => &mut self.data_formats,
            ConfigTarget::ErrorHandler => {
                unreachable!("error handlers are not plugin configurations")
            }
        }
    }

    fn route_mut(&mut self, route: RouteId) -> Result<&mut Route, DslError> {
        self.routes
            .get_mut(route.0)
            .ok_or_else(|| stale_handle("route"))
    }

    fn rest_mut(&mut self, rest: RestId) -> Result<&mut RestDefinition, DslError> {
        self.rests
            .get_index_mut(rest.0)
            .map(|(_, definition)| definition)
            .ok_or_else(|| stale_handle("rest"))
    }

    /// Checks what can only be judged once the whole script has run.
    pub fn verify_complete(&self) -> Result<(), DslError> {
        for definition in self.rests.values() {
            if let Some(verb) = definition.verbs.iter().find(|v| v.to.is_none()) {
                let path = match &verb.uri {
                    Some(uri) => format!("{}{}", definition.path, uri),
                    None => definition.path.clone(),
                };
                return Err(DslError::MissingDestination {
                    path,
                    method: verb.method.to_string(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn record_failure(&mut self, error: DslError) {
        // The first failure is the one that halted the script
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }

    pub(crate) fn take_failure(&mut self) -> Option<DslError> {
        self.failure.take()
    }

    pub fn finalize(self) -> Model {
        Model {
            routes: self.routes,
            rests: self.rests,
            beans: self.beans,
            components: self.components,
            languages: self.languages,
            data_formats: self.data_formats,
            error_handlers: self.error_handlers,
        }
    }
}

/// Picks the schema a configuration statement applies to.
///
/// `configured` is the kind of an earlier instance named `name`. A name that
/// already stands for one type cannot be configured as another.
fn resolve_schema<'c>(
    catalog: &'c Catalog,
    target: ConfigTarget,
    name: &str,
    configured: Option<&str>,
    kind: Option<&str>,
) -> Result<&'c KindSchema, DslError> {
    let existing = configured
        .or_else(|| catalog.lookup(target, name).map(|s| s.kind.as_str()))
        .and_then(|k| catalog.lookup(target, k));

    let Some(kind) = kind else {
        return existing.ok_or_else(|| DslError::unresolved(target.label(), name));
    };

    let schema = catalog
        .lookup(target, kind)
        .ok_or_else(|| DslError::unresolved(target.label(), kind))?;

    if let Some(existing) = existing
        && existing.type_name != schema.type_name
    {
        return Err(DslError::type_mismatch(
            format!("{} '{}'", target, name),
            existing.type_name.as_str(),
            schema.type_name.as_str(),
        ));
    }
    Ok(schema)
}

fn error_handler_schema<'c>(catalog: &'c Catalog, kind: &str) -> Result<&'c KindSchema, DslError> {
    catalog
        .lookup(ConfigTarget::ErrorHandler, kind)
        .ok_or_else(|| DslError::unresolved("error handler kind", kind))
}

fn stale_handle(kind: &str) -> DslError {
    DslError::Script {
        message: format!("{} handle does not belong to this script", kind),
    }
}

fn exception_policy(
    schema: &KindSchema,
    id: &str,
    properties: &PropertyMap,
) -> Result<ExceptionPolicy, DslError> {
    let target = format!("error handler '{}'", id);

    let strategy = match schema.kind.as_str() {
        "none" => HandlerStrategy::None,
        "dead-letter" => HandlerStrategy::DeadLetter {
            uri: properties
                .get("deadLetterUri")
                .and_then(PropertyValue::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        _ => HandlerStrategy::Default,
    };

    let maximum_redeliveries = match properties
        .get("maximumRedeliveries")
        .and_then(PropertyValue::as_i64)
    {
        Some(value) => u32::try_from(value).map_err(|_| {
            DslError::type_mismatch(
                format!("{}.maximumRedeliveries", target),
                "non-negative integer",
                value.to_string(),
            )
        })?,
        None => 0,
    };

    let redelivery_delay_ms = match properties
        .get("redeliveryDelay")
        .and_then(PropertyValue::as_i64)
    {
        Some(value) => u64::try_from(value).map_err(|_| {
            DslError::type_mismatch(
                format!("{}.redeliveryDelay", target),
                "non-negative integer",
                value.to_string(),
            )
        })?,
        None => 0,
    };

    let handled = match properties.get("handled").and_then(PropertyValue::as_list) {
        Some(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    DslError::type_mismatch(
                        format!("{}.handled", target),
                        "string",
                        item.type_name(),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(ExceptionPolicy {
        strategy,
        maximum_redeliveries,
        redelivery_delay_ms,
        handled,
    })
}
