use std::sync::{Arc, Mutex, PoisonError};

use mlua::{Error as LuaError, Result as LuaResult, UserData, UserDataMethods, Value};

use crate::{
    builder::{BuilderContext, Instruction, Outcome, RestId, RouteId, VerbId, VerbSetting},
    error::DslError,
    lua::bridge::{endpoint_uri, optional_string, processor, required_string},
    model::{HttpMethod, Step},
};

/// The builder context as seen from inside the script runtime.
///
/// A failing DSL call records its typed error here before raising a Lua
/// error, so the evaluator reports the real cause instead of Lua's rendering
/// of it.
#[derive(Clone)]
pub(crate) struct SharedContext(Arc<Mutex<BuilderContext>>);

impl SharedContext {
    pub(crate) fn new(context: BuilderContext) -> Self {
        Self(Arc::new(Mutex::new(context)))
    }

    pub(crate) fn execute(&self, instruction: Instruction) -> LuaResult<Outcome> {
        let mut context = self.0.lock().unwrap_or_else(PoisonError::into_inner);

        match context.execute(instruction) {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                let message = error.to_string();
                context.record_failure(error);
                Err(LuaError::runtime(message))
            }
        }
    }

    /// Records a failure raised outside the builder, e.g. a bad argument.
    pub(crate) fn fail(&self, error: DslError) -> LuaError {
        let message = error.to_string();
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_failure(error);
        LuaError::runtime(message)
    }

    pub(crate) fn with_context<R>(&self, f: impl FnOnce(&BuilderContext) -> R) -> R {
        f(&self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn into_inner(self) -> Result<BuilderContext, DslError> {
        Arc::try_unwrap(self.0)
            .map(|mutex| mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
            .map_err(|_| DslError::Script {
                message: "builder context is still referenced by the script runtime".to_string(),
            })
    }
}

fn unexpected(outcome: Outcome) -> LuaError {
    LuaError::runtime(format!("unexpected builder outcome {:?}", outcome))
}

#[derive(Clone)]
pub(crate) struct RouteHandle {
    id: RouteId,
    context: SharedContext,
}

impl RouteHandle {
    pub(crate) fn open(context: &SharedContext, input: String) -> LuaResult<Self> {
        match context.execute(Instruction::RegisterRoute { input })? {
            Outcome::Route(id) => Ok(Self {
                id,
                context: context.clone(),
            }),
            other => Err(unexpected(other)),
        }
    }

    fn append(&self, step: Step) -> LuaResult<Self> {
        self.context.execute(Instruction::AppendStep {
            route: self.id,
            step,
        })?;
        Ok(self.clone())
    }
}

impl UserData for RouteHandle {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("to", |_, this, target: Value| {
            let uri = endpoint_uri(&target, "to(...)").map_err(|e| this.context.fail(e))?;
            this.append(Step::To { uri })
        });

        methods.add_method("process", |_, this, target: Value| {
            let processor = processor(&target).map_err(|e| this.context.fail(e))?;
            this.append(Step::Process { processor })
        });

        methods.add_method("log", |_, this, message: Value| {
            let message = required_string(&message, "log(...)").map_err(|e| this.context.fail(e))?;
            this.append(Step::Log { message })
        });

        methods.add_method(
            "transform",
            |_, this, (language, expression): (Value, Value)| {
                let language = required_string(&language, "transform(language)")
                    .map_err(|e| this.context.fail(e))?;
                let expression = required_string(&expression, "transform(expression)")
                    .map_err(|e| this.context.fail(e))?;
                this.append(Step::Transform {
                    language,
                    expression,
                })
            },
        );

        methods.add_method("route_id", |_, this, id: Value| {
            let id = required_string(&id, "route_id(...)").map_err(|e| this.context.fail(e))?;
            this.context
                .execute(Instruction::SetRouteId { route: this.id, id })?;
            Ok(this.clone())
        });

        methods.add_method("error_handler", |_, this, handler: Value| {
            let handler = required_string(&handler, "error_handler(...)")
                .map_err(|e| this.context.fail(e))?;
            this.context.execute(Instruction::AttachErrorHandler {
                route: this.id,
                handler,
            })?;
            Ok(this.clone())
        });
    }
}

#[derive(Clone)]
pub(crate) struct RestHandle {
    id: RestId,
    context: SharedContext,
}

impl RestHandle {
    pub(crate) fn open(context: &SharedContext, path: String) -> LuaResult<Self> {
        match context.execute(Instruction::RegisterRest { path })? {
            Outcome::Rest(id) => Ok(Self {
                id,
                context: context.clone(),
            }),
            other => Err(unexpected(other)),
        }
    }

    fn verb(&self, method: HttpMethod, uri: Option<String>) -> LuaResult<VerbHandle> {
        match self.context.execute(Instruction::AddVerb {
            rest: self.id,
            method,
            uri,
        })? {
            Outcome::Verb(id) => Ok(VerbHandle {
                id,
                context: self.context.clone(),
            }),
            other => Err(unexpected(other)),
        }
    }
}

impl UserData for RestHandle {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        for method in HttpMethod::ALL {
            methods.add_method(method.dsl_name(), move |_, this, uri: Value| {
                let what = format!("{}(...)", method.dsl_name());
                let uri = optional_string(&uri, &what).map_err(|e| this.context.fail(e))?;
                this.verb(method, uri)
            });
        }
    }
}

#[derive(Clone)]
pub(crate) struct VerbHandle {
    id: VerbId,
    context: SharedContext,
}

impl VerbHandle {
    fn set(&self, setting: VerbSetting) -> LuaResult<()> {
        self.context.execute(Instruction::ConfigureVerb {
            verb: self.id,
            setting,
        })?;
        Ok(())
    }
}

impl UserData for VerbHandle {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("consumes", |_, this, media_type: Value| {
            let media_type = required_string(&media_type, "consumes(...)")
                .map_err(|e| this.context.fail(e))?;
            this.set(VerbSetting::Consumes(media_type))?;
            Ok(this.clone())
        });

        methods.add_method("produces", |_, this, media_type: Value| {
            let media_type = required_string(&media_type, "produces(...)")
                .map_err(|e| this.context.fail(e))?;
            this.set(VerbSetting::Produces(media_type))?;
            Ok(this.clone())
        });

        // Wiring ends the verb; further verbs chain off the rest definition
        methods.add_method("to", |_, this, target: Value| {
            let uri = endpoint_uri(&target, "to(...)").map_err(|e| this.context.fail(e))?;
            this.set(VerbSetting::To(uri))?;
            Ok(RestHandle {
                id: this.id.rest(),
                context: this.context.clone(),
            })
        });
    }
}
