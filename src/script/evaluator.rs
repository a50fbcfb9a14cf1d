use tracing::debug;

use crate::{
    builder::BuilderContext,
    error::DslError,
    lua::{SharedContext, create_lua_vm, register_dsl},
    script::Script,
};

/// Runs a script against a builder context in a fresh, sandboxed VM.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    /// Executes every statement in order and hands the context back.
    ///
    /// The first failing statement halts the script. Registrations applied
    /// before it are not rolled back; the context is simply not returned.
    pub fn evaluate(
        &self,
        script: &Script,
        context: BuilderContext,
    ) -> Result<BuilderContext, DslError> {
        let shared = SharedContext::new(context);

        let result = run(script, &shared);

        // The VM is gone once `run` returns, so the context is ours again
        let mut context = shared.into_inner()?;

        // A recorded failure wins even if the script swallowed it with pcall
        if let Some(failure) = context.take_failure() {
            debug!(script = %script.name, error = %failure, "script halted");
            return Err(failure);
        }
        result?;

        context.verify_complete()?;
        Ok(context)
    }
}

fn run(script: &Script, shared: &SharedContext) -> Result<(), DslError> {
    let lua = create_lua_vm().map_err(|e| DslError::Script {
        message: format!("Failed to create script runtime: {:#}", e),
    })?;

    register_dsl(&lua, shared).map_err(lua_error)?;

    lua.load(script.text.as_str())
        .set_name(script.name.as_str())
        .exec()
        .map_err(lua_error)
}

fn lua_error(error: mlua::Error) -> DslError {
    match error {
        mlua::Error::SyntaxError { message, .. } => DslError::Syntax { message },
        other => DslError::Script {
            message: other.to_string(),
        },
    }
}
