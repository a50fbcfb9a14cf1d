use mlua::{Function, Lua, Result as LuaResult, Value};

use crate::{
    builder::Instruction,
    lua::{
        bridge::{
            endpoint_uri, format_endpoint, lua_value_to_properties, optional_string,
            required_string,
        },
        handles::{RestHandle, RouteHandle, SharedContext},
    },
    model::{Bean, BeanOrigin},
    schema::ConfigTarget,
};

const DEFAULT_ERROR_HANDLER_KIND: &str = "default";

/// Installs the route DSL as globals of `lua`.
///
/// ```lua
/// from("timer:tick"):process(function() end):to("log:info")
/// rest("/api"):get("/items"):produces("application/json"):to("direct:items")
/// bean("dataSource", "BasicDataSource", { url = "jdbc:h2:mem:test" })
/// component("mySeda", "seda") { queueSize = 1234 }
/// error_handler("dlc", "dead-letter") { deadLetterUri = "seda:dead" }
/// ```
pub(crate) fn register_dsl(lua: &Lua, context: &SharedContext) -> LuaResult<()> {
    let globals = lua.globals();

    let shared = context.clone();
    let from_fn = lua.create_function(move |_, input: Value| {
        let input = endpoint_uri(&input, "from(...)").map_err(|e| shared.fail(e))?;
        RouteHandle::open(&shared, input)
    })?;
    globals.set("from", from_fn)?;

    let shared = context.clone();
    let rest_fn = lua.create_function(move |_, path: Value| {
        let path = required_string(&path, "rest(...)").map_err(|e| shared.fail(e))?;
        RestHandle::open(&shared, path)
    })?;
    globals.set("rest", rest_fn)?;

    let shared = context.clone();
    let bean_fn = lua.create_function(
        move |_, (name, type_name, value): (Value, Value, Value)| {
            let name = required_string(&name, "bean(name)").map_err(|e| shared.fail(e))?;
            let type_name =
                required_string(&type_name, "bean(type)").map_err(|e| shared.fail(e))?;

            // Factories run before the context is locked; they are plain script code
            let (value, origin) = match value {
                Value::Function(factory) => (factory.call::<Value>(())?, BeanOrigin::Factory),
                other => (other, BeanOrigin::Literal),
            };
            let properties = lua_value_to_properties(value, &format!("bean '{}'", name))
                .map_err(|e| shared.fail(e))?;

            shared.execute(Instruction::RegisterBean(Bean {
                name,
                type_name,
                properties,
                origin,
            }))?;
            Ok(())
        },
    )?;
    globals.set("bean", bean_fn)?;

    globals.set(
        "component",
        configure_fn(lua, context, ConfigTarget::Component)?,
    )?;
    globals.set("language", configure_fn(lua, context, ConfigTarget::Language)?)?;
    globals.set(
        "dataformat",
        configure_fn(lua, context, ConfigTarget::DataFormat)?,
    )?;

    let shared = context.clone();
    let error_handler_fn = lua.create_function(move |lua, (id, kind): (Value, Value)| {
        let id = required_string(&id, "error_handler(id)").map_err(|e| shared.fail(e))?;
        let kind = optional_string(&kind, "error_handler(kind)")
            .map_err(|e| shared.fail(e))?
            .unwrap_or_else(|| DEFAULT_ERROR_HANDLER_KIND.to_string());
        shared.execute(Instruction::ResolveConfig {
            target: ConfigTarget::ErrorHandler,
            name: id.clone(),
            kind: Some(kind.clone()),
        })?;

        let shared = shared.clone();
        lua.create_function(move |_, properties: Value| {
            let properties =
                lua_value_to_properties(properties, &format!("error handler '{}'", id))
                    .map_err(|e| shared.fail(e))?;
            shared.execute(Instruction::RegisterErrorHandler {
                id: id.clone(),
                kind: kind.clone(),
                properties,
            })?;
            Ok(())
        })
    })?;
    globals.set("error_handler", error_handler_fn)?;

    globals.set("endpoints", endpoint_builders(lua, context)?)?;

    Ok(())
}

/// `component(name, kind?)` returns a function taking the properties table,
/// which allows `component "seda" { queueSize = 10 }`. The name and kind are
/// resolved right away, so a statement missing its table still fails.
fn configure_fn(lua: &Lua, context: &SharedContext, target: ConfigTarget) -> LuaResult<Function> {
    let shared = context.clone();
    lua.create_function(move |lua, (name, kind): (Value, Value)| {
        let label = target.label();
        let name = required_string(&name, &format!("{}(name)", label))
            .map_err(|e| shared.fail(e))?;
        let kind = optional_string(&kind, &format!("{}(kind)", label))
            .map_err(|e| shared.fail(e))?;
        shared.execute(Instruction::ResolveConfig {
            target,
            name: name.clone(),
            kind: kind.clone(),
        })?;

        let shared = shared.clone();
        lua.create_function(move |_, properties: Value| {
            let properties = lua_value_to_properties(properties, &format!("{} '{}'", label, name))
                .map_err(|e| shared.fail(e))?;
            shared.execute(Instruction::Configure {
                target,
                name: name.clone(),
                kind: kind.clone(),
                properties,
            })?;
            Ok(())
        })
    })
}

/// `endpoints.<component kind>(path, params?)` for every known component.
fn endpoint_builders(lua: &Lua, context: &SharedContext) -> LuaResult<mlua::Table> {
    let table = lua.create_table()?;

    let schemes: Vec<String> = context.with_context(|ctx| {
        ctx.catalog()
            .kinds(ConfigTarget::Component)
            .map(str::to_string)
            .collect()
    });

    for scheme in schemes {
        let shared = context.clone();
        let key = scheme.clone();
        let builder = lua.create_function(move |_, (path, params): (Value, Value)| {
            let what = format!("endpoints.{}", scheme);
            let path = optional_string(&path, &what)
                .map_err(|e| shared.fail(e))?
                .unwrap_or_default();
            let params = lua_value_to_properties(params, &what).map_err(|e| shared.fail(e))?;
            Ok(format_endpoint(&scheme, &path, &params))
        })?;
        table.set(key, builder)?;
    }

    Ok(table)
}
