use anyhow::Result;
use mlua::{Lua, LuaOptions, StdLib, Table};

pub const MERGE_LUA_FN_KEY: &str = "merge";
const MERGE_LUA: &str = r#"
-- Detects if a table is array-like (sequential integer keys starting at 1)
local function is_array(t)
    if type(t) ~= "table" then
        return false
    end
    local i = 0
    for _ in pairs(t) do
        i = i + 1
        if t[i] == nil then
            return false
        end
    end
    return true
end

-- Recursively merges two property tables, override values win
function merge(base, override)
    if type(override) ~= "table" then
        return override
    end

    if type(base) ~= "table" then
        return override
    end

    -- Lists are replaced, never merged element-wise
    if is_array(override) and next(override) ~= nil then
        return override
    end

    local result = {}

    for k, v in pairs(base) do
        result[k] = v
    end

    for k, v in pairs(override) do
        if type(v) == "table" and type(result[k]) == "table" and not is_array(v) then
            result[k] = merge(result[k], v)
        else
            result[k] = v
        end
    end

    return result
end

return merge
"#;

/// Globals a route script has no business touching.
const REMOVED_GLOBALS: [&str; 4] = ["io", "require", "dofile", "loadfile"];
const REMOVED_OS_FUNCTIONS: [&str; 6] =
    ["exit", "execute", "remove", "rename", "tmpname", "getenv"];

/// Creates the sandboxed VM a single script is evaluated in.
pub fn create_lua_vm() -> Result<Lua> {
    let lua = Lua::new_with(StdLib::ALL_SAFE, LuaOptions::default())?;

    let os_table: Table = lua.globals().get("os")?;
    for name in REMOVED_OS_FUNCTIONS {
        os_table.raw_remove(name)?;
    }
    lua.globals().set("os", os_table)?;

    for name in REMOVED_GLOBALS {
        lua.globals().raw_remove(name)?;
    }

    let merge_fn: mlua::Function = lua.load(MERGE_LUA).eval()?;
    lua.globals().set(MERGE_LUA_FN_KEY, merge_fn)?;

    Ok(lua)
}
