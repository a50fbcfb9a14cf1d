mod bridge;
mod dsl;
mod handles;
mod runtime;

pub use bridge::{format_endpoint, lua_value_to_properties, lua_value_to_property};
pub(crate) use dsl::register_dsl;
pub(crate) use handles::SharedContext;
pub use runtime::{MERGE_LUA_FN_KEY, create_lua_vm};
