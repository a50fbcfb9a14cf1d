//! Loads route-definition scripts into an immutable routing [`Model`].
//!
//! Scripts are Lua, evaluated in a sandbox with a small DSL:
//!
//! ```no_run
//! use routescript::Loader;
//!
//! # fn main() -> Result<(), routescript::LoadError> {
//! let model = Loader::new().load_str(
//!     "inline",
//!     r#"from("timer:tick"):to("log:info")"#,
//! )?;
//! assert_eq!(model.routes().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod configs;
pub mod error;
pub mod lua;
pub mod model;
pub mod schema;
pub mod script;

pub use builder::{BuilderContext, DuplicatePolicy, Instruction, Outcome};
pub use configs::{Config, find_config_file, load_config, validate_config};
pub use error::{DslError, LoadError};
pub use lua::create_lua_vm;
pub use model::Model;
pub use schema::Catalog;
pub use script::{Evaluator, Loader, Script, ScriptSource, load};
