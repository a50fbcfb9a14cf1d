mod context;
mod instruction;

pub use context::BuilderContext;
pub use instruction::{DuplicatePolicy, Instruction, Outcome, RestId, RouteId, VerbId, VerbSetting};
