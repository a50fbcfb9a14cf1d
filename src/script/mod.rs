mod evaluator;
mod loader;
mod source;

pub use evaluator::Evaluator;
pub use loader::{Loader, load};
pub use source::{Script, ScriptSource};
