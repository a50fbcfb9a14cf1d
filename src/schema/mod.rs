mod catalog;
mod field;
mod kind;

pub use catalog::Catalog;
pub use field::{FieldSpec, FieldType};
pub use kind::{ConfigTarget, KindSchema};
