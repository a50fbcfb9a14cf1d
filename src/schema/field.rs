use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::PropertyValue;

/// Declared type of one configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    /// Integer or float.
    Number,
    Boolean,
    List,
    Map,
    /// Name of a registered bean.
    Reference,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
            FieldType::Map => "map",
            FieldType::Reference => "reference",
        }
    }

    pub fn accepts(&self, value: &PropertyValue) -> bool {
        match (self, value) {
            (FieldType::String | FieldType::Reference, PropertyValue::String(_)) => true,
            (FieldType::Integer, PropertyValue::Integer(_)) => true,
            (FieldType::Number, PropertyValue::Integer(_) | PropertyValue::Float(_)) => true,
            (FieldType::Boolean, PropertyValue::Boolean(_)) => true,
            (FieldType::List, value) => value.as_list().is_some(),
            (FieldType::Map, PropertyValue::Map(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub ty: FieldType,
    pub required: bool,
}

impl FieldSpec {
    pub const fn optional(ty: FieldType) -> Self {
        Self {
            ty,
            required: false,
        }
    }

    pub const fn required(ty: FieldType) -> Self {
        Self { ty, required: true }
    }
}
