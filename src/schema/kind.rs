use std::fmt;

use indexmap::IndexMap;

use crate::{
    error::DslError,
    model::PropertyMap,
    schema::{FieldSpec, FieldType},
};

/// What a configuration statement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigTarget {
    Component,
    Language,
    DataFormat,
    ErrorHandler,
}

impl ConfigTarget {
    pub fn label(&self) -> &'static str {
        match self {
            ConfigTarget::Component => "component",
            ConfigTarget::Language => "language",
            ConfigTarget::DataFormat => "dataformat",
            ConfigTarget::ErrorHandler => "error handler",
        }
    }
}

impl fmt::Display for ConfigTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The configuration surface of one pluggable kind, e.g. `seda`.
#[derive(Debug, Clone, PartialEq)]
pub struct KindSchema {
    pub kind: String,
    pub type_name: String,
    pub fields: IndexMap<String, FieldSpec>,
}

impl KindSchema {
    pub fn new(kind: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, name: &str, spec: FieldSpec) -> Self {
        self.fields.insert(name.to_string(), spec);
        self
    }

    /// Checks `properties` against the declared fields.
    ///
    /// Unknown keys fail in strict mode and are reported back otherwise, so
    /// the caller decides how loudly to keep them. `bean_exists` resolves
    /// [`FieldType::Reference`] values.
    pub fn validate(
        &self,
        instance: &str,
        properties: &PropertyMap,
        strict: bool,
        bean_exists: impl Fn(&str) -> bool,
    ) -> Result<Vec<String>, DslError> {
        let target = format!("{} '{}' ({})", self.kind, instance, self.type_name);
        let mut unknown = Vec::new();

        for (key, value) in properties {
            let Some(spec) = self.fields.get(key) else {
                if strict {
                    return Err(DslError::UnknownProperty {
                        target,
                        property: key.clone(),
                    });
                }
                unknown.push(key.clone());
                continue;
            };

            if !spec.ty.accepts(value) {
                return Err(DslError::type_mismatch(
                    format!("{}.{}", target, key),
                    spec.ty.name(),
                    value.type_name(),
                ));
            }

            if spec.ty == FieldType::Reference
                && let Some(name) = value.as_str()
                && !bean_exists(name)
            {
                return Err(DslError::unresolved("bean", name));
            }
        }

        if let Some((missing, _)) = self
            .fields
            .iter()
            .find(|(key, spec)| spec.required && !properties.contains_key(*key))
        {
            return Err(DslError::MissingProperty {
                target,
                property: missing.clone(),
            });
        }

        Ok(unknown)
    }
}
