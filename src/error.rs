use std::io;

use thiserror::Error;

/// Everything that can stop a script from becoming a [`Model`](crate::Model).
///
/// Evaluation halts on the first of these; nothing is retried.
#[derive(Debug, Error)]
pub enum DslError {
    #[error("script resource not found: {reference}")]
    ResourceNotFound { reference: String },

    #[error("failed to read script '{reference}': {source}")]
    Unreadable {
        reference: String,
        #[source]
        source: io::Error,
    },

    #[error("syntax error: {message}")]
    Syntax { message: String },

    #[error("type mismatch for {target}, expected: {expected}, actual: {actual}")]
    TypeMismatch {
        target: String,
        expected: String,
        actual: String,
    },

    #[error("unresolved {kind} reference '{name}'")]
    UnresolvedReference { kind: String, name: String },

    #[error("{target} has no property named '{property}'")]
    UnknownProperty { target: String, property: String },

    #[error("{target} requires property '{property}'")]
    MissingProperty { target: String, property: String },

    #[error("{kind} '{name}' is already registered")]
    DuplicateName { kind: String, name: String },

    #[error("rest path '{path}' is already defined")]
    DuplicateRestPath { path: String },

    #[error("{method} {path} is not wired to a destination (missing to(...))")]
    MissingDestination { path: String, method: String },

    #[error("script error: {message}")]
    Script { message: String },
}

impl DslError {
    pub(crate) fn unresolved(kind: &str, name: impl Into<String>) -> Self {
        DslError::UnresolvedReference {
            kind: kind.to_string(),
            name: name.into(),
        }
    }

    pub(crate) fn type_mismatch(
        target: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        DslError::TypeMismatch {
            target: target.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// The single error surfaced by [`Loader::load`](crate::Loader::load).
#[derive(Debug, Error)]
#[error("failed to load script '{script}': {cause}")]
pub struct LoadError {
    pub script: String,
    #[source]
    pub cause: DslError,
}

impl LoadError {
    pub fn new(script: impl Into<String>, cause: DslError) -> Self {
        Self {
            script: script.into(),
            cause,
        }
    }

    pub fn cause(&self) -> &DslError {
        &self.cause
    }

    pub fn into_cause(self) -> DslError {
        self.cause
    }
}
