use serde::{Deserialize, Serialize};

use crate::{
    model::{Bean, HttpMethod, PropertyMap, Step},
    schema::ConfigTarget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RestId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerbId {
    pub(crate) rest: RestId,
    pub(crate) index: usize,
}

impl VerbId {
    pub fn rest(&self) -> RestId {
        self.rest
    }
}

/// What happens when a name is registered twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Last write wins.
    #[default]
    Replace,
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerbSetting {
    Consumes(String),
    Produces(String),
    To(String),
}

/// The fixed set of operations a script can perform on a
/// [`BuilderContext`](crate::builder::BuilderContext).
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    RegisterRoute {
        input: String,
    },
    AppendStep {
        route: RouteId,
        step: Step,
    },
    SetRouteId {
        route: RouteId,
        id: String,
    },
    AttachErrorHandler {
        route: RouteId,
        handler: String,
    },
    RegisterRest {
        path: String,
    },
    AddVerb {
        rest: RestId,
        method: HttpMethod,
        uri: Option<String>,
    },
    ConfigureVerb {
        verb: VerbId,
        setting: VerbSetting,
    },
    RegisterBean(Bean),
    /// Checks that a configuration statement resolves, before its
    /// properties are known.
    ResolveConfig {
        target: ConfigTarget,
        name: String,
        kind: Option<String>,
    },
    /// Component, language or data-format configuration.
    Configure {
        target: ConfigTarget,
        name: String,
        kind: Option<String>,
        properties: PropertyMap,
    },
    RegisterErrorHandler {
        id: String,
        kind: String,
        properties: PropertyMap,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Route(RouteId),
    Rest(RestId),
    Verb(VerbId),
    Applied,
}
