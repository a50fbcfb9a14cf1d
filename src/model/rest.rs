use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 6] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Name of the DSL method that declares this verb (`get`, `post`, ...).
    pub fn dsl_name(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verb {
    pub method: HttpMethod,
    pub uri: Option<String>,
    pub consumes: Option<String>,
    pub produces: Option<String>,
    pub to: Option<String>,
}

impl Verb {
    pub(crate) fn new(method: HttpMethod, uri: Option<String>) -> Self {
        Self {
            method,
            uri,
            consumes: None,
            produces: None,
            to: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestDefinition {
    pub path: String,
    pub verbs: Vec<Verb>,
}

impl RestDefinition {
    pub fn verbs_for(&self, method: HttpMethod) -> impl Iterator<Item = &Verb> {
        self.verbs.iter().filter(move |verb| verb.method == method)
    }
}
