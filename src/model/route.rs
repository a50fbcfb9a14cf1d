use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Process { processor: Processor },
    To { uri: String },
    Log { message: String },
    Transform { language: String, expression: String },
}

impl Step {
    pub fn is_process(&self) -> bool {
        matches!(self, Step::Process { .. })
    }

    /// Endpoint a forwarding step sends to.
    pub fn target_uri(&self) -> Option<&str> {
        match self {
            Step::To { uri } => Some(uri),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Processor {
    /// A registered bean, looked up by name.
    Bean(String),
    /// A function defined inline in the script.
    Inline,
}

/// One input endpoint followed by ordered outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub id: Option<String>,
    pub input: String,
    pub outputs: Vec<Step>,
    pub error_handler: Option<String>,
}

impl Route {
    pub(crate) fn new(input: String) -> Self {
        Self {
            id: None,
            input,
            outputs: Vec::new(),
            error_handler: None,
        }
    }
}
