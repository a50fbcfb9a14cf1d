use serde::Serialize;

use crate::model::PropertyMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum HandlerStrategy {
    /// Log and propagate after redeliveries are exhausted.
    Default,
    DeadLetter { uri: String },
    /// Failures propagate without redelivery.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionPolicy {
    pub strategy: HandlerStrategy,
    pub maximum_redeliveries: u32,
    pub redelivery_delay_ms: u64,
    /// Exception types marked as handled.
    pub handled: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorHandler {
    pub id: String,
    pub kind: String,
    pub type_name: String,
    pub properties: PropertyMap,
    pub policy: ExceptionPolicy,
}
