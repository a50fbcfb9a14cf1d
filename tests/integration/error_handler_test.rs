//! Integration tests for error handlers and their attachment to routes

use routescript::{
    DslError, Loader,
    model::{HandlerStrategy, PropertyValue},
};

fn load(script: &str) -> Result<routescript::Model, routescript::LoadError> {
    Loader::new().load_str("handlers.lua", script)
}

#[test]
fn test_dead_letter_handler_policy() {
    let model = load(
        r#"
error_handler("dlc", "dead-letter") {
    deadLetterUri = "seda:dead",
    maximumRedeliveries = 3,
    redeliveryDelay = 250,
    handled = { "IOException", "TimeoutException" },
}
"#,
    )
    .unwrap();

    let handler = model.error_handler("dlc").unwrap();
    assert_eq!(handler.kind, "dead-letter");
    assert_eq!(handler.type_name, "DeadLetterChannel");
    assert_eq!(
        handler.policy.strategy,
        HandlerStrategy::DeadLetter {
            uri: "seda:dead".to_string()
        }
    );
    assert_eq!(handler.policy.maximum_redeliveries, 3);
    assert_eq!(handler.policy.redelivery_delay_ms, 250);
    assert_eq!(
        handler.policy.handled,
        vec!["IOException".to_string(), "TimeoutException".to_string()]
    );
    assert_eq!(
        handler.properties.get("deadLetterUri"),
        Some(&PropertyValue::from("seda:dead"))
    );
}

#[test]
fn test_default_kind_when_omitted() {
    let model = load(r#"error_handler "retry" { maximumRedeliveries = 5 }"#).unwrap();

    let handler = model.error_handler("retry").unwrap();
    assert_eq!(handler.kind, "default");
    assert_eq!(handler.type_name, "DefaultErrorHandler");
    assert_eq!(handler.policy.strategy, HandlerStrategy::Default);
    assert_eq!(handler.policy.maximum_redeliveries, 5);
    assert_eq!(handler.policy.redelivery_delay_ms, 0);
    assert!(handler.policy.handled.is_empty());
}

#[test]
fn test_no_error_handler() {
    let model = load(r#"error_handler("off", "none") {}"#).unwrap();

    let handler = model.error_handler("off").unwrap();
    assert_eq!(handler.policy.strategy, HandlerStrategy::None);
    assert_eq!(handler.policy.maximum_redeliveries, 0);
}

#[test]
fn test_dead_letter_requires_uri() {
    let err = load(r#"error_handler("dlc", "dead-letter") { maximumRedeliveries = 1 }"#)
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        DslError::MissingProperty { property, .. } if property == "deadLetterUri"
    ));
}

#[test]
fn test_negative_redeliveries_rejected() {
    let err = load(r#"error_handler "retry" { maximumRedeliveries = -1 }"#).unwrap_err();

    match err.cause() {
        DslError::TypeMismatch {
            target,
            expected,
            actual,
        } => {
            assert!(target.ends_with("maximumRedeliveries"));
            assert_eq!(expected, "non-negative integer");
            assert_eq!(actual, "-1");
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_handled_entries_must_be_strings() {
    let err = load(r#"error_handler "retry" { handled = { 1, 2 } }"#).unwrap_err();

    assert!(matches!(
        err.cause(),
        DslError::TypeMismatch { expected, actual, .. }
            if expected == "string" && actual == "integer"
    ));
}

#[test]
fn test_unknown_handler_kind() {
    let err = load(r#"error_handler("x", "circuit-breaker") {}"#).unwrap_err();

    assert!(matches!(
        err.cause(),
        DslError::UnresolvedReference { kind, name }
            if kind == "error handler kind" && name == "circuit-breaker"
    ));
}

#[test]
fn test_unknown_handler_kind_without_table() {
    let err = load(r#"error_handler("x", "nope")"#).unwrap_err();

    assert!(matches!(
        err.cause(),
        DslError::UnresolvedReference { kind, name }
            if kind == "error handler kind" && name == "nope"
    ));
}

#[test]
fn test_routes_reference_handlers() {
    let model = load(
        r#"
error_handler("dlc", "dead-letter") { deadLetterUri = "seda:dead" }

from("direct:orders"):error_handler("dlc"):to("mock:orders")
from("direct:invoices"):error_handler("dlc"):to("mock:invoices")
from("direct:audit"):to("mock:audit")
"#,
    )
    .unwrap();

    assert_eq!(
        model.routes()[0].error_handler.as_deref(),
        Some("dlc")
    );
    assert_eq!(model.routes()[2].error_handler, None);

    let using: Vec<&str> = model
        .routes_using("dlc")
        .iter()
        .map(|r| r.input.as_str())
        .collect();
    assert_eq!(using, vec!["direct:orders", "direct:invoices"]);
}

#[test]
fn test_route_with_unknown_handler_fails() {
    let err = load(r#"from("direct:a"):error_handler("missing")"#).unwrap_err();

    assert!(matches!(
        err.cause(),
        DslError::UnresolvedReference { kind, name }
            if kind == "error handler" && name == "missing"
    ));
}
