use std::collections::BTreeMap;

use routescript::{
    DslError,
    configs::{CatalogExtensions, KindDeclaration},
    model::{PropertyMap, PropertyValue},
    schema::{Catalog, ConfigTarget, FieldSpec, FieldType, KindSchema},
};

fn properties(entries: &[(&str, PropertyValue)]) -> PropertyMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn queue_schema() -> KindSchema {
    KindSchema::new("queue", "QueueComponent")
        .field("size", FieldSpec::required(FieldType::Integer))
        .field("ratio", FieldSpec::optional(FieldType::Number))
        .field("owner", FieldSpec::optional(FieldType::Reference))
}

// ============================================================================
// Field types
// ============================================================================

#[test]
fn test_number_accepts_integers_and_floats() {
    assert!(FieldType::Number.accepts(&PropertyValue::Integer(1)));
    assert!(FieldType::Number.accepts(&PropertyValue::Float(0.5)));
    assert!(!FieldType::Integer.accepts(&PropertyValue::Float(0.5)));
    assert!(!FieldType::Number.accepts(&"1".into()));
}

#[test]
fn test_empty_table_counts_as_list() {
    assert!(FieldType::List.accepts(&PropertyValue::Map(PropertyMap::new())));
    assert!(FieldType::Map.accepts(&PropertyValue::Map(PropertyMap::new())));
    assert!(!FieldType::List.accepts(&PropertyValue::Map(properties(&[(
        "a",
        PropertyValue::Integer(1)
    )]))));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_accepts_declared_properties() {
    let unknown = queue_schema()
        .validate(
            "orders",
            &properties(&[
                ("size", PropertyValue::Integer(10)),
                ("ratio", PropertyValue::Integer(2)),
                ("owner", "team".into()),
            ]),
            true,
            |bean| bean == "team",
        )
        .unwrap();

    assert!(unknown.is_empty());
}

#[test]
fn test_validate_reports_missing_required_property() {
    let err = queue_schema()
        .validate("orders", &PropertyMap::new(), true, |_| true)
        .unwrap_err();

    match err {
        DslError::MissingProperty { target, property } => {
            assert_eq!(target, "queue 'orders' (QueueComponent)");
            assert_eq!(property, "size");
        }
        other => panic!("Expected MissingProperty, got {:?}", other),
    }
}

#[test]
fn test_validate_unknown_properties_when_lenient() {
    let unknown = queue_schema()
        .validate(
            "orders",
            &properties(&[
                ("size", PropertyValue::Integer(1)),
                ("colour", "blue".into()),
            ]),
            false,
            |_| true,
        )
        .unwrap();

    assert_eq!(unknown, vec!["colour".to_string()]);
}

#[test]
fn test_validate_unresolved_reference() {
    let err = queue_schema()
        .validate(
            "orders",
            &properties(&[("size", PropertyValue::Integer(1)), ("owner", "ghost".into())]),
            true,
            |_| false,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        DslError::UnresolvedReference { ref kind, ref name } if kind == "bean" && name == "ghost"
    ));
}

// ============================================================================
// Catalog
// ============================================================================

#[test]
fn test_builtin_catalog() {
    let catalog = Catalog::builtin();

    let components: Vec<&str> = catalog.kinds(ConfigTarget::Component).collect();
    for kind in ["timer", "log", "seda", "direct", "rest", "jms", "mock"] {
        assert!(components.contains(&kind), "missing component {}", kind);
    }

    assert_eq!(
        catalog.lookup(ConfigTarget::Component, "log").unwrap().type_name,
        "LogComponent"
    );
    assert_eq!(
        catalog
            .lookup(ConfigTarget::DataFormat, "json-jackson")
            .unwrap()
            .type_name,
        "JacksonDataFormat"
    );
    assert!(catalog.lookup(ConfigTarget::Language, "simple").is_some());
    assert!(catalog.lookup(ConfigTarget::ErrorHandler, "dead-letter").is_some());
    assert!(catalog.lookup(ConfigTarget::Component, "json-jackson").is_none());
    assert!(Catalog::empty().kinds(ConfigTarget::Component).next().is_none());
}

#[test]
fn test_catalog_extension_replaces_and_adds() {
    let mut components = BTreeMap::new();
    components.insert(
        "seda".to_string(),
        KindDeclaration {
            type_name: "CustomSeda".to_string(),
            properties: BTreeMap::from([("size".to_string(), FieldType::Integer)]),
            required: vec!["size".to_string()],
        },
    );
    components.insert(
        "ftp".to_string(),
        KindDeclaration {
            type_name: "FtpComponent".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        },
    );

    let mut catalog = Catalog::builtin();
    catalog
        .extend(&CatalogExtensions {
            components,
            ..Default::default()
        })
        .unwrap();

    let seda = catalog.lookup(ConfigTarget::Component, "seda").unwrap();
    assert_eq!(seda.type_name, "CustomSeda");
    assert!(seda.fields["size"].required);
    assert!(catalog.lookup(ConfigTarget::Component, "ftp").is_some());
}

#[test]
fn test_catalog_extension_rejects_bad_declaration() {
    let mut languages = BTreeMap::new();
    languages.insert(
        "groovy".to_string(),
        KindDeclaration {
            type_name: String::new(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        },
    );

    let mut catalog = Catalog::builtin();
    let result = catalog.extend(&CatalogExtensions {
        languages,
        ..Default::default()
    });

    assert!(result.is_err());
    assert!(catalog.lookup(ConfigTarget::Language, "groovy").is_none());
}
