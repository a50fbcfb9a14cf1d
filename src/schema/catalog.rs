use anyhow::Result;
use indexmap::IndexMap;

use crate::{
    configs::{CatalogExtensions, KindDeclaration},
    schema::{ConfigTarget, FieldSpec, FieldType, KindSchema},
};

/// Every kind a script may configure, grouped by target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    components: IndexMap<String, KindSchema>,
    languages: IndexMap<String, KindSchema>,
    data_formats: IndexMap<String, KindSchema>,
    error_handlers: IndexMap<String, KindSchema>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let opt = FieldSpec::optional;

        let mut catalog = Self::empty();

        catalog.register(
            ConfigTarget::Component,
            KindSchema::new("timer", "TimerComponent")
                .field("includeMetadata", opt(FieldType::Boolean)),
        );
        catalog.register(
            ConfigTarget::Component,
            KindSchema::new("log", "LogComponent")
                .field("exchangeFormatter", opt(FieldType::Reference))
                .field("sourceLocationLoggerName", opt(FieldType::Boolean)),
        );
        catalog.register(
            ConfigTarget::Component,
            KindSchema::new("seda", "SedaComponent")
                .field("queueSize", opt(FieldType::Integer))
                .field("concurrentConsumers", opt(FieldType::Integer))
                .field("defaultBlockWhenFull", opt(FieldType::Boolean))
                .field("defaultOfferTimeout", opt(FieldType::Integer)),
        );
        catalog.register(
            ConfigTarget::Component,
            KindSchema::new("direct", "DirectComponent")
                .field("block", opt(FieldType::Boolean))
                .field("timeout", opt(FieldType::Integer)),
        );
        catalog.register(
            ConfigTarget::Component,
            KindSchema::new("rest", "RestComponent")
                .field("host", opt(FieldType::String))
                .field("consumerComponentName", opt(FieldType::String))
                .field("producerComponentName", opt(FieldType::String)),
        );
        catalog.register(
            ConfigTarget::Component,
            KindSchema::new("jms", "JmsComponent")
                .field("connectionFactory", opt(FieldType::Reference))
                .field("concurrentConsumers", opt(FieldType::Integer))
                .field("transacted", opt(FieldType::Boolean)),
        );
        catalog.register(
            ConfigTarget::Component,
            KindSchema::new("mock", "MockComponent").field("log", opt(FieldType::Boolean)),
        );

        catalog.register(
            ConfigTarget::Language,
            KindSchema::new("simple", "SimpleLanguage")
                .field("trim", opt(FieldType::Boolean)),
        );
        catalog.register(
            ConfigTarget::Language,
            KindSchema::new("constant", "ConstantLanguage")
                .field("trim", opt(FieldType::Boolean)),
        );
        catalog.register(
            ConfigTarget::Language,
            KindSchema::new("bean", "BeanLanguage")
                .field("beanType", opt(FieldType::String))
                .field("method", opt(FieldType::String))
                .field("scope", opt(FieldType::String)),
        );
        catalog.register(
            ConfigTarget::Language,
            KindSchema::new("jsonpath", "JsonPathLanguage")
                .field("suppressExceptions", opt(FieldType::Boolean))
                .field("allowSimple", opt(FieldType::Boolean)),
        );

        catalog.register(
            ConfigTarget::DataFormat,
            KindSchema::new("json-jackson", "JacksonDataFormat")
                .field("prettyPrint", opt(FieldType::Boolean))
                .field("unmarshalType", opt(FieldType::String))
                .field("include", opt(FieldType::String))
                .field("moduleClassNames", opt(FieldType::List)),
        );
        catalog.register(
            ConfigTarget::DataFormat,
            KindSchema::new("csv", "CsvDataFormat")
                .field("delimiter", opt(FieldType::String))
                .field("skipHeaderRecord", opt(FieldType::Boolean))
                .field("header", opt(FieldType::List)),
        );
        catalog.register(
            ConfigTarget::DataFormat,
            KindSchema::new("base64", "Base64DataFormat")
                .field("lineLength", opt(FieldType::Integer))
                .field("urlSafe", opt(FieldType::Boolean)),
        );

        let redelivery = |schema: KindSchema| {
            schema
                .field("maximumRedeliveries", opt(FieldType::Integer))
                .field("redeliveryDelay", opt(FieldType::Integer))
                .field("backOffMultiplier", opt(FieldType::Number))
                .field("handled", opt(FieldType::List))
                .field("headers", opt(FieldType::Map))
        };
        catalog.register(
            ConfigTarget::ErrorHandler,
            redelivery(KindSchema::new("default", "DefaultErrorHandler")),
        );
        catalog.register(
            ConfigTarget::ErrorHandler,
            redelivery(
                KindSchema::new("dead-letter", "DeadLetterChannel")
                    .field("deadLetterUri", FieldSpec::required(FieldType::String)),
            ),
        );
        catalog.register(
            ConfigTarget::ErrorHandler,
            KindSchema::new("none", "NoErrorHandler"),
        );

        catalog
    }

    /// Adds (or replaces) kinds declared in configuration.
    pub fn extend(&mut self, extensions: &CatalogExtensions) -> Result<()> {
        let groups = [
            (ConfigTarget::Component, &extensions.components),
            (ConfigTarget::Language, &extensions.languages),
            (ConfigTarget::DataFormat, &extensions.data_formats),
        ];

        for (target, declarations) in groups {
            for (kind, declaration) in declarations {
                self.register(target, schema_from_declaration(kind, declaration)?);
            }
        }

        Ok(())
    }

    pub fn register(&mut self, target: ConfigTarget, schema: KindSchema) {
        self.group_mut(target).insert(schema.kind.clone(), schema);
    }

    pub fn lookup(&self, target: ConfigTarget, kind: &str) -> Option<&KindSchema> {
        self.group(target).get(kind)
    }

    pub fn kinds(&self, target: ConfigTarget) -> impl Iterator<Item = &str> {
        self.group(target).keys().map(|k| k.as_str())
    }

    fn group(&self, target: ConfigTarget) -> &IndexMap<String, KindSchema> {
        match target {
            ConfigTarget::Component => &self.components,
            ConfigTarget::Language => &self.languages,
            ConfigTarget::DataFormat => &self.data_formats,
            ConfigTarget::ErrorHandler => &self.error_handlers,
        }
    }

    fn group_mut(&mut self, target: ConfigTarget) -> &mut IndexMap<String, KindSchema> {
        match target {
            ConfigTarget::Component => &mut self.components,
            ConfigTarget::Language => &mut self.languages,
            ConfigTarget::DataFormat => &mut self.data_formats,
            ConfigTarget::ErrorHandler => &mut self.error_handlers,
        }
    }
}

fn schema_from_declaration(kind: &str, declaration: &KindDeclaration) -> Result<KindSchema> {
    declaration.validate(kind)?;

    let mut schema = KindSchema::new(kind, declaration.type_name.as_str());
    for (field, ty) in &declaration.properties {
        let spec = if declaration.required.contains(field) {
            FieldSpec::required(*ty)
        } else {
            FieldSpec::optional(*ty)
        };
        schema = schema.field(field, spec);
    }

    Ok(schema)
}
