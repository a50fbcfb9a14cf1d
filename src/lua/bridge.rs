use std::collections::HashSet;

use mlua::{Table, Value};

use crate::{
    error::DslError,
    model::{Processor, PropertyMap, PropertyValue},
};

/// Deepest table nesting accepted in a property value.
const MAX_PROPERTY_DEPTH: usize = 64;

/// Converts a script value into a [`PropertyValue`].
///
/// `path` names the value in error messages, e.g. `seda.queueSize`.
pub fn lua_value_to_property(value: Value, path: &str) -> Result<PropertyValue, DslError> {
    TableWalk::default().value(value, path)
}

/// Tables currently being converted, to catch self-references.
#[derive(Default)]
struct TableWalk {
    ancestors: HashSet<usize>,
}

impl TableWalk {
    fn value(&mut self, value: Value, path: &str) -> Result<PropertyValue, DslError> {
        match value {
            Value::Boolean(b) => Ok(PropertyValue::Boolean(b)),
            Value::Integer(i) => Ok(PropertyValue::Integer(i64::from(i))),
            Value::Number(n) if n.is_finite() => Ok(PropertyValue::Float(n)),
            Value::Number(n) => Err(DslError::type_mismatch(
                path,
                "finite number",
                n.to_string(),
            )),
            Value::String(s) => Ok(PropertyValue::String(s.to_string_lossy().to_string())),
            Value::Table(table) => self.table(table, path),
            other => Err(DslError::type_mismatch(
                path,
                "property value",
                other.type_name(),
            )),
        }
    }

    fn table(&mut self, table: Table, path: &str) -> Result<PropertyValue, DslError> {
        if self.ancestors.len() >= MAX_PROPERTY_DEPTH {
            return Err(DslError::Script {
                message: format!(
                    "{} nests tables deeper than {} levels",
                    path, MAX_PROPERTY_DEPTH
                ),
            });
        }

        let pointer = table.to_pointer() as usize;
        if !self.ancestors.insert(pointer) {
            return Err(DslError::type_mismatch(path, "acyclic table", "cyclic table"));
        }

        let result = self.table_entries(&table, path);
        self.ancestors.remove(&pointer);
        result
    }

    fn table_entries(&mut self, table: &Table, path: &str) -> Result<PropertyValue, DslError> {
        let length = table.raw_len();

        let mut entries = Vec::new();
        for pair in table.pairs::<Value, Value>() {
            let (key, value) = pair.map_err(|e| DslError::Script {
                message: format!("Error reading table entry at {}: {}", path, e),
            })?;
            entries.push((key, value));
        }

        // Sequential integer keys starting at 1
        if length > 0 && entries.len() == length {
            let mut items = Vec::with_capacity(length);
            for (index, value) in table.sequence_values::<Value>().enumerate() {
                let value = value.map_err(|e| DslError::Script {
                    message: format!("Error reading list entry at {}: {}", path, e),
                })?;
                items.push(self.value(value, &format!("{}[{}]", path, index + 1))?);
            }
            return Ok(PropertyValue::List(items));
        }

        let mut map = PropertyMap::new();
        for (key, value) in entries {
            let key = match key {
                Value::String(s) => s.to_string_lossy().to_string(),
                other => {
                    return Err(DslError::type_mismatch(
                        format!("{} key", path),
                        "string",
                        other.type_name(),
                    ));
                }
            };
            let value = self.value(value, &format!("{}.{}", path, key))?;
            map.insert(key, value);
        }

        Ok(PropertyValue::Map(map))
    }
}

/// Reads a properties table; `nil` is an empty one.
pub fn lua_value_to_properties(value: Value, path: &str) -> Result<PropertyMap, DslError> {
    if value.is_nil() {
        return Ok(PropertyMap::new());
    }

    match lua_value_to_property(value, path)? {
        PropertyValue::Map(map) => Ok(map),
        other => Err(DslError::type_mismatch(
            path,
            "table of properties",
            other.type_name(),
        )),
    }
}

pub fn required_string(value: &Value, what: &str) -> Result<String, DslError> {
    match value {
        Value::String(s) => Ok(s.to_string_lossy().to_string()),
        other => Err(DslError::type_mismatch(what, "string", other.type_name())),
    }
}

pub fn optional_string(value: &Value, what: &str) -> Result<Option<String>, DslError> {
    match value {
        Value::Nil => Ok(None),
        other => required_string(other, what).map(Some),
    }
}

pub fn endpoint_uri(value: &Value, what: &str) -> Result<String, DslError> {
    match value {
        Value::String(s) => Ok(s.to_string_lossy().to_string()),
        other => Err(DslError::type_mismatch(
            what,
            "endpoint uri",
            other.type_name(),
        )),
    }
}

pub fn processor(value: &Value) -> Result<Processor, DslError> {
    match value {
        Value::Function(_) => Ok(Processor::Inline),
        Value::String(s) => Ok(Processor::Bean(s.to_string_lossy().to_string())),
        other => Err(DslError::type_mismatch(
            "process(...)",
            "function or bean name",
            other.type_name(),
        )),
    }
}

/// Renders `<scheme>://<path>?k=v&...`, parameters in key order.
pub fn format_endpoint(scheme: &str, path: &str, params: &PropertyMap) -> String {
    let mut uri = format!("{}://{}", scheme, path);

    if !params.is_empty() {
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        uri.push('?');
        uri.push_str(&query.join("&"));
    }

    uri
}
