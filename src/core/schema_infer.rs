// src/core/schema_infer.rs

use crate::models::ValueKind;
use serde_json::{Map, Value, json};

/// Derives a structural JSON-Schema from one example instance.
///
/// Objects recurse per key. Arrays are described by their *first* element
/// only; later elements are not inspected, so a mixed array yields a schema
/// that matches just the first element's shape. An empty array gets an
/// unconstrained `items`.
pub fn infer_schema(value: &Value) -> Value {
    let kind = ValueKind::of(value);
    match kind {
        ValueKind::Object => {
            let properties: Map<String, Value> = value
                .as_object()
                .into_iter()
                .flatten()
                .map(|(key, child)| (key.clone(), infer_schema(child)))
                .collect();
            json!({ "type": "object", "properties": properties })
        }
        ValueKind::Array => {
            let items = value
                .as_array()
                .and_then(|items| items.first())
                .map(infer_schema)
                .unwrap_or_else(|| json!({}));
            json!({ "type": "array", "items": items })
        }
        ValueKind::String | ValueKind::Integer | ValueKind::Number | ValueKind::Boolean => {
            json!({ "type": kind.schema_type() })
        }
        ValueKind::Null => json!({}),
    }
}
