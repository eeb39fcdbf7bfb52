//! Conversion between Firestore typed values and plain JSON.
//!
//! Firestore's REST API wraps every field in a single-key object naming its
//! type (`{"stringValue": "a"}`, `{"integerValue": "3"}`, ...). Documents are
//! handled as plain `serde_json::Value` everywhere else in the crate.

use crate::domain::model::Fields;
use crate::utils::error::{Result, TrackerError};
use serde_json::{json, Map, Number, Value};

pub fn decode_fields(path: &str, fields: &Map<String, Value>) -> Result<Fields> {
    let mut decoded = Fields::with_capacity(fields.len());
    for (name, value) in fields {
        let field_path = format!("{}.{}", path, name);
        decoded.insert(name.clone(), decode_value(&field_path, value)?);
    }
    Ok(decoded)
}

pub fn decode_value(path: &str, value: &Value) -> Result<Value> {
    let Value::Object(typed) = value else {
        return Err(TrackerError::decode(path, "expected a typed value object"));
    };
    let Some((kind, inner)) = typed.iter().next() else {
        return Err(TrackerError::decode(path, "empty typed value"));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| TrackerError::decode(path, "booleanValue is not a boolean")),
        "integerValue" => decode_integer(path, inner),
        "doubleValue" => decode_double(path, inner),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| TrackerError::decode(path, format!("{} is not a string", kind))),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values") {
                None => return Ok(Value::Array(Vec::new())),
                Some(Value::Array(values)) => values,
                Some(_) => return Err(TrackerError::decode(path, "arrayValue.values is not a list")),
            };
            values
                .iter()
                .enumerate()
                .map(|(i, item)| decode_value(&format!("{}[{}]", path, i), item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        "mapValue" => match inner.get("fields") {
            None => Ok(Value::Object(Map::new())),
            Some(Value::Object(fields)) => decode_fields(path, fields).map(Value::Object),
            Some(_) => Err(TrackerError::decode(path, "mapValue.fields is not an object")),
        },
        other => Err(TrackerError::decode(path, format!("unsupported value type {}", other))),
    }
}

fn decode_integer(path: &str, inner: &Value) -> Result<Value> {
    // int64 travels as a JSON string
    let parsed = match inner {
        Value::String(s) => s.parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed
        .map(|n| Value::Number(n.into()))
        .ok_or_else(|| TrackerError::decode(path, "integerValue is not an int64"))
}

fn decode_double(path: &str, inner: &Value) -> Result<Value> {
    match inner {
        Value::Number(n) => Ok(Value::Number(n.clone())),
        // "NaN", "Infinity" and "-Infinity" have no JSON form
        Value::String(s) if matches!(s.as_str(), "NaN" | "Infinity" | "-Infinity") => Ok(Value::Null),
        _ => Err(TrackerError::decode(path, "doubleValue is not a number")),
    }
}

pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => encode_number(n),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

fn encode_number(n: &Number) -> Value {
    match n.as_i64() {
        Some(i) => json!({ "integerValue": i.to_string() }),
        None => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
    }
}
