//! Firestore REST (v1) addressing and typed-value codec.
//!
//! Firestore wraps every value in a one-key object naming its type:
//! ```text
//! { "fields": { "earth": { "doubleValue": 70.5 },
//!               "moons": { "integerValue": "1" },
//!               "nested": { "mapValue": { "fields": { ... } } } } }
//! ```
//! This module converts between that encoding and plain JSON so stores can
//! hand ordinary `serde_json::Value` documents to the game. The transport
//! itself lives in the web bridge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::{DocumentPath, StoreError};

const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_DATABASE: &str = "(default)";

/// Connection settings supplied by the host page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: String,
    #[serde(default = "default_database")]
    pub database: String,
    /// REST root, overridable for the local emulator.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            database: default_database(),
            endpoint: default_endpoint(),
        }
    }

    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Full REST URL of one document, API key included.
    pub fn document_url(&self, path: &DocumentPath) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}/{}?key={}",
            self.endpoint.trim_end_matches('/'),
            self.project_id,
            self.database,
            path.collection,
            path.id,
            self.api_key,
        )
    }
}

/// Wrap a plain JSON object as a Firestore document body (`{"fields": ...}`).
pub fn encode_document(body: &Value) -> Result<Value, StoreError> {
    let Value::Object(map) = body else {
        return Err(StoreError::Malformed(
            "document body must be a JSON object".to_string(),
        ));
    };
    Ok(serde_json::json!({ "fields": encode_fields(map) }))
}

fn encode_fields(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

/// Encode one plain JSON value as a Firestore typed value.
pub fn encode_value(value: &Value) -> Value {
    use serde_json::json;
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or(0.0) })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Unwrap a Firestore document (as returned by GET) into a plain JSON object.
/// A document without `fields` is an empty object.
pub fn decode_document(doc: &Value) -> Result<Value, StoreError> {
    match doc.get("fields") {
        None => Ok(Value::Object(Map::new())),
        Some(fields) => decode_fields(fields),
    }
}

fn decode_fields(fields: &Value) -> Result<Value, StoreError> {
    let Value::Object(map) = fields else {
        return Err(StoreError::Malformed("`fields` is not an object".to_string()));
    };
    let mut out = Map::with_capacity(map.len());
    for (k, v) in map {
        out.insert(k.clone(), decode_value(v)?);
    }
    Ok(Value::Object(out))
}

/// Decode one Firestore typed value into plain JSON.
pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let Value::Object(wrapper) = value else {
        return Err(StoreError::Malformed(format!("expected typed value, got {value}")));
    };
    let Some((tag, inner)) = wrapper.iter().next() else {
        return Err(StoreError::Malformed("empty typed value".to_string()));
    };

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| malformed(tag, inner)),
        "integerValue" => {
            // int64 travels as a decimal string; accept bare numbers too.
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|i| Value::Number(i.into()))
                .ok_or_else(|| malformed(tag, inner))
        }
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| malformed(tag, inner)),
        "stringValue" | "timestampValue" | "referenceValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| malformed(tag, inner)),
        "mapValue" => match inner.get("fields") {
            None => Ok(Value::Object(Map::new())),
            Some(fields) => decode_fields(fields),
        },
        "arrayValue" => match inner.get("values") {
            None => Ok(Value::Array(Vec::new())),
            Some(Value::Array(items)) => items
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Some(other) => Err(malformed(tag, other)),
        },
        other => Err(StoreError::Malformed(format!("unsupported value type `{other}`"))),
    }
}

fn malformed(tag: &str, inner: &Value) -> StoreError {
    StoreError::Malformed(format!("bad {tag}: {inner}"))
}
