//! Runtime scalar values stored in entity properties.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A scalar runtime value.
///
/// Relation-shaped values (nested entities and entity arrays) are not values;
/// they live in [`crate::FieldValue`] so a flat record can never hold one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Timestamp as microseconds since Unix epoch.
    Timestamp(i64),
    /// UUID as 16 bytes.
    Uuid([u8; 16]),
    /// Array of booleans.
    BoolArray(Vec<bool>),
    /// Array of 64-bit integers.
    Int64Array(Vec<i64>),
    /// Array of 64-bit floats.
    Float64Array(Vec<f64>),
    /// Array of strings.
    StringArray(Vec<String>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::Int32(i) => Some(*i as i64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int32(i) => Json::from(*i),
            Value::Int64(i) | Value::Timestamp(i) => Json::from(*i),
            Value::Float32(f) => float_to_json(*f as f64),
            Value::Float64(f) => float_to_json(*f),
            Value::String(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
            Value::Uuid(u) => Json::String(format_uuid(u)),
            Value::BoolArray(v) => Json::Array(v.iter().map(|b| Json::Bool(*b)).collect()),
            Value::Int64Array(v) => Json::Array(v.iter().map(|i| Json::from(*i)).collect()),
            Value::Float64Array(v) => Json::Array(v.iter().map(|f| float_to_json(*f)).collect()),
            Value::StringArray(v) => {
                Json::Array(v.iter().map(|s| Json::String(s.clone())).collect())
            }
        }
    }

    /// Convert a JSON scalar or scalar array into a value.
    ///
    /// Objects and arrays of objects are relation-shaped and are rejected here;
    /// see [`crate::FieldValue::from_json`].
    pub fn from_json(json: &serde_json::Value) -> Result<Self, Error> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int64(i)),
                None => n
                    .as_f64()
                    .map(Value::Float64)
                    .ok_or_else(|| Error::InvalidPayload(format!("unsupported number {n}"))),
            },
            Json::String(s) => Ok(Value::String(s.clone())),
            Json::Array(items) => scalar_array_from_json(items),
            Json::Object(_) => Err(Error::InvalidPayload(
                "object is not a scalar value".to_string(),
            )),
        }
    }
}

fn float_to_json(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn scalar_array_from_json(items: &[serde_json::Value]) -> Result<Value, Error> {
    use serde_json::Value as Json;

    if items.iter().all(Json::is_string) {
        return Ok(Value::StringArray(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ));
    }
    if items.iter().all(Json::is_boolean) {
        return Ok(Value::BoolArray(items.iter().filter_map(Json::as_bool).collect()));
    }
    if items.iter().all(Json::is_i64) {
        return Ok(Value::Int64Array(items.iter().filter_map(Json::as_i64).collect()));
    }
    if items.iter().all(Json::is_number) {
        return Ok(Value::Float64Array(items.iter().filter_map(Json::as_f64).collect()));
    }

    Err(Error::InvalidPayload(
        "arrays must hold a single scalar type".to_string(),
    ))
}

/// Format UUID bytes in the canonical 8-4-4-4-12 form.
pub fn format_uuid(bytes: &[u8; 16]) -> String {
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Value::Uuid(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StringArray(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(true).is_null());

        assert_eq!(Value::Int64(100).as_i64(), Some(100));
        assert_eq!(Value::Int32(42).as_i64(), Some(42)); // Widening conversion
        assert_eq!(Value::String("hello".into()).as_str(), Some("hello"));
    }

    #[test]
    fn test_value_conversions() {
        let v: Value = "hello".into();
        assert_eq!(v, Value::String("hello".into()));

        let v: Value = None::<i32>.into();
        assert_eq!(v, Value::Null);

        let v: Value = Some(42i32).into();
        assert_eq!(v, Value::Int32(42));
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from_json(&json!(7)).unwrap(), Value::Int64(7));
        assert_eq!(Value::from_json(&json!(1.5)).unwrap(), Value::Float64(1.5));
        assert_eq!(
            Value::from_json(&json!(["a", "b"])).unwrap(),
            Value::StringArray(vec!["a".into(), "b".into()])
        );
        assert!(Value::from_json(&json!({"a": 1})).is_err());
        assert!(Value::from_json(&json!([1, "mixed"])).is_err());
    }

    #[test]
    fn test_uuid_formatting() {
        let id = [0xab; 16];
        assert_eq!(
            format_uuid(&id),
            "abababab-abab-abab-abab-abababababab"
        );
        assert_eq!(Value::Uuid(id).to_json(), json!(format_uuid(&id)));
    }
}
