//! Typed scalar payloads.
//!
//! A [`Value`] knows its kind from the moment it is built and never
//! changes it. Construction from native Rust types and from JSON infers
//! the kind: integral numbers become [`ValueType::Long`], other numbers
//! [`ValueType::Double`], byte sequences [`ValueType::Bytes`].

use crate::error::ModuleError;
use crate::object::{ObjectArray, ObjectElement, ObjectField};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    /// 64-bit signed integer.
    Long,
    /// 64-bit float.
    Double,
    /// UTF-8 text.
    String,
    /// Boolean.
    Boolean,
    /// Raw bytes.
    Bytes,
    /// Ordered collection of values.
    ObjectArray,
    /// Named fields.
    ObjectElement,
}

/// A typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Value {
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 text.
    String(String),
    /// Boolean.
    Boolean(bool),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered collection of values.
    ObjectArray(ObjectArray),
    /// Named fields.
    ObjectElement(ObjectElement),
}

impl Value {
    /// Infer `Long` or `Double` from a float.
    ///
    /// Finite integral values inside the `i64` range become `Long`;
    /// everything else, including NaN and infinities, stays `Double`.
    pub fn from_number(n: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
            Self::Long(n as i64)
        } else {
            Self::Double(n)
        }
    }

    /// Build a value from JSON, inferring its kind.
    ///
    /// Arrays of integers in `0..=255` (and the empty array) become `Bytes`,
    /// other arrays `ObjectArray`, objects `ObjectElement`. `null` has no
    /// kind and is rejected.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ModuleError> {
        use serde_json::Value as Json;
        match json {
            Json::Null => Err(ModuleError::invalid("null has no value type")),
            Json::Bool(b) => Ok(Self::Boolean(*b)),
            Json::String(s) => Ok(Self::String(s.clone())),
            Json::Number(n) => Ok(match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(i), _, _) => Self::Long(i),
                (None, Some(u), _) => Self::Double(u as f64),
                (None, None, Some(f)) => Self::from_number(f),
                (None, None, None) => {
                    return Err(ModuleError::invalid(format!("unrepresentable number {n}")));
                }
            }),
            Json::Array(items) => {
                let bytes: Option<Vec<u8>> = items
                    .iter()
                    .map(|item| item.as_u64().and_then(|u| u8::try_from(u).ok()))
                    .collect();
                match bytes {
                    Some(bytes) => Ok(Self::Bytes(bytes)),
                    None => items
                        .iter()
                        .map(Self::from_json)
                        .collect::<Result<ObjectArray, _>>()
                        .map(Self::ObjectArray),
                }
            }
            Json::Object(map) => map
                .iter()
                .map(|(name, value)| Ok(ObjectField::new(name.clone(), Self::from_json(value)?)))
                .collect::<Result<Vec<_>, ModuleError>>()
                .map(|fields| Self::ObjectElement(ObjectElement::new(fields))),
        }
    }

    /// Plain JSON rendering of the payload, without the kind tag.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Long(n) => Json::from(*n),
            Self::Double(n) => Json::from(*n),
            Self::String(s) => Json::from(s.as_str()),
            Self::Boolean(b) => Json::from(*b),
            Self::Bytes(bytes) => Json::from(bytes.clone()),
            Self::ObjectArray(array) => Json::Array(array.iter().map(Self::to_json).collect()),
            Self::ObjectElement(element) => Json::Object(
                element
                    .fields()
                    .iter()
                    .map(|field| (field.name().to_owned(), field.value().to_json()))
                    .collect(),
            ),
        }
    }

    /// The kind tag.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Long(_) => ValueType::Long,
            Self::Double(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Bytes(_) => ValueType::Bytes,
            Self::ObjectArray(_) => ValueType::ObjectArray,
            Self::ObjectElement(_) => ValueType::ObjectElement,
        }
    }

    /// The integer payload, if `Long`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// The numeric payload; `Long` widens.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Long(n) => Some(*n as f64),
            Self::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// The text payload, if `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean payload, if `Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The byte payload, if `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The array payload, if `ObjectArray`.
    pub fn as_object_array(&self) -> Option<&ObjectArray> {
        match self {
            Self::ObjectArray(array) => Some(array),
            _ => None,
        }
    }

    /// The element payload, if `ObjectElement`.
    pub fn as_object_element(&self) -> Option<&ObjectElement> {
        match self {
            Self::ObjectElement(element) => Some(element),
            _ => None,
        }
    }

    /// Keep only the given dot paths of structured payloads.
    /// Scalars are returned unchanged.
    pub fn project<S: AsRef<str>>(&self, paths: &[S]) -> Self {
        match self {
            Self::ObjectElement(element) => Self::ObjectElement(element.project(paths)),
            Self::ObjectArray(array) => Self::ObjectArray(array.project(paths)),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(n) => write!(f, "{n}"),
            Self::Double(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Long(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Long(i64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Self::Double(n as f64), Self::Long)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::from_number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::from_number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<ObjectArray> for Value {
    fn from(array: ObjectArray) -> Self {
        Self::ObjectArray(array)
    }
}

impl From<ObjectElement> for Value {
    fn from(element: ObjectElement) -> Self {
        Self::ObjectElement(element)
    }
}

impl From<ObjectField> for Value {
    fn from(field: ObjectField) -> Self {
        field.into_value()
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_numbers_are_long() {
        assert_eq!(Value::from(5.0), Value::Long(5));
        assert_eq!(Value::from(-3.0).value_type(), ValueType::Long);
        assert_eq!(Value::from(5.5), Value::Double(5.5));
    }

    #[test]
    fn non_finite_and_huge_numbers_stay_double() {
        assert_eq!(Value::from(f64::INFINITY).value_type(), ValueType::Double);
        assert_eq!(Value::from(f64::NAN).value_type(), ValueType::Double);
        assert_eq!(Value::from(1e30).value_type(), ValueType::Double);
    }

    #[test]
    fn wrapping_copies_kind() {
        let inner = Value::from("text");
        assert_eq!(Value::from(&inner), inner);
        let field = ObjectField::new("n", 4);
        assert_eq!(Value::from(field), Value::Long(4));
    }

    #[test]
    fn json_inference() {
        assert_eq!(Value::from_json(&json!(7)).unwrap(), Value::Long(7));
        assert_eq!(Value::from_json(&json!(7.25)).unwrap(), Value::Double(7.25));
        assert_eq!(Value::from_json(&json!("a")).unwrap(), Value::from("a"));
        assert_eq!(Value::from_json(&json!(true)).unwrap(), Value::Boolean(true));
        assert_eq!(Value::from_json(&json!([1, 2, 255])).unwrap(), Value::Bytes(vec![1, 2, 255]));
        assert_eq!(Value::from_json(&json!([])).unwrap(), Value::Bytes(vec![]));
        assert_eq!(
            Value::from_json(&json!([1, "x"])).unwrap().value_type(),
            ValueType::ObjectArray
        );
        let element = Value::from_json(&json!({"a": {"b": 2}})).unwrap();
        assert_eq!(
            element.as_object_element().unwrap().path("a.b"),
            Some(&Value::Long(2))
        );
        assert!(Value::from_json(&json!(null)).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn tagged_serde_form() {
        let json = serde_json::to_value(Value::Long(3)).unwrap();
        assert_eq!(json, json!({"type": "LONG", "value": 3}));
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, Value::Long(3));
    }
}
