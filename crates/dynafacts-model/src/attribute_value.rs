//! DynamoDB `AttributeValue` type with custom serialization.
//!
//! `AttributeValue` is a tagged union where exactly one variant is present.
//! The JSON wire format uses single-key objects like `{"S": "hello"}`.
//!
//! Unlike a strict service-side parser, deserialization here is lenient
//! where the input comes from a human-authored parameter document: `N` and
//! `NS` accept plain JSON numbers in addition to the string-encoded form
//! DynamoDB itself uses.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::InputError;

/// DynamoDB attribute value.
///
/// Represented as a tagged union where exactly one variant is present.
/// Numbers are string-encoded to preserve arbitrary precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// String value.
    S(String),
    /// Number value (string-encoded for arbitrary precision).
    N(String),
    /// Binary value (base64-encoded in JSON).
    B(bytes::Bytes),
    /// String Set.
    Ss(Vec<String>),
    /// Number Set (string-encoded).
    Ns(Vec<String>),
    /// Binary Set (base64-encoded in JSON).
    Bs(Vec<bytes::Bytes>),
    /// Boolean value.
    Bool(bool),
    /// Null value.
    Null(bool),
    /// List of attribute values.
    L(Vec<AttributeValue>),
    /// Map of attribute values.
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns the DynamoDB type descriptor string (e.g., "S", "N", "BOOL").
    #[must_use]
    pub fn type_descriptor(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::B(_) => "B",
            Self::Ss(_) => "SS",
            Self::Ns(_) => "NS",
            Self::Bs(_) => "BS",
            Self::Bool(_) => "BOOL",
            Self::Null(_) => "NULL",
            Self::L(_) => "L",
            Self::M(_) => "M",
        }
    }

    /// Infer the typed form of an untyped predicate operand.
    ///
    /// Strings become `S`, numbers `N`, booleans `BOOL`, nulls `NULL`, and
    /// sequences `L` with each element inferred in turn. A mapping is only
    /// accepted when it is already a single-key typed value; anything else
    /// is ambiguous and rejected, naming `attr` in the error.
    pub fn infer(attr: &str, value: &Value) -> Result<Self, InputError> {
        match value {
            Value::String(s) => Ok(Self::S(s.clone())),
            Value::Number(n) => Ok(Self::N(n.to_string())),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Null => Ok(Self::Null(true)),
            Value::Array(items) => {
                let inferred = items
                    .iter()
                    .map(|item| Self::infer(attr, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::L(inferred))
            }
            Value::Object(_) => serde_json::from_value(value.clone())
                .map_err(|_| InputError::AmbiguousValue(attr.to_owned())),
        }
    }

    /// Recursively strip the type tags, producing native JSON.
    ///
    /// Sets become ordered arrays, `M` a plain object, `L` preserves order.
    /// `N` values become JSON numbers when the string round-trips losslessly
    /// and stay strings otherwise.
    #[must_use]
    pub fn simplify(self) -> Value {
        match self {
            Self::S(s) => Value::String(s),
            Self::N(n) => simplify_number(n),
            Self::B(b) => Value::String(base64_encode(&b)),
            Self::Ss(v) => Value::Array(v.into_iter().map(Value::String).collect()),
            Self::Ns(v) => Value::Array(v.into_iter().map(simplify_number).collect()),
            Self::Bs(v) => Value::Array(
                v.iter()
                    .map(|b| Value::String(base64_encode(b)))
                    .collect(),
            ),
            Self::Bool(b) => Value::Bool(b),
            Self::Null(_) => Value::Null,
            Self::L(v) => Value::Array(v.into_iter().map(Self::simplify).collect()),
            Self::M(m) => Value::Object(
                m.into_iter()
                    .map(|(k, v)| (k, v.simplify()))
                    .collect(),
            ),
        }
    }
}

/// Convert a string-encoded number into a JSON number when lossless.
fn simplify_number(n: String) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        if i.to_string() == n {
            return Value::from(i);
        }
    }
    if let Ok(f) = n.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(f) {
            if num.to_string() == n {
                return Value::Number(num);
            }
        }
    }
    Value::String(n)
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn base64_decode(encoded: &str) -> Result<bytes::Bytes, base64::DecodeError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map(bytes::Bytes::from)
}

/// Accept either the string-encoded number DynamoDB uses or a bare JSON
/// number from a hand-written parameter file.
fn number_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("N must be a number or numeric string, got {other}")),
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::S(s) => map.serialize_entry("S", s)?,
            Self::N(n) => map.serialize_entry("N", n)?,
            Self::B(b) => map.serialize_entry("B", &base64_encode(b))?,
            Self::Ss(v) => map.serialize_entry("SS", v)?,
            Self::Ns(v) => map.serialize_entry("NS", v)?,
            Self::Bs(v) => {
                let encoded: Vec<String> = v.iter().map(|b| base64_encode(b)).collect();
                map.serialize_entry("BS", &encoded)?;
            }
            Self::Bool(b) => map.serialize_entry("BOOL", b)?,
            Self::Null(b) => map.serialize_entry("NULL", b)?,
            Self::L(list) => map.serialize_entry("L", list)?,
            Self::M(m) => map.serialize_entry("M", m)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeValueVisitor)
    }
}

struct AttributeValueVisitor;

impl<'de> Visitor<'de> for AttributeValueVisitor {
    type Value = AttributeValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a DynamoDB AttributeValue object with exactly one type key")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let Some(key) = map.next_key::<String>()? else {
            return Err(de::Error::custom(
                "AttributeValue must have exactly one key",
            ));
        };

        let value = match key.as_str() {
            "S" => AttributeValue::S(map.next_value()?),
            "N" => {
                let raw: Value = map.next_value()?;
                AttributeValue::N(number_string(raw).map_err(de::Error::custom)?)
            }
            "B" => {
                let encoded: String = map.next_value()?;
                AttributeValue::B(base64_decode(&encoded).map_err(de::Error::custom)?)
            }
            "SS" => AttributeValue::Ss(map.next_value()?),
            "NS" => {
                let raw: Vec<Value> = map.next_value()?;
                let numbers = raw
                    .into_iter()
                    .map(number_string)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(de::Error::custom)?;
                AttributeValue::Ns(numbers)
            }
            "BS" => {
                let encoded: Vec<String> = map.next_value()?;
                let decoded = encoded
                    .iter()
                    .map(|e| base64_decode(e))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(de::Error::custom)?;
                AttributeValue::Bs(decoded)
            }
            "BOOL" => AttributeValue::Bool(map.next_value()?),
            "NULL" => AttributeValue::Null(map.next_value()?),
            "L" => AttributeValue::L(map.next_value()?),
            "M" => AttributeValue::M(map.next_value()?),
            other => {
                return Err(de::Error::unknown_field(
                    other,
                    &["S", "N", "B", "SS", "NS", "BS", "BOOL", "NULL", "L", "M"],
                ));
            }
        };

        if map.next_key::<String>()?.is_some() {
            return Err(de::Error::custom(
                "AttributeValue must have exactly one key",
            ));
        }

        Ok(value)
    }
}
