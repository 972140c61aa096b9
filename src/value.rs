use crate::error::ValueError;
use crate::statics;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Represents a number that keeps the distinction between I64, U64, and F64, so a value
/// typed as `42` stays an integer on its way to the repository.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyNumber {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl PropertyNumber {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyNumber::I64(v) => Some(*v),
            PropertyNumber::U64(v) => i64::try_from(*v).ok(),
            PropertyNumber::F64(_) => None,
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            PropertyNumber::F64(v) => v.is_finite(),
            _ => true,
        }
    }

    /// JSON5 spelling of the number, used to name values JSON cannot carry.
    fn literal(&self) -> String {
        match self {
            PropertyNumber::F64(v) if v.is_nan() => statics::EN_LITERAL_NAN.to_string(),
            PropertyNumber::F64(v) if v.is_infinite() && v.is_sign_negative() => {
                statics::EN_LITERAL_NEG_INFINITY.to_string()
            }
            PropertyNumber::F64(v) if v.is_infinite() => statics::EN_LITERAL_INFINITY.to_string(),
            PropertyNumber::I64(v) => v.to_string(),
            PropertyNumber::U64(v) => v.to_string(),
            PropertyNumber::F64(v) => v.to_string(),
        }
    }
}

impl Serialize for PropertyNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyNumber::I64(v) => serializer.serialize_i64(*v),
            PropertyNumber::U64(v) => serializer.serialize_u64(*v),
            PropertyNumber::F64(v) => serializer.serialize_f64(*v),
        }
    }
}

/// Value of a node property: either a literal the user typed as JSON, or a plain string.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(PropertyNumber),
    String(String),
    Array(Vec<PropertyValue>),
    Object(IndexMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn as_object(&self) -> Option<&IndexMap<String, PropertyValue>> {
        match self {
            PropertyValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Number(_) => "number",
            PropertyValue::String(_) => "string",
            PropertyValue::Array(_) => "array",
            PropertyValue::Object(_) => "object",
        }
    }

    /// Parse `text` with the standard JSON grammar.
    pub fn parse_json(text: &str) -> Result<PropertyValue, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parse a JSON5 document (used by repository fixtures).
    pub fn parse_json5(text: &str) -> anyhow::Result<PropertyValue> {
        Ok(json5::from_str::<PropertyValue>(text)?)
    }

    /// Interpret raw form input: a JSON literal when it parses, otherwise the text verbatim.
    pub fn from_form_input(raw: &str) -> PropertyValue {
        match Self::parse_json(raw) {
            Ok(value) => value,
            Err(_) => PropertyValue::String(raw.to_owned()),
        }
    }

    /// Compact JSON text for this value. Fails when the value holds a number JSON
    /// cannot express (NaN or an infinity).
    pub fn to_json(&self) -> Result<String, ValueError> {
        if let Some(n) = self.first_non_finite() {
            return Err(ValueError::NotRepresentable(n.literal()));
        }
        serde_json::to_string(self).map_err(|err| ValueError::NotRepresentable(err.to_string()))
    }

    fn first_non_finite(&self) -> Option<&PropertyNumber> {
        match self {
            PropertyValue::Number(n) if !n.is_finite() => Some(n),
            PropertyValue::Array(values) => values.iter().find_map(|v| v.first_non_finite()),
            PropertyValue::Object(map) => map.values().find_map(|v| v.first_non_finite()),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_owned())
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Number(PropertyNumber::I64(v))
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyValue::Null => serializer.serialize_unit(),
            PropertyValue::Bool(v) => serializer.serialize_bool(*v),
            PropertyValue::Number(n) => n.serialize(serializer),
            PropertyValue::String(s) => serializer.serialize_str(s),
            PropertyValue::Array(values) => values.serialize(serializer),
            PropertyValue::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = PropertyValue;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a property value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(PropertyValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(PropertyValue::Null)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(PropertyValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(PropertyValue::Number(PropertyNumber::I64(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(PropertyValue::Number(PropertyNumber::U64(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(PropertyValue::Number(PropertyNumber::F64(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(PropertyValue::String(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(PropertyValue::String(v))
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element::<PropertyValue>()? {
                    values.push(value);
                }
                Ok(PropertyValue::Array(values))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut values = IndexMap::new();
                while let Some((key, value)) = map.next_entry::<String, PropertyValue>()? {
                    values.insert(key, value);
                }
                Ok(PropertyValue::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
