//! value representation
//!
//! A template is a tree of the following data types
//! - null
//! - boolean (true/false)
//! - integer (signed, i64)
//! - decimal (f64)
//! - string (utf-8)
//! - array ("list" of values, order is significant)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Resolving a node yields a [Resolution]. Besides a plain [Value] it can be [Resolution::NoValue], the result of
//! `{"Ref": "AWS::NoValue"}`. It is not a [Value] variant and therefore can never be stored inside an array or object:
//! the container that receives it drops the slot instead.
use indexmap::IndexMap;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// Keys of single-key objects that are always treated as intrinsic functions.
///
/// Anything else starting with `Fn::` is an intrinsic as well.
const BARE_INTRINSICS: [&str; 2] = ["Ref", "Condition"];

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

/// Outcome of resolving a single node
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Value(Value),
    /// Remove the slot this node occupied in its parent container
    NoValue,
}

impl Resolution {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolution::Value(value) => Some(value),
            Resolution::NoValue => None,
        }
    }

    pub fn is_no_value(&self) -> bool {
        matches!(self, Resolution::NoValue)
    }
}

impl From<Value> for Resolution {
    fn from(value: Value) -> Self {
        Resolution::Value(value)
    }
}

impl Value {
    /// Build a single-key intrinsic object such as `{"Ref": "MyBucket"}`
    pub fn intrinsic(name: impl Into<String>, argument: impl Into<Value>) -> Value {
        let mut object = IndexMap::with_capacity(1);
        object.insert(name.into(), argument.into());
        Value::Object(object)
    }

    /// Name and argument if this value is an intrinsic function node
    pub fn as_intrinsic(&self) -> Option<(&str, &Value)> {
        let Value::Object(object) = self else {
            return None;
        };
        if object.len() != 1 {
            return None;
        }

        let (key, argument) = object.first()?;
        is_intrinsic_name(key).then_some((key.as_str(), argument))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// String form used when a scalar is substituted into a `Fn::Sub` template
    ///
    /// Whole-number decimals render like integers. Arrays and objects have no string form.
    pub fn to_sub_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(int) => Some(int.to_string()),
            Value::Decimal(dec) if dec.fract() == 0.0 && dec.abs() < i64::MAX as f64 => {
                Some((*dec as i64).to_string())
            }
            Value::Decimal(dec) => Some(dec.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Null => Some(String::new()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

pub fn is_intrinsic_name(key: &str) -> bool {
    key.starts_with("Fn::") || BARE_INTRINSICS.contains(&key)
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> From<IndexMap<K, V>> for Value {
    fn from(value: IndexMap<K, V>) -> Self {
        Value::Object(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Number> for Value {
    fn from(value: serde_json::Number) -> Self {
        if let Some(int) = value.as_i64() {
            return Value::Integer(int);
        }

        // u64 above i64::MAX and real decimals both land here
        Value::Decimal(value.as_f64().unwrap_or(f64::NAN))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => b.into(),
            serde_json::Value::Number(n) => n.into(),
            serde_json::Value::String(s) => s.into(),
            serde_json::Value::Array(a) => a.into(),
            serde_json::Value::Object(o) => {
                Value::Object(o.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConversionError {
    #[error("mapping keys must be scalars, found {0}")]
    NonScalarKey(&'static str),
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = ConversionError;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        use serde_yaml::Value as Yaml;

        Ok(match value {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => b.into(),
            Yaml::Number(n) => {
                if let Some(int) = n.as_i64() {
                    Value::Integer(int)
                } else {
                    Value::Decimal(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Yaml::String(s) => s.into(),
            Yaml::Sequence(seq) => Value::Array(
                seq.into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Yaml::Mapping(mapping) => {
                let mut object = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let key = match key {
                        Yaml::String(s) => s,
                        Yaml::Bool(b) => b.to_string(),
                        Yaml::Number(n) => n.to_string(),
                        Yaml::Null => "null".to_string(),
                        Yaml::Sequence(_) => return Err(ConversionError::NonScalarKey("sequence")),
                        Yaml::Mapping(_) => return Err(ConversionError::NonScalarKey("mapping")),
                        Yaml::Tagged(_) => return Err(ConversionError::NonScalarKey("tagged value")),
                    };
                    object.insert(key, Value::try_from(value)?);
                }
                Value::Object(object)
            }
            Yaml::Tagged(tagged) => {
                // short form: `!Ref Name`, `!GetAtt Res.Attr`, `!Sub "..."`
                let tag = tagged.tag.to_string();
                let tag = tag.trim_start_matches('!');
                let name = match tag {
                    "Ref" | "Condition" => tag.to_string(),
                    _ => format!("Fn::{tag}"),
                };
                Value::intrinsic(name, Value::try_from(tagged.value)?)
            }
        })
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn recognizes_intrinsics() {
        let value: Value = json!({"Fn::Sub": "x"}).into();
        assert_eq!(value.as_intrinsic(), Some(("Fn::Sub", &Value::from("x"))));

        let value: Value = json!({"Ref": "x", "Other": 1}).into();
        assert_eq!(value.as_intrinsic(), None);

        let value: Value = json!({"NotAFunction": "x"}).into();
        assert_eq!(value.as_intrinsic(), None);
    }

    #[test]
    fn sub_strings() {
        assert_eq!(Value::Integer(42).to_sub_string().as_deref(), Some("42"));
        assert_eq!(Value::Decimal(3.0).to_sub_string().as_deref(), Some("3"));
        assert_eq!(Value::Decimal(2.5).to_sub_string().as_deref(), Some("2.5"));
        assert_eq!(Value::Boolean(false).to_sub_string().as_deref(), Some("false"));
        assert_eq!(Value::Array(vec![]).to_sub_string(), None);
    }

    #[test]
    fn yaml_short_form_tags() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "a: !Ref Bucket\nb: !GetAtt Fn.Arn\nc: !Condition IsProd\n",
        )
        .unwrap();
        let value = Value::try_from(yaml).unwrap();

        let expected: Value = json!({
            "a": {"Ref": "Bucket"},
            "b": {"Fn::GetAtt": "Fn.Arn"},
            "c": {"Condition": "IsProd"},
        })
        .into();
        assert_eq!(value, expected);
    }

    #[test]
    fn yaml_rejects_non_scalar_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("? [a, b]\n: 1\n").unwrap();
        assert_eq!(
            Value::try_from(yaml),
            Err(ConversionError::NonScalarKey("sequence"))
        );
    }
}
