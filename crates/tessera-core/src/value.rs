//! Typed attribute values stored in a [`SerializedRecord`].

use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeSeq};

use crate::{identifier::Id, record::SerializedRecord};

/// A coerced attribute value.
///
/// Primitive variants come out of type coercion. [`Value::TypeRef`] is only
/// produced by coercion of `type` attributes; the serializer checks it against
/// the declared base-type constraint and stores its string form as
/// [`Value::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unset object reference or nested object.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Enumeration variant, in its canonical spelling.
    Enum(String),
    /// Reference to a registered type.
    TypeRef(Id),
    /// Reference to an external asset, by path.
    Asset(String),
    /// Nested object.
    Record(Box<SerializedRecord>),
    /// Ordered list of nested objects.
    List(Vec<SerializedRecord>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the nested record, if this is a [`Value::Record`].
    pub fn as_record(&self) -> Option<&SerializedRecord> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Borrow the nested records, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[SerializedRecord]> {
        match self {
            Value::List(records) => Some(records),
            _ => None,
        }
    }

    /// Borrow the string payload of text-like variants.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) | Value::Enum(text) | Value::Asset(text) => Some(text),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::Enum(_) => "enum",
            Value::TypeRef(_) => "type",
            Value::Asset(_) => "asset",
            Value::Record(_) => "record",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(text) | Value::Enum(text) | Value::Asset(text) => write!(f, "{text}"),
            Value::TypeRef(id) => write!(f, "{id}"),
            Value::Record(record) => write!(f, "{} #{}", record.type_name(), record.asset_id()),
            Value::List(records) => write!(f, "[{} records]", records.len()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::Text(text) | Value::Enum(text) | Value::Asset(text) => {
                serializer.serialize_str(text)
            }
            Value::TypeRef(id) => id.serialize(serializer),
            Value::Record(record) => record.serialize(serializer),
            Value::List(records) => {
                let mut seq = serializer.serialize_seq(Some(records.len()))?;
                for record in records {
                    seq.serialize_element(record)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetId;

    #[test]
    fn test_accessors() {
        let record = SerializedRecord::new(Id::new("ui.Column"), AssetId::new(7));
        let nested = Value::Record(Box::new(record.clone()));
        let list = Value::List(vec![record]);

        assert!(Value::Null.is_null());
        assert_eq!(nested.as_record().map(|r| r.asset_id()), Some(AssetId::new(7)));
        assert_eq!(list.as_list().map(<[_]>::len), Some(1));
        assert_eq!(Value::Enum("Row".into()).as_str(), Some("Row"));
        assert_eq!(Value::Int(3).as_str(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::TypeRef(Id::new("ui.Label")).to_string(), "ui.Label");
        assert_eq!(Value::List(Vec::new()).to_string(), "[0 records]");
    }
}
