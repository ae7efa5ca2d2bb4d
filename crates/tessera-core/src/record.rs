//! The persistable output of serialization.

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{asset::AssetId, identifier::Id, value::Value};

/// Attribute values of one element, in descriptor order.
///
/// The `asset_id` is copied from the owning asset and never changes once
/// assigned, so downstream diffing can track the record across passes.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedRecord {
    asset_id: AssetId,
    type_name: Id,
    values: IndexMap<String, Value>,
}

impl SerializedRecord {
    /// Create an empty record for `type_name`.
    pub fn new(type_name: Id, asset_id: AssetId) -> Self {
        Self {
            asset_id,
            type_name,
            values: IndexMap::new(),
        }
    }

    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    pub fn type_name(&self) -> Id {
        self.type_name
    }

    /// Get the value stored for `attribute`.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// Get a mutable reference to the value stored for `attribute`.
    pub fn get_mut(&mut self, attribute: &str) -> Option<&mut Value> {
        self.values.get_mut(attribute)
    }

    /// Store `value` for `attribute`, keeping the attribute's original position
    /// when it is already present.
    pub fn set(&mut self, attribute: impl Into<String>, value: Value) {
        self.values.insert(attribute.into(), value);
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.values.contains_key(attribute)
    }

    /// Iterate over attribute values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Non-null attribute values, serialized as a map.
struct Attributes<'a>(&'a IndexMap<String, Value>);

impl Serialize for Attributes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self.0.iter().filter(|(_, value)| !value.is_null());
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in present {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for SerializedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("asset_id", &self.asset_id)?;
        map.serialize_entry("type", &self.type_name)?;
        map.serialize_entry("attributes", &Attributes(&self.values))?;
        map.end()
    }
}
