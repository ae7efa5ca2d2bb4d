//! Element, object and template assets produced by the markup parser.
//!
//! Assets carry raw attribute strings in document order. The serializer turns
//! them into [`SerializedRecord`]s and attaches the records back onto the
//! asset that owns them.

use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicU64, Ordering},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{identifier::Id, record::SerializedRecord};

/// First id handed out by [`AssetId::generate`].
///
/// Parser ids are document-scoped and stay below this bound, so generated ids
/// never collide with them.
const GENERATED_BASE: u64 = 1 << 48;

static NEXT_GENERATED: AtomicU64 = AtomicU64::new(GENERATED_BASE);

/// Stable identity of an asset within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(u64);

impl AssetId {
    /// Id of the implicit document root.
    pub const ROOT: AssetId = AssetId(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Mint an id for a record that has no backing asset.
    ///
    /// Generated ids are never reused within a process.
    pub fn generate() -> Self {
        Self(NEXT_GENERATED.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns `true` if this id came from [`AssetId::generate`].
    pub fn is_generated(&self) -> bool {
        self.0 >= GENERATED_BASE
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A markup element with its raw attribute bag.
#[derive(Debug, Clone)]
pub struct ElementAsset {
    id: AssetId,
    parent_id: Option<AssetId>,
    type_name: Id,
    name: Option<String>,
    attributes: IndexMap<String, String>,
    serialized_data: Option<SerializedRecord>,
}

impl ElementAsset {
    pub fn new(id: AssetId, type_name: Id) -> Self {
        Self {
            id,
            parent_id: None,
            type_name,
            name: None,
            attributes: IndexMap::new(),
            serialized_data: None,
        }
    }

    pub fn with_parent(mut self, parent_id: AssetId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a raw attribute. Later values for the same name replace earlier
    /// ones in place.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn parent_id(&self) -> Option<AssetId> {
        self.parent_id
    }

    pub fn type_name(&self) -> Id {
        self.type_name
    }

    /// The element's override lookup key, if it has a non-empty one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn serialized_data(&self) -> Option<&SerializedRecord> {
        self.serialized_data.as_ref()
    }

    pub fn set_serialized_data(&mut self, record: Option<SerializedRecord>) {
        self.serialized_data = record;
    }
}

/// An entry in a document's nested-object table.
#[derive(Debug, Clone)]
pub enum ObjectAsset {
    /// A concrete nested object.
    Object(ElementAsset),
    /// A wrapper grouping the objects of one attribute, e.g. `<columns>`.
    /// Its members are stored under the group's own id.
    Group { id: AssetId, field_name: String },
}

impl ObjectAsset {
    pub fn id(&self) -> AssetId {
        match self {
            ObjectAsset::Object(element) => element.id(),
            ObjectAsset::Group { id, .. } => *id,
        }
    }

    pub fn as_object(&self) -> Option<&ElementAsset> {
        match self {
            ObjectAsset::Object(element) => Some(element),
            ObjectAsset::Group { .. } => None,
        }
    }

    /// Returns the group's field name when this is a group.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            ObjectAsset::Group { field_name, .. } => Some(field_name),
            ObjectAsset::Object(_) => None,
        }
    }
}

/// One `(element name, attribute name, raw value)` override declared on a
/// template instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeOverride {
    pub element_name: String,
    pub attribute_name: String,
    pub value: String,
}

impl AttributeOverride {
    pub fn new(
        element_name: impl Into<String>,
        attribute_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            element_name: element_name.into(),
            attribute_name: attribute_name.into(),
            value: value.into(),
        }
    }
}

/// Override records produced for one template instantiation.
///
/// `records` holds the overridden elements of the referenced document, keyed
/// by element id. `nested` holds the records produced for templates nested in
/// that document, keyed by the nested template's id, so every record stays
/// owned by the instantiation that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerializedDataOverrides {
    records: IndexMap<AssetId, SerializedRecord>,
    nested: IndexMap<AssetId, SerializedDataOverrides>,
}

impl SerializedDataOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_record(&mut self, element_id: AssetId, record: SerializedRecord) {
        self.records.insert(element_id, record);
    }

    pub fn insert_nested(&mut self, template_id: AssetId, overrides: SerializedDataOverrides) {
        self.nested.insert(template_id, overrides);
    }

    pub fn record(&self, element_id: AssetId) -> Option<&SerializedRecord> {
        self.records.get(&element_id)
    }

    pub fn nested(&self, template_id: AssetId) -> Option<&SerializedDataOverrides> {
        self.nested.get(&template_id)
    }

    pub fn records(&self) -> impl Iterator<Item = (AssetId, &SerializedRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    pub fn nested_overrides(&self) -> impl Iterator<Item = (AssetId, &SerializedDataOverrides)> {
        self.nested.iter().map(|(id, overrides)| (*id, overrides))
    }

    /// Number of records at this level and below.
    pub fn total_records(&self) -> usize {
        self.records.len()
            + self
                .nested
                .values()
                .map(SerializedDataOverrides::total_records)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.nested.is_empty()
    }
}

/// An instance of another document placed inside this one.
#[derive(Debug, Clone)]
pub struct TemplateAsset {
    element: ElementAsset,
    template_alias: String,
    attribute_overrides: Vec<AttributeOverride>,
    serialized_data_overrides: SerializedDataOverrides,
}

impl TemplateAsset {
    pub fn new(element: ElementAsset, template_alias: impl Into<String>) -> Self {
        Self {
            element,
            template_alias: template_alias.into(),
            attribute_overrides: Vec::new(),
            serialized_data_overrides: SerializedDataOverrides::default(),
        }
    }

    pub fn with_override(mut self, attribute_override: AttributeOverride) -> Self {
        self.attribute_overrides.push(attribute_override);
        self
    }

    pub fn template_alias(&self) -> &str {
        &self.template_alias
    }

    pub fn attribute_overrides(&self) -> &[AttributeOverride] {
        &self.attribute_overrides
    }

    pub fn has_attribute_overrides(&self) -> bool {
        !self.attribute_overrides.is_empty()
    }

    pub fn serialized_data_overrides(&self) -> &SerializedDataOverrides {
        &self.serialized_data_overrides
    }

    pub fn set_serialized_data_overrides(&mut self, overrides: SerializedDataOverrides) {
        self.serialized_data_overrides = overrides;
    }

    pub fn element(&self) -> &ElementAsset {
        &self.element
    }
}

impl Deref for TemplateAsset {
    type Target = ElementAsset;

    fn deref(&self) -> &Self::Target {
        &self.element
    }
}

impl DerefMut for TemplateAsset {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_reserved() {
        let a = AssetId::generate();
        let b = AssetId::generate();

        assert_ne!(a, b);
        assert!(a.is_generated());
        assert!(!AssetId::new(42).is_generated());
    }

    #[test]
    fn test_empty_name_is_unnamed() {
        let element = ElementAsset::new(AssetId::new(1), Id::new("ui.Label")).with_name("");
        assert_eq!(element.name(), None);

        let named = ElementAsset::new(AssetId::new(2), Id::new("ui.Label")).with_name("title");
        assert_eq!(named.name(), Some("title"));
    }

    #[test]
    fn test_attributes_keep_document_order() {
        let element = ElementAsset::new(AssetId::new(1), Id::new("ui.Label"))
            .with_attribute("text", "Hello")
            .with_attribute("tooltip", "hi")
            .with_attribute("text", "Bye");

        let names: Vec<_> = element.attributes().keys().map(String::as_str).collect();
        assert_eq!(names, ["text", "tooltip"]);
        assert_eq!(element.attribute("text"), Some("Bye"));
    }

    #[test]
    fn test_template_derefs_to_element() {
        let template = TemplateAsset::new(
            ElementAsset::new(AssetId::new(5), Id::new("ui.TemplateContainer")).with_name("card"),
            "Card",
        )
        .with_override(AttributeOverride::new("title", "text", "Hi"));

        assert_eq!(template.id(), AssetId::new(5));
        assert_eq!(template.name(), Some("card"));
        assert_eq!(template.template_alias(), "Card");
        assert!(template.has_attribute_overrides());
    }

    #[test]
    fn test_overrides_total_records() {
        let record = SerializedRecord::new(Id::new("ui.Label"), AssetId::new(1));
        let mut inner = SerializedDataOverrides::new();
        inner.insert_record(AssetId::new(1), record.clone());

        let mut outer = SerializedDataOverrides::new();
        outer.insert_record(AssetId::new(2), record);
        outer.insert_nested(AssetId::new(9), inner);

        assert_eq!(outer.total_records(), 2);
        assert!(outer.nested(AssetId::new(9)).is_some());
        assert!(!outer.is_empty());
    }
}
