//! Descriptor registry interfaces and a statically registered implementation.
//!
//! The serializer only talks to [`DescriptorRegistry`] and [`TypeCatalog`].
//! [`SchemaRegistry`] is a plain in-memory table built once from explicit
//! registrations; it never inspects live objects.

use std::{collections::HashSet, fmt, sync::Arc};

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::{
    asset::AssetId, descriptor::AttributeDescriptor, identifier::Id,
    legacy::LegacyAttributeHandler, record::SerializedRecord,
};

/// Errors raised while building a [`SchemaRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("type `{0}` is registered more than once")]
    DuplicateType(Id),

    #[error("type `{type_name}` derives from unknown type `{base}`")]
    UnknownBaseType { type_name: Id, base: Id },

    #[error("type hierarchy of `{0}` is cyclic")]
    CyclicHierarchy(Id),

    #[error("attributes registered for unknown type `{0}`")]
    UnknownType(Id),

    #[error("attribute `{attribute}` is declared more than once on `{type_name}`")]
    DuplicateAttribute { type_name: Id, attribute: String },

    #[error("attribute `{attribute}` of `{type_name}` refers to unknown type `{target}`")]
    UnknownNestedType {
        type_name: Id,
        attribute: String,
        target: Id,
    },
}

/// Registration facts about one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    name: Id,
    base: Option<Id>,
    is_abstract: bool,
    is_generic: bool,
    serializable: bool,
}

impl TypeInfo {
    /// A concrete, serializable type without a base.
    pub fn new(name: Id) -> Self {
        Self {
            name,
            base: None,
            is_abstract: false,
            is_generic: false,
            serializable: true,
        }
    }

    pub fn with_base(mut self, base: Id) -> Self {
        self.base = Some(base);
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn generic(mut self) -> Self {
        self.is_generic = true;
        self
    }

    /// Mark the type as having no serializable counterpart.
    pub fn not_serializable(mut self) -> Self {
        self.serializable = false;
        self
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn base(&self) -> Option<Id> {
        self.base
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_generic(&self) -> bool {
        self.is_generic
    }

    /// Neither abstract nor generic.
    pub fn is_concrete(&self) -> bool {
        !self.is_abstract && !self.is_generic
    }

    pub fn is_serializable(&self) -> bool {
        self.serializable
    }
}

/// Type hierarchy queries.
pub trait TypeCatalog {
    fn type_info(&self, name: Id) -> Option<&TypeInfo>;

    /// Every registered type that derives, directly or transitively, from `base`.
    fn derived_types(&self, base: Id) -> Vec<&TypeInfo>;

    /// Returns `true` if a value of type `from` may be stored where `to` is
    /// expected.
    fn is_assignable(&self, from: Id, to: Id) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(from);
        while let Some(name) = current {
            if name == to {
                return true;
            }
            if !visited.insert(name) {
                return false;
            }
            current = self.type_info(name).and_then(TypeInfo::base);
        }
        false
    }
}

/// Ordered descriptors of one element type.
#[derive(Debug, Clone)]
pub struct DescriptorSet {
    type_name: Id,
    descriptors: Vec<AttributeDescriptor>,
    legacy_handler: Option<Arc<dyn LegacyAttributeHandler>>,
}

impl DescriptorSet {
    pub fn new(type_name: Id, descriptors: Vec<AttributeDescriptor>) -> Self {
        Self {
            type_name,
            descriptors,
            legacy_handler: None,
        }
    }

    pub fn with_legacy_handler(mut self, handler: Arc<dyn LegacyAttributeHandler>) -> Self {
        self.legacy_handler = Some(handler);
        self
    }

    pub fn type_name(&self) -> Id {
        self.type_name
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.descriptors.iter()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.name() == name)
    }

    pub fn legacy_handler(&self) -> Option<&dyn LegacyAttributeHandler> {
        self.legacy_handler.as_deref()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Source of descriptor sets and record factories.
///
/// Registries are read-only while a serialization pass runs.
pub trait DescriptorRegistry: TypeCatalog {
    /// Descriptors for `type_name`, or `None` for a type that is not
    /// schema-managed.
    fn lookup(&self, type_name: Id) -> Option<&DescriptorSet>;

    /// An empty record for `type_name`.
    fn create_empty_record(&self, type_name: Id, asset_id: AssetId) -> SerializedRecord {
        SerializedRecord::new(type_name, asset_id)
    }

    /// A record holding every descriptor's default value.
    fn create_default_record(&self, type_name: Id, asset_id: AssetId) -> SerializedRecord {
        let mut record = self.create_empty_record(type_name, asset_id);
        if let Some(set) = self.lookup(type_name) {
            for descriptor in set.iter() {
                record.set(descriptor.name(), descriptor.default_value().clone());
            }
        }
        record
    }
}

/// Statically registered types and descriptors.
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    types: IndexMap<Id, TypeInfo>,
    sets: IndexMap<Id, DescriptorSet>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }

    fn ancestors(&self, type_name: Id) -> Result<Vec<Id>, RegistryError> {
        let mut chain = vec![type_name];
        let mut current = self.types.get(&type_name).and_then(TypeInfo::base);
        while let Some(base) = current {
            if chain.contains(&base) {
                return Err(RegistryError::CyclicHierarchy(type_name));
            }
            chain.push(base);
            current = self.types.get(&base).and_then(TypeInfo::base);
        }
        chain.reverse();
        Ok(chain)
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("types", &self.types.len())
            .field("descriptor_sets", &self.sets.len())
            .finish()
    }
}

impl TypeCatalog for SchemaRegistry {
    fn type_info(&self, name: Id) -> Option<&TypeInfo> {
        self.types.get(&name)
    }

    fn derived_types(&self, base: Id) -> Vec<&TypeInfo> {
        self.types
            .values()
            .filter(|info| info.name() != base && self.is_assignable(info.name(), base))
            .collect()
    }
}

impl DescriptorRegistry for SchemaRegistry {
    fn lookup(&self, type_name: Id) -> Option<&DescriptorSet> {
        self.sets.get(&type_name)
    }
}

/// Collects registrations and validates them into a [`SchemaRegistry`].
#[derive(Default)]
pub struct SchemaRegistryBuilder {
    types: Vec<TypeInfo>,
    attributes: Vec<(Id, Vec<AttributeDescriptor>)>,
    handlers: Vec<(Id, Arc<dyn LegacyAttributeHandler>)>,
}

impl SchemaRegistryBuilder {
    pub fn with_type(mut self, info: TypeInfo) -> Self {
        self.types.push(info);
        self
    }

    /// Declare attributes on `type_name`. Derived types inherit them ahead of
    /// their own attributes.
    pub fn with_attributes(
        mut self,
        type_name: Id,
        descriptors: impl IntoIterator<Item = AttributeDescriptor>,
    ) -> Self {
        self.attributes
            .push((type_name, descriptors.into_iter().collect()));
        self
    }

    /// Attach a legacy handler to `type_name` and, unless they declare their
    /// own, to its derived types.
    pub fn with_legacy_handler(
        mut self,
        type_name: Id,
        handler: Arc<dyn LegacyAttributeHandler>,
    ) -> Self {
        self.handlers.push((type_name, handler));
        self
    }

    /// Validate the registrations and build descriptor sets.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] for duplicate or unknown types, cyclic
    /// hierarchies, duplicate attribute names within one type (inherited
    /// attributes included), and nested attributes referring to unknown types.
    pub fn build(self) -> Result<SchemaRegistry, RegistryError> {
        let mut registry = SchemaRegistry::default();
        for info in self.types {
            if registry.types.contains_key(&info.name()) {
                return Err(RegistryError::DuplicateType(info.name()));
            }
            registry.types.insert(info.name(), info);
        }

        for info in registry.types.values() {
            match info.base() {
                Some(base) if !registry.types.contains_key(&base) => {
                    return Err(RegistryError::UnknownBaseType {
                        type_name: info.name(),
                        base,
                    });
                }
                _ => {}
            }
        }

        let mut own: IndexMap<Id, Vec<AttributeDescriptor>> = IndexMap::new();
        for (type_name, descriptors) in self.attributes {
            if !registry.types.contains_key(&type_name) {
                return Err(RegistryError::UnknownType(type_name));
            }
            own.entry(type_name).or_default().extend(descriptors);
        }

        let mut handlers: IndexMap<Id, Arc<dyn LegacyAttributeHandler>> = IndexMap::new();
        for (type_name, handler) in self.handlers {
            if !registry.types.contains_key(&type_name) {
                return Err(RegistryError::UnknownType(type_name));
            }
            handlers.insert(type_name, handler);
        }

        let mut sets = IndexMap::new();
        for info in registry.types.values() {
            let chain = registry.ancestors(info.name())?;
            if !info.is_serializable() || !info.is_concrete() {
                continue;
            }

            let mut descriptors: Vec<AttributeDescriptor> = Vec::new();
            for ancestor in &chain {
                for descriptor in own.get(ancestor).into_iter().flatten() {
                    if descriptors.iter().any(|d| d.name() == descriptor.name()) {
                        return Err(RegistryError::DuplicateAttribute {
                            type_name: info.name(),
                            attribute: descriptor.name().to_string(),
                        });
                    }
                    match descriptor.ty().nested_type() {
                        Some(target) if !registry.types.contains_key(&target) => {
                            return Err(RegistryError::UnknownNestedType {
                                type_name: info.name(),
                                attribute: descriptor.name().to_string(),
                                target,
                            });
                        }
                        _ => {}
                    }
                    descriptors.push(descriptor.clone());
                }
            }

            let mut set = DescriptorSet::new(info.name(), descriptors);
            if let Some(handler) = chain.iter().rev().find_map(|ancestor| handlers.get(ancestor)) {
                set = set.with_legacy_handler(Arc::clone(handler));
            }
            sets.insert(info.name(), set);
        }
        registry.sets = sets;

        for set in registry.sets.values() {
            for descriptor in set.iter() {
                descriptor.compute_accepted_types(&registry);
            }
        }

        debug!(
            types = registry.types.len(),
            descriptor_sets = registry.sets.len();
            "Schema registry built"
        );
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{descriptor::AttributeType, value::Value};

    fn id(name: &str) -> Id {
        Id::new(name)
    }

    #[test]
    fn test_inherited_attributes_come_first() {
        let registry = SchemaRegistry::builder()
            .with_type(TypeInfo::new(id("reg.Element")))
            .with_type(TypeInfo::new(id("reg.Label")).with_base(id("reg.Element")))
            .with_attributes(id("reg.Label"), [AttributeDescriptor::new("text", AttributeType::String)])
            .with_attributes(id("reg.Element"), [AttributeDescriptor::new("tooltip", AttributeType::String)])
            .build()
            .unwrap();

        let names: Vec<_> = registry
            .lookup(id("reg.Label"))
            .unwrap()
            .iter()
            .map(AttributeDescriptor::name)
            .collect();
        assert_eq!(names, ["tooltip", "text"]);
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let result = SchemaRegistry::builder()
            .with_type(TypeInfo::new(id("dup.Element")))
            .with_type(TypeInfo::new(id("dup.Label")).with_base(id("dup.Element")))
            .with_attributes(id("dup.Element"), [AttributeDescriptor::new("text", AttributeType::String)])
            .with_attributes(id("dup.Label"), [AttributeDescriptor::new("text", AttributeType::String)])
            .build();

        assert_eq!(
            result.unwrap_err(),
            RegistryError::DuplicateAttribute {
                type_name: id("dup.Label"),
                attribute: "text".into()
            }
        );
    }

    #[test]
    fn test_unknown_base_rejected() {
        let result = SchemaRegistry::builder()
            .with_type(TypeInfo::new(id("ub.Label")).with_base(id("ub.Missing")))
            .build();

        assert!(matches!(result, Err(RegistryError::UnknownBaseType { .. })));
    }

    #[test]
    fn test_cyclic_hierarchy_rejected() {
        let result = SchemaRegistry::builder()
            .with_type(TypeInfo::new(id("cyc.A")).with_base(id("cyc.B")))
            .with_type(TypeInfo::new(id("cyc.B")).with_base(id("cyc.A")))
            .build();

        assert!(matches!(result, Err(RegistryError::CyclicHierarchy(_))));
    }

    #[test]
    fn test_unknown_nested_type_rejected() {
        let result = SchemaRegistry::builder()
            .with_type(TypeInfo::new(id("nt.Grid")))
            .with_attributes(
                id("nt.Grid"),
                [AttributeDescriptor::new(
                    "columns",
                    AttributeType::NestedList {
                        element_type: id("nt.Column"),
                    },
                )],
            )
            .build();

        assert!(matches!(result, Err(RegistryError::UnknownNestedType { .. })));
    }

    #[test]
    fn test_abstract_types_have_no_descriptor_set() {
        let registry = SchemaRegistry::builder()
            .with_type(TypeInfo::new(id("abs.Base")).abstract_type())
            .with_type(TypeInfo::new(id("abs.Concrete")).with_base(id("abs.Base")))
            .build()
            .unwrap();

        assert!(registry.lookup(id("abs.Base")).is_none());
        assert!(registry.lookup(id("abs.Concrete")).is_some());
    }

    #[test]
    fn test_assignability_and_derived_types() {
        let registry = SchemaRegistry::builder()
            .with_type(TypeInfo::new(id("as.A")))
            .with_type(TypeInfo::new(id("as.B")).with_base(id("as.A")))
            .with_type(TypeInfo::new(id("as.C")).with_base(id("as.B")))
            .build()
            .unwrap();

        assert!(registry.is_assignable(id("as.C"), id("as.A")));
        assert!(!registry.is_assignable(id("as.A"), id("as.C")));
        assert!(!registry.is_assignable(id("as.Unknown"), id("as.A")));

        let derived: Vec<_> = registry
            .derived_types(id("as.A"))
            .iter()
            .map(|info| info.name())
            .collect();
        assert_eq!(derived, [id("as.B"), id("as.C")]);
    }

    #[test]
    fn test_create_default_record() {
        let registry = SchemaRegistry::builder()
            .with_type(TypeInfo::new(id("def.Toggle")))
            .with_attributes(
                id("def.Toggle"),
                [AttributeDescriptor::new("value", AttributeType::Bool).with_default(Value::Bool(true))],
            )
            .build()
            .unwrap();

        let record = registry.create_default_record(id("def.Toggle"), AssetId::new(8));
        assert_eq!(record.asset_id(), AssetId::new(8));
        assert_eq!(record.get("value"), Some(&Value::Bool(true)));

        let empty = registry.create_empty_record(id("def.Toggle"), AssetId::new(8));
        assert!(empty.is_empty());
    }
}
