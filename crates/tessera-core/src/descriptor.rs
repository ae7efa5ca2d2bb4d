//! Attribute descriptors: per-field metadata and bag extraction.

use std::sync::OnceLock;

use indexmap::IndexSet;
use log::trace;

use crate::{
    bag::AttributeBag, coercion::TypeCoercion, identifier::Id, registry::TypeCatalog,
    value::Value,
};

/// Declared type of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    Bool,
    Int,
    Float,
    String,
    /// Enumeration with its legal variants in declaration order.
    Enum { type_name: Id, variants: Vec<String> },
    /// A type reference, optionally constrained to types assignable to `base`.
    Type { base: Option<Id> },
    /// A reference to an external asset of the given type.
    AssetRef { type_name: Id },
    /// A single nested object whose type is assignable to `type_name`.
    Nested { type_name: Id },
    /// A list of nested objects whose types are assignable to `element_type`.
    NestedList { element_type: Id },
}

impl AttributeType {
    /// The declared nested type, or the list element type.
    pub fn nested_type(&self) -> Option<Id> {
        match self {
            AttributeType::Nested { type_name } => Some(*type_name),
            AttributeType::NestedList { element_type } => Some(*element_type),
            _ => None,
        }
    }

    /// The value an attribute of this type holds when nothing else is known.
    pub fn implicit_default(&self) -> Value {
        match self {
            AttributeType::Bool => Value::Bool(false),
            AttributeType::Int => Value::Int(0),
            AttributeType::Float => Value::Float(0.0),
            AttributeType::String => Value::Text(String::new()),
            AttributeType::Enum { variants, .. } => variants
                .first()
                .map(|variant| Value::Enum(variant.clone()))
                .unwrap_or(Value::Null),
            AttributeType::NestedList { .. } => Value::List(Vec::new()),
            AttributeType::Type { .. }
            | AttributeType::AssetRef { .. }
            | AttributeType::Nested { .. } => Value::Null,
        }
    }

    /// Name used in diagnostics and schema files.
    pub fn keyword(&self) -> &'static str {
        match self {
            AttributeType::Bool => "bool",
            AttributeType::Int => "int",
            AttributeType::Float => "float",
            AttributeType::String => "string",
            AttributeType::Enum { .. } => "enum",
            AttributeType::Type { .. } => "type",
            AttributeType::AssetRef { .. } => "asset",
            AttributeType::Nested { .. } => "nested",
            AttributeType::NestedList { .. } => "nested-list",
        }
    }
}

/// Authoring restriction attached to a descriptor.
///
/// Restrictions describe what authoring tools should offer; coercion ignores
/// them.
#[derive(Debug, Clone, PartialEq)]
pub enum Restriction {
    Enumeration(Vec<String>),
    Range { min: Option<f64>, max: Option<f64> },
}

impl Restriction {
    /// Returns `true` if `value` satisfies the restriction. Values of an
    /// unrelated kind are not restricted.
    pub fn allows(&self, value: &Value) -> bool {
        match (self, value) {
            (Restriction::Enumeration(legal), Value::Enum(text) | Value::Text(text)) => {
                legal.iter().any(|candidate| candidate == text)
            }
            (Restriction::Range { min, max }, Value::Int(number)) => {
                within(*number as f64, *min, *max)
            }
            (Restriction::Range { min, max }, Value::Float(number)) => within(*number, *min, *max),
            _ => true,
        }
    }
}

fn within(number: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_none_or(|min| number >= min) && max.is_none_or(|max| number <= max)
}

/// Metadata for one serializable attribute of an element type.
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    name: String,
    ty: AttributeType,
    default_value: Value,
    restriction: Option<Restriction>,
    root_name: Option<String>,
    accepted_types: OnceLock<IndexSet<Id>>,
}

impl AttributeDescriptor {
    /// Create a descriptor with the type's implicit default.
    ///
    /// Enumerations get an [`Restriction::Enumeration`] of their variants.
    pub fn new(name: impl Into<String>, ty: AttributeType) -> Self {
        let restriction = match &ty {
            AttributeType::Enum { variants, .. } => Some(Restriction::Enumeration(variants.clone())),
            _ => None,
        };
        Self {
            name: name.into(),
            default_value: ty.implicit_default(),
            ty,
            restriction,
            root_name: None,
            accepted_types: OnceLock::new(),
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = value;
        self
    }

    /// Attach numeric bounds.
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.restriction = Some(Restriction::Range { min, max });
        self
    }

    /// Name of the wrapper group holding this attribute's nested objects.
    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = Some(root_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &AttributeType {
        &self.ty
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    pub fn restriction(&self) -> Option<&Restriction> {
        self.restriction.as_ref()
    }

    pub fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    pub fn is_list_valued(&self) -> bool {
        matches!(self.ty, AttributeType::NestedList { .. })
    }

    pub fn is_nested_object(&self) -> bool {
        self.ty.nested_type().is_some()
    }

    /// Read this attribute's raw value from `bag` and coerce it.
    ///
    /// An absent attribute or a value that fails coercion yields a clone of
    /// the default. Nested-object attributes are not stored in the bag and
    /// always yield the default here; the serializer resolves them from the
    /// document's object table.
    pub fn extract_from_bag(
        &self,
        bag: &AttributeBag<'_>,
        coercion: &dyn TypeCoercion,
        catalog: &dyn TypeCatalog,
    ) -> Value {
        let Some(raw) = bag.get(&self.name) else {
            return self.default_value.clone();
        };
        if self.is_nested_object() {
            return self.default_value.clone();
        }

        match coercion.to_value(&self.ty, raw, catalog) {
            Ok(value) => value,
            Err(err) => {
                trace!(attribute = self.name.as_str(), raw, error:% = err; "Coercion failed, using default");
                self.default_value.clone()
            }
        }
    }

    /// The closed set of concrete types that may satisfy a nested attribute.
    ///
    /// Holds the declared nested type plus every registered derived type
    /// that is neither abstract nor generic and is serializable. The set is
    /// computed on the first call, which registries make at registration
    /// time; later calls return the stored set. Empty for non-nested
    /// attributes.
    pub fn compute_accepted_types(&self, catalog: &dyn TypeCatalog) -> &IndexSet<Id> {
        self.accepted_types.get_or_init(|| {
            let Some(declared) = self.ty.nested_type() else {
                return IndexSet::new();
            };
            let mut accepted = IndexSet::new();
            accepted.insert(declared);
            accepted.extend(
                catalog
                    .derived_types(declared)
                    .into_iter()
                    .filter(|info| info.is_concrete() && info.is_serializable())
                    .map(|info| info.name()),
            );
            accepted
        })
    }

    /// Returns `true` if an object of `candidate` type may be stored in this
    /// nested attribute.
    pub fn accepts(&self, candidate: Id, catalog: &dyn TypeCatalog) -> bool {
        let Some(declared) = self.ty.nested_type() else {
            return false;
        };
        self.compute_accepted_types(catalog).contains(&candidate)
            && catalog.is_assignable(candidate, declared)
    }
}
