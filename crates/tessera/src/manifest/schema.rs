//! Building a [`SchemaRegistry`] from the `[[types]]` tables.

use std::{collections::HashMap, ops::Range, sync::Arc};

use log::debug;

use tessera_core::{
    descriptor::{AttributeDescriptor, AttributeType},
    identifier::Id,
    legacy::{CompositeAttribute, CompositeAttributeHandler},
    registry::{RegistryError, SchemaRegistry, TypeInfo},
    value::Value,
};

use super::{
    ManifestError,
    raw::{RawAttribute, RawType},
};

/// Type of asset references declared without a target.
const DEFAULT_ASSET_TYPE: &str = "tessera.Asset";

pub(super) fn build_registry(types: &[RawType]) -> Result<SchemaRegistry, ManifestError> {
    let mut spans: HashMap<Id, Range<usize>> = HashMap::new();
    let mut builder = SchemaRegistry::builder();

    for raw in types {
        let name = Id::new(raw.name.get_ref());
        spans.entry(name).or_insert_with(|| raw.name.span());

        let mut info = TypeInfo::new(name);
        if let Some(base) = &raw.base {
            info = info.with_base(Id::new(base));
        }
        if raw.is_abstract {
            info = info.abstract_type();
        }
        if raw.generic {
            info = info.generic();
        }
        if !raw.serializable {
            info = info.not_serializable();
        }
        builder = builder.with_type(info);

        let descriptors = raw
            .attributes
            .iter()
            .map(|attribute| descriptor(name, attribute))
            .collect::<Result<Vec<_>, _>>()?;
        if !descriptors.is_empty() {
            builder = builder.with_attributes(name, descriptors);
        }

        if !raw.composites.is_empty() {
            let composites = raw
                .composites
                .iter()
                .map(|composite| {
                    CompositeAttribute::new(
                        composite.target.as_str(),
                        composite.parts.iter().map(String::as_str),
                        composite.separator.as_str(),
                    )
                })
                .collect();
            builder = builder
                .with_legacy_handler(name, Arc::new(CompositeAttributeHandler::new(composites)));
        }
    }

    let registry = builder.build().map_err(|err| {
        let span = spans.get(&registry_error_type(&err)).cloned();
        ManifestError::Registry { err, span }
    })?;
    debug!(types = registry.types().count(); "Schema registered");
    Ok(registry)
}

fn descriptor(owner: Id, raw: &RawAttribute) -> Result<AttributeDescriptor, ManifestError> {
    let invalid = |message: String| ManifestError::invalid(message, raw.kind.span());
    let target = raw.target.as_deref().map(Id::new);
    let require_target = || {
        target.ok_or_else(|| {
            invalid(format!(
                "attribute `{}` of `{owner}` needs a `target` type",
                raw.name
            ))
        })
    };

    let ty = match raw.kind.get_ref().as_str() {
        "bool" => AttributeType::Bool,
        "int" => AttributeType::Int,
        "float" => AttributeType::Float,
        "string" => AttributeType::String,
        "enum" => {
            if raw.variants.is_empty() {
                return Err(invalid(format!(
                    "enum attribute `{}` of `{owner}` declares no variants",
                    raw.name
                )));
            }
            AttributeType::Enum {
                type_name: target.unwrap_or_else(|| Id::new(&raw.name)),
                variants: raw.variants.clone(),
            }
        }
        "type" => AttributeType::Type { base: target },
        "asset" => AttributeType::AssetRef {
            type_name: target.unwrap_or_else(|| Id::new(DEFAULT_ASSET_TYPE)),
        },
        "nested" => AttributeType::Nested {
            type_name: require_target()?,
        },
        "nested-list" => AttributeType::NestedList {
            element_type: require_target()?,
        },
        other => {
            return Err(invalid(format!("unknown attribute kind `{other}`")));
        }
    };

    let mut descriptor = AttributeDescriptor::new(raw.name.as_str(), ty);
    if let Some(default) = &raw.default {
        let value = default_value(descriptor.ty(), default.get_ref()).ok_or_else(|| {
            ManifestError::invalid(
                format!(
                    "default of `{}` is not a valid {} value",
                    raw.name,
                    descriptor.ty().keyword()
                ),
                default.span(),
            )
        })?;
        descriptor = descriptor.with_default(value);
    }
    if raw.min.is_some() || raw.max.is_some() {
        descriptor = descriptor.with_range(raw.min, raw.max);
    }
    if let Some(root) = &raw.root {
        descriptor = descriptor.with_root_name(root.as_str());
    }
    Ok(descriptor)
}

/// Convert a manifest default to a value of `ty`.
///
/// Nested attributes have no declarable default.
fn default_value(ty: &AttributeType, value: &toml::Value) -> Option<Value> {
    match (ty, value) {
        (AttributeType::Bool, toml::Value::Boolean(flag)) => Some(Value::Bool(*flag)),
        (AttributeType::Int, toml::Value::Integer(number)) => Some(Value::Int(*number)),
        (AttributeType::Float, toml::Value::Float(number)) => Some(Value::Float(*number)),
        (AttributeType::Float, toml::Value::Integer(number)) => Some(Value::Float(*number as f64)),
        (AttributeType::String, toml::Value::String(text)) => Some(Value::Text(text.clone())),
        (AttributeType::Enum { variants, .. }, toml::Value::String(text)) => variants
            .iter()
            .find(|variant| *variant == text)
            .map(|variant| Value::Enum(variant.clone())),
        (AttributeType::Type { .. }, toml::Value::String(text)) => Some(Value::Text(text.clone())),
        (AttributeType::AssetRef { .. }, toml::Value::String(path)) => Some(Value::Asset(path.clone())),
        _ => None,
    }
}

/// The type a registry error is about.
fn registry_error_type(err: &RegistryError) -> Id {
    match err {
        RegistryError::DuplicateType(name)
        | RegistryError::CyclicHierarchy(name)
        | RegistryError::UnknownType(name) => *name,
        RegistryError::UnknownBaseType { type_name, .. }
        | RegistryError::DuplicateAttribute { type_name, .. }
        | RegistryError::UnknownNestedType { type_name, .. } => *type_name,
    }
}
