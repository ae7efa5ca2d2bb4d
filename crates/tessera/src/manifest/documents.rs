//! Building [`Document`]s from the `[[documents]]` tables.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::trace;

use tessera_core::{
    asset::{AssetId, AttributeOverride, ElementAsset, ObjectAsset, TemplateAsset},
    document::{Document, DocumentLibrary},
    identifier::Id,
};

use super::{
    ManifestError, SourceMap,
    raw::{RawDocument, RawObject},
};

pub(super) fn build_library(
    documents: &[RawDocument],
    source_map: &mut SourceMap,
) -> Result<DocumentLibrary, ManifestError> {
    let mut library = DocumentLibrary::new();
    for raw in documents {
        let key = raw.key.get_ref();
        if library.get(key).is_some() {
            return Err(ManifestError::invalid(
                format!("document `{key}` is declared more than once"),
                raw.key.span(),
            ));
        }
        source_map.insert_document(key, raw.key.span());
        library.insert(build_document(raw, source_map)?);
    }
    Ok(library)
}

fn build_document(raw: &RawDocument, source_map: &mut SourceMap) -> Result<Document, ManifestError> {
    let key = raw.key.get_ref().as_str();
    let mut document = Document::new(key);
    for (alias, target) in &raw.aliases {
        document.add_template_alias(alias.as_str(), target.as_str());
    }

    // Every id first, so objects may name owners declared after them.
    let mut ids = HashSet::from([AssetId::ROOT]);
    let declared = raw
        .elements
        .iter()
        .map(|element| &element.id)
        .chain(raw.objects.iter().map(|object| &object.id))
        .chain(raw.templates.iter().map(|template| &template.id));
    for id in declared {
        let asset_id = AssetId::new(*id.get_ref());
        if asset_id == AssetId::ROOT || asset_id.is_generated() {
            return Err(ManifestError::invalid(
                format!("asset id {asset_id} is reserved"),
                id.span(),
            ));
        }
        if !ids.insert(asset_id) {
            return Err(ManifestError::invalid(
                format!("asset id {asset_id} is used more than once in `{key}`"),
                id.span(),
            ));
        }
        source_map.insert_asset(key, asset_id, id.span());
    }

    for raw_element in &raw.elements {
        let element = element_asset(
            AssetId::new(*raw_element.id.get_ref()),
            &raw_element.type_name,
            raw_element.name.as_deref(),
            raw_element.parent,
            &raw_element.attributes,
        )
        .map_err(|message| ManifestError::invalid(message, raw_element.id.span()))?;
        document.push_element(element);
    }

    for raw_object in &raw.objects {
        let parent = AssetId::new(raw_object.parent);
        if !ids.contains(&parent) {
            return Err(ManifestError::invalid(
                format!("nested object owner {parent} is not declared in `{key}`"),
                raw_object.id.span(),
            ));
        }
        let object = object_asset(raw_object)
            .map_err(|message| ManifestError::invalid(message, raw_object.id.span()))?;
        document.push_object(parent, object);
    }

    for raw_template in &raw.templates {
        let to_error = |message: String| ManifestError::invalid(message, raw_template.id.span());
        let element = element_asset(
            AssetId::new(*raw_template.id.get_ref()),
            &raw_template.type_name,
            raw_template.name.as_deref(),
            raw_template.parent,
            &raw_template.attributes,
        )
        .map_err(to_error)?;

        let mut template = TemplateAsset::new(element, raw_template.alias.as_str());
        for entry in &raw_template.overrides {
            let value = raw_text(&entry.value).ok_or_else(|| {
                to_error(format!(
                    "override of `{}.{}` must be a string, number or boolean",
                    entry.element, entry.attribute
                ))
            })?;
            template = template.with_override(AttributeOverride::new(
                entry.element.as_str(),
                entry.attribute.as_str(),
                value,
            ));
        }
        document.push_template(template);
    }

    trace!(
        document = key,
        elements = raw.elements.len(),
        objects = raw.objects.len(),
        templates = raw.templates.len();
        "Document loaded"
    );
    Ok(document)
}

fn element_asset(
    id: AssetId,
    type_name: &str,
    name: Option<&str>,
    parent: Option<u64>,
    attributes: &IndexMap<String, toml::Value>,
) -> Result<ElementAsset, String> {
    let mut element = ElementAsset::new(id, Id::new(type_name))
        .with_parent(parent.map(AssetId::new).unwrap_or(AssetId::ROOT));
    if let Some(name) = name.filter(|name| !name.is_empty()) {
        element = element.with_name(name);
    }
    for (attribute, value) in attributes {
        let raw = raw_text(value).ok_or_else(|| {
            format!("attribute `{attribute}` must be a string, number or boolean")
        })?;
        element = element.with_attribute(attribute.as_str(), raw);
    }
    Ok(element)
}

fn object_asset(raw: &RawObject) -> Result<ObjectAsset, String> {
    let id = AssetId::new(*raw.id.get_ref());
    match (&raw.group, &raw.type_name) {
        (Some(field_name), None) => {
            if raw.name.is_some() || !raw.attributes.is_empty() {
                return Err(format!("field group `{field_name}` cannot carry a name or attributes"));
            }
            Ok(ObjectAsset::Group {
                id,
                field_name: field_name.clone(),
            })
        }
        (None, Some(type_name)) => element_asset(
            id,
            type_name,
            raw.name.as_deref(),
            Some(raw.parent),
            &raw.attributes,
        )
        .map(ObjectAsset::Object),
        _ => Err(format!("nested object {id} needs exactly one of `type` or `group`")),
    }
}

/// Markup text of a scalar manifest value.
fn raw_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(text) => Some(text.clone()),
        toml::Value::Integer(number) => Some(number.to_string()),
        toml::Value::Float(number) => Some(number.to_string()),
        toml::Value::Boolean(flag) => Some(flag.to_string()),
        toml::Value::Datetime(datetime) => Some(datetime.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
