#![allow(dead_code)]

use indexmap::IndexMap;

use tessera_core::{
    asset::{AssetId, AttributeOverride, ElementAsset, ObjectAsset, TemplateAsset},
    descriptor::{AttributeDescriptor, AttributeType},
    identifier::Id,
    live::{AccessError, LiveObject, LiveValue},
    registry::{SchemaRegistry, TypeInfo},
    value::Value,
};

pub const CONTAINER: &str = "ui.TemplateContainer";

/// A small widget schema:
///
/// - `ui.Label { text, size = 12 }`
/// - `ui.Table { caption, columns: [ui.Column] in <columns> }`
/// - `ui.Panel { content: ui.Column }`
/// - `ui.TextColumn { header }`, `ui.IconColumn { icon }`
/// - `ui.TemplateContainer { visible = true }`
pub fn registry() -> SchemaRegistry {
    SchemaRegistry::builder()
        .with_type(TypeInfo::new(Id::new("ui.Element")).abstract_type())
        .with_type(TypeInfo::new(Id::new("ui.Label")).with_base(Id::new("ui.Element")))
        .with_type(TypeInfo::new(Id::new("ui.Table")).with_base(Id::new("ui.Element")))
        .with_type(TypeInfo::new(Id::new("ui.Panel")).with_base(Id::new("ui.Element")))
        .with_type(TypeInfo::new(Id::new(CONTAINER)).with_base(Id::new("ui.Element")))
        .with_type(TypeInfo::new(Id::new("ui.Column")).abstract_type())
        .with_type(TypeInfo::new(Id::new("ui.TextColumn")).with_base(Id::new("ui.Column")))
        .with_type(TypeInfo::new(Id::new("ui.IconColumn")).with_base(Id::new("ui.Column")))
        .with_attributes(
            Id::new("ui.Label"),
            [
                AttributeDescriptor::new("text", AttributeType::String),
                AttributeDescriptor::new("size", AttributeType::Int).with_default(Value::Int(12)),
            ],
        )
        .with_attributes(
            Id::new("ui.Table"),
            [
                AttributeDescriptor::new("caption", AttributeType::String),
                AttributeDescriptor::new(
                    "columns",
                    AttributeType::NestedList {
                        element_type: Id::new("ui.Column"),
                    },
                )
                .with_root_name("columns"),
            ],
        )
        .with_attributes(
            Id::new("ui.Panel"),
            [AttributeDescriptor::new(
                "content",
                AttributeType::Nested {
                    type_name: Id::new("ui.Column"),
                },
            )],
        )
        .with_attributes(
            Id::new("ui.TextColumn"),
            [AttributeDescriptor::new("header", AttributeType::String)],
        )
        .with_attributes(
            Id::new("ui.IconColumn"),
            [AttributeDescriptor::new(
                "icon",
                AttributeType::AssetRef {
                    type_name: Id::new("ui.Texture"),
                },
            )],
        )
        .with_attributes(
            Id::new(CONTAINER),
            [AttributeDescriptor::new("visible", AttributeType::Bool).with_default(Value::Bool(true))],
        )
        .build()
        .expect("fixture schema is valid")
}

pub fn label(id: u64, name: Option<&str>, text: &str) -> ElementAsset {
    let label = ElementAsset::new(AssetId::new(id), Id::new("ui.Label")).with_attribute("text", text);
    match name {
        Some(name) => label.with_name(name),
        None => label,
    }
}

pub fn text_column(id: u64, header: &str) -> ObjectAsset {
    ObjectAsset::Object(
        ElementAsset::new(AssetId::new(id), Id::new("ui.TextColumn")).with_attribute("header", header),
    )
}

pub fn instance(id: u64, alias: &str, overrides: &[(&str, &str, &str)]) -> TemplateAsset {
    overrides.iter().fold(
        TemplateAsset::new(ElementAsset::new(AssetId::new(id), Id::new(CONTAINER)), alias),
        |template, (element, attribute, value)| {
            template.with_override(AttributeOverride::new(*element, *attribute, *value))
        },
    )
}

/// An in-memory live object.
#[derive(Debug, Clone)]
pub struct LiveWidget {
    pub type_name: Id,
    pub values: IndexMap<String, Value>,
    pub objects: IndexMap<String, Option<Box<LiveWidget>>>,
    pub lists: IndexMap<String, Vec<LiveWidget>>,
    pub broken: Vec<String>,
}

impl LiveWidget {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: Id::new(type_name),
            values: IndexMap::new(),
            objects: IndexMap::new(),
            lists: IndexMap::new(),
            broken: Vec::new(),
        }
    }

    pub fn with_value(mut self, name: &str, value: Value) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn with_object(mut self, name: &str, object: Option<LiveWidget>) -> Self {
        self.objects.insert(name.to_string(), object.map(Box::new));
        self
    }

    pub fn with_list(mut self, name: &str, items: Vec<LiveWidget>) -> Self {
        self.lists.insert(name.to_string(), items);
        self
    }
}

impl LiveObject for LiveWidget {
    fn type_name(&self) -> Id {
        self.type_name
    }

    fn read(&self, attribute: &str) -> Result<LiveValue<'_>, AccessError> {
        if self.broken.iter().any(|name| name == attribute) {
            return Err(AccessError::Failed {
                type_name: self.type_name,
                attribute: attribute.to_string(),
                reason: "member is disposed".into(),
            });
        }
        if let Some(value) = self.values.get(attribute) {
            return Ok(LiveValue::Value(value.clone()));
        }
        if let Some(object) = self.objects.get(attribute) {
            return Ok(LiveValue::Object(
                object.as_deref().map(|object| object as &dyn LiveObject),
            ));
        }
        if let Some(items) = self.lists.get(attribute) {
            return Ok(LiveValue::Objects(
                items.iter().map(|item| item as &dyn LiveObject).collect(),
            ));
        }
        Err(AccessError::MissingMember {
            type_name: self.type_name,
            attribute: attribute.to_string(),
        })
    }
}
