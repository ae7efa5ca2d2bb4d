//! Parsed documents and the library that resolves template aliases.

use indexmap::IndexMap;

use crate::{
    asset::{AssetId, ElementAsset, ObjectAsset, TemplateAsset},
    identifier::Id,
};

/// Type name of the implicit root element every document starts with.
pub const ROOT_TYPE_NAME: &str = "tessera.DocumentRoot";

/// One parsed markup document.
///
/// `elements[0]` is the implicit document root; it carries no serializable
/// attributes of its own.
#[derive(Debug, Clone)]
pub struct Document {
    key: String,
    elements: Vec<ElementAsset>,
    templates: Vec<TemplateAsset>,
    template_aliases: IndexMap<String, String>,
    object_entries: IndexMap<AssetId, Vec<ObjectAsset>>,
}

impl Document {
    /// Create a document containing only its implicit root.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            elements: vec![ElementAsset::new(AssetId::ROOT, Id::new(ROOT_TYPE_NAME))],
            templates: Vec::new(),
            template_aliases: IndexMap::new(),
            object_entries: IndexMap::new(),
        }
    }

    /// The key under which the document is stored in a [`DocumentLibrary`].
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn push_element(&mut self, element: ElementAsset) {
        self.elements.push(element);
    }

    pub fn push_template(&mut self, template: TemplateAsset) {
        self.templates.push(template);
    }

    /// Register the document key an alias used by template instances refers to.
    pub fn add_template_alias(&mut self, alias: impl Into<String>, document_key: impl Into<String>) {
        self.template_aliases.insert(alias.into(), document_key.into());
    }

    /// Append a nested-object entry owned by `parent`.
    pub fn push_object(&mut self, parent: AssetId, object: ObjectAsset) {
        self.object_entries.entry(parent).or_default().push(object);
    }

    pub fn elements(&self) -> &[ElementAsset] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [ElementAsset] {
        &mut self.elements
    }

    pub fn templates(&self) -> &[TemplateAsset] {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut [TemplateAsset] {
        &mut self.templates
    }

    pub fn element(&self, id: AssetId) -> Option<&ElementAsset> {
        self.elements.iter().find(|element| element.id() == id)
    }

    pub fn template(&self, id: AssetId) -> Option<&TemplateAsset> {
        self.templates.iter().find(|template| template.id() == id)
    }

    /// The document key `alias` refers to, if declared.
    pub fn template_document_key(&self, alias: &str) -> Option<&str> {
        self.template_aliases.get(alias).map(String::as_str)
    }

    /// Nested-object entries directly owned by `parent`, in document order.
    pub fn object_children(&self, parent: AssetId) -> &[ObjectAsset] {
        self.object_entries
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every concrete nested object of the document, groups excluded.
    pub fn objects(&self) -> impl Iterator<Item = &ElementAsset> {
        self.object_entries
            .values()
            .flatten()
            .filter_map(ObjectAsset::as_object)
    }

    /// Id of the element that owns the nested object `id`, directly or
    /// through groups and enclosing objects.
    ///
    /// Returns `None` for ids that are not nested objects of this document.
    pub fn owning_element(&self, id: AssetId) -> Option<AssetId> {
        let mut current = id;
        // Each step climbs one level; more steps than entries means a cycle.
        for _ in 0..self.object_entries.len() {
            let parent = self
                .object_entries
                .iter()
                .find(|(_, entries)| entries.iter().any(|entry| entry.id() == current))
                .map(|(parent, _)| *parent)?;
            if self.element(parent).is_some() {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Members of the group named `field_name` under `parent`.
    ///
    /// Returns `None` when no such group exists.
    pub fn field_group(&self, parent: AssetId, field_name: &str) -> Option<&[ObjectAsset]> {
        self.object_children(parent)
            .iter()
            .find(|entry| entry.field_name() == Some(field_name))
            .map(|group| self.object_children(group.id()))
    }
}

/// Parsed documents keyed by [`Document::key`].
#[derive(Debug, Clone, Default)]
pub struct DocumentLibrary {
    documents: IndexMap<String, Document>,
}

impl DocumentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, replacing any document with the same key.
    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.key().to_string(), document);
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.documents.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Document> {
        self.documents.get_mut(key)
    }

    /// Resolve the document `template` refers to from within `owner`.
    ///
    /// Returns `None` for a dangling reference: an undeclared alias or an
    /// alias pointing at a document that is not loaded.
    pub fn resolve_template(&self, owner: &Document, template: &TemplateAsset) -> Option<&Document> {
        owner
            .template_document_key(template.template_alias())
            .and_then(|key| self.get(key))
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
