//! Whole-document serialization.

use indexmap::IndexMap;
use log::info;

use tessera_core::{
    asset::{AssetId, SerializedDataOverrides},
    document::Document,
    record::SerializedRecord,
};

use super::{Scope, Serializer};

/// The record and override records of one template instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRecords {
    /// The instance's own record, if its type is schema-managed.
    pub record: Option<SerializedRecord>,
    pub overrides: SerializedDataOverrides,
}

/// Records produced for one document, keyed by asset id.
///
/// Produced while the document library is borrowed, then attached to the
/// document with [`DocumentRecords::attach_to`].
#[derive(Debug, Clone, Default)]
pub struct DocumentRecords {
    document: String,
    elements: IndexMap<AssetId, SerializedRecord>,
    templates: IndexMap<AssetId, TemplateRecords>,
}

impl DocumentRecords {
    pub fn document_key(&self) -> &str {
        &self.document
    }

    pub fn element(&self, id: AssetId) -> Option<&SerializedRecord> {
        self.elements.get(&id)
    }

    pub fn template(&self, id: AssetId) -> Option<&TemplateRecords> {
        self.templates.get(&id)
    }

    pub fn elements(&self) -> impl Iterator<Item = (AssetId, &SerializedRecord)> {
        self.elements.iter().map(|(id, record)| (*id, record))
    }

    pub fn templates(&self) -> impl Iterator<Item = (AssetId, &TemplateRecords)> {
        self.templates.iter().map(|(id, records)| (*id, records))
    }

    /// Number of override records across all template instances.
    pub fn override_count(&self) -> usize {
        self.templates
            .values()
            .map(|records| records.overrides.total_records())
            .sum()
    }

    /// Replace the records held by the assets of `document`.
    ///
    /// Records are matched by asset id. Assets without a record, such as
    /// unmanaged elements, have their previous record cleared.
    pub fn attach_to(mut self, document: &mut Document) {
        for element in document.elements_mut() {
            element.set_serialized_data(self.elements.shift_remove(&element.id()));
        }
        for template in document.templates_mut() {
            let records = self.templates.shift_remove(&template.id()).unwrap_or_default();
            template.set_serialized_data(records.record);
            template.set_serialized_data_overrides(records.overrides);
        }
    }
}

impl<'a> Serializer<'a> {
    /// Serialize every element and template instance of `document`.
    ///
    /// Elements are visited in document order, skipping the implicit root
    /// and unmanaged types. Template instances follow, each serialized and
    /// then expanded by the override resolver.
    pub fn serialize_document<'d>(&mut self, document: &'d Document) -> DocumentRecords
    where
        'a: 'd,
    {
        let scope = Scope::document(document);
        let mut records = DocumentRecords {
            document: document.key().to_string(),
            ..DocumentRecords::default()
        };

        for element in document.elements().iter().skip(1) {
            if let Some(record) = self.serialize_element(element, scope) {
                records.elements.insert(element.id(), record);
            }
        }

        for template in document.templates() {
            let record = self.serialize_element(template, scope);
            let overrides = self.resolve_overrides(document, template);
            records
                .templates
                .insert(template.id(), TemplateRecords { record, overrides });
        }

        info!(
            document = document.key(),
            elements = records.elements.len(),
            templates = records.templates.len(),
            overrides = records.override_count();
            "Document serialized"
        );
        records
    }
}
