//! Tessera serializer.
//!
//! Turns parsed UI-markup assets into typed [`SerializedRecord`]s and
//! resolves per-instance attribute overrides across nested templates.
//!
//! # Passes
//!
//! A pass walks each document once in document order:
//!
//! 1. Every schema-managed element is serialized from its raw attribute bag.
//! 2. Every template instance is serialized, then expanded by the override
//!    resolver, which builds records for the overridden named elements of
//!    the instantiated document and of the templates nested inside it.
//!
//! Nothing in a pass is fatal. Recoveries are reported in the returned
//! [`SerializationReport`].
//!
//! # Example
//!
//! ```
//! # use tessera_core::{
//! #     asset::{AssetId, ElementAsset},
//! #     coercion::StandardCoercion,
//! #     descriptor::{AttributeDescriptor, AttributeType},
//! #     document::{Document, DocumentLibrary},
//! #     identifier::Id,
//! #     registry::{SchemaRegistry, TypeInfo},
//! #     value::Value,
//! # };
//! # use tessera_serializer::{SerializeConfig, serialize_library};
//! let registry = SchemaRegistry::builder()
//!     .with_type(TypeInfo::new(Id::new("ui.Label")))
//!     .with_attributes(
//!         Id::new("ui.Label"),
//!         [AttributeDescriptor::new("text", AttributeType::String)],
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut document = Document::new("main");
//! document.push_element(
//!     ElementAsset::new(AssetId::new(1), Id::new("ui.Label")).with_attribute("text", "Hello"),
//! );
//! let mut library = DocumentLibrary::new();
//! library.insert(document);
//!
//! let report = serialize_library(&mut library, &registry, &StandardCoercion, SerializeConfig::default());
//! assert!(report.is_clean());
//!
//! let label = &library.get("main").unwrap().elements()[1];
//! assert_eq!(
//!     label.serialized_data().unwrap().get("text"),
//!     Some(&Value::Text("Hello".into()))
//! );
//! ```
//!
//! [`SerializedRecord`]: tessera_core::record::SerializedRecord

pub mod config;
pub mod error;
mod serializer;

use log::info;

use tessera_core::{
    coercion::TypeCoercion, document::DocumentLibrary, registry::DescriptorRegistry,
};

pub use config::SerializeConfig;
pub use error::SerializationReport;
pub use serializer::{
    DocumentRecords, ElementOverrides, OverrideContext, OverrideRange, Scope, Serializer,
    TemplateRecords,
};

/// Serialize every document of `library` and attach the records.
///
/// Records are computed for all documents first, with template references
/// resolved against the unchanged library, and attached afterwards.
pub fn serialize_library(
    library: &mut DocumentLibrary,
    registry: &dyn DescriptorRegistry,
    coercion: &dyn TypeCoercion,
    config: SerializeConfig,
) -> SerializationReport {
    info!(documents = library.len(); "Starting serialization pass");

    let (all_records, report) = {
        let mut serializer = Serializer::new(registry, coercion)
            .with_library(library)
            .with_config(config);
        let all_records: Vec<DocumentRecords> = library
            .documents()
            .map(|document| serializer.serialize_document(document))
            .collect();
        (all_records, serializer.finish())
    };

    for records in all_records {
        let key = records.document_key().to_string();
        if let Some(document) = library.get_mut(&key) {
            records.attach_to(document);
        }
    }

    info!(
        errors = report.errors().count(),
        warnings = report.warnings().count();
        "Serialization pass finished"
    );
    report
}
