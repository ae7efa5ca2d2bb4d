//! A loaded project: schema, documents and where they came from.

use tessera_core::{
    coercion::StandardCoercion, document::DocumentLibrary, registry::SchemaRegistry,
};
use tessera_serializer::{SerializationReport, SerializeConfig, serialize_library};

use crate::manifest::SourceMap;

/// The schema and documents of one manifest.
///
/// Serializing a project attaches records to its documents in place, so the
/// same project can be serialized again after its documents change.
#[derive(Debug, Clone)]
pub struct Project {
    source: String,
    registry: SchemaRegistry,
    library: DocumentLibrary,
    source_map: SourceMap,
}

impl Project {
    pub fn new(
        source: impl Into<String>,
        registry: SchemaRegistry,
        library: DocumentLibrary,
        source_map: SourceMap,
    ) -> Self {
        Self {
            source: source.into(),
            registry,
            library,
            source_map,
        }
    }

    /// The manifest text the project was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn library(&self) -> &DocumentLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut DocumentLibrary {
        &mut self.library
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Run one serialization pass over every document.
    pub(crate) fn serialize(&mut self, config: SerializeConfig) -> SerializationReport {
        serialize_library(&mut self.library, &self.registry, &StandardCoercion, config)
    }
}
