//! Byte ranges of manifest entries, for mapping diagnostics back to source.

use std::{collections::HashMap, ops::Range};

use tessera_core::asset::AssetId;
use tessera_serializer::error::Location;

/// Spans of the documents and assets declared in one manifest.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    documents: HashMap<String, Range<usize>>,
    assets: HashMap<(String, AssetId), Range<usize>>,
}

impl SourceMap {
    pub(super) fn insert_document(&mut self, key: &str, span: Range<usize>) {
        self.documents.insert(key.to_string(), span);
    }

    pub(super) fn insert_asset(&mut self, document: &str, id: AssetId, span: Range<usize>) {
        self.assets.insert((document.to_string(), id), span);
    }

    /// Span of the asset `location` names, falling back to its document.
    pub fn span(&self, location: &Location) -> Option<Range<usize>> {
        let document = location.document_key();
        location
            .element_id()
            .and_then(|id| self.assets.get(&(document.to_string(), id)))
            .or_else(|| self.documents.get(document))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.assets.is_empty()
    }
}
