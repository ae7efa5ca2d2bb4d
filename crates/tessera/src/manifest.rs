//! Project manifests.
//!
//! A manifest is a TOML file declaring a schema and a set of already-parsed
//! documents:
//!
//! ```toml
//! [[types]]
//! name = "ui.Label"
//! attributes = [
//!     { name = "text", kind = "string" },
//!     { name = "size", kind = "int", default = 12, min = 1 },
//! ]
//!
//! [[documents]]
//! key = "main"
//! elements = [
//!     { id = 1, type = "ui.Label", name = "title", attributes = { text = "Hello" } },
//! ]
//! ```
//!
//! Attribute kinds are `bool`, `int`, `float`, `string`, `enum` (with
//! `variants`), `type`, `asset`, `nested` and `nested-list`; the last two
//! name their object type in `target` and may declare a `root` group name.
//! Documents may also declare `aliases` (template alias to document key),
//! nested `objects` (either a `type` or a field `group`, owned by `parent`)
//! and `templates` with their `overrides`.

mod documents;
mod raw;
mod schema;
mod source_map;

pub use source_map::SourceMap;

use std::ops::Range;

use log::debug;
use thiserror::Error;

use tessera_core::registry::RegistryError;

use crate::Project;

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("{}", .0.message())]
    Syntax(#[from] toml::de::Error),

    #[error("{message}")]
    Invalid {
        message: String,
        span: Option<Range<usize>>,
    },

    #[error("invalid schema: {err}")]
    Registry {
        err: RegistryError,
        span: Option<Range<usize>>,
    },
}

impl ManifestError {
    pub(crate) fn invalid(message: impl Into<String>, span: Range<usize>) -> Self {
        Self::Invalid {
            message: message.into(),
            span: Some(span),
        }
    }

    /// Byte range of the offending manifest entry, when known.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            Self::Syntax(err) => err.span(),
            Self::Invalid { span, .. } | Self::Registry { span, .. } => span.clone(),
        }
    }
}

/// Load the schema and documents declared in `source`.
///
/// # Errors
///
/// Returns a [`ManifestError`] for malformed TOML, unknown attribute kinds,
/// defaults that do not fit their attribute, invalid schemas, duplicate or
/// reserved asset ids, and nested objects whose owner is not declared.
pub fn load(source: &str) -> Result<Project, ManifestError> {
    let manifest: raw::RawManifest = toml::from_str(source)?;

    let registry = schema::build_registry(&manifest.types)?;
    let mut source_map = SourceMap::default();
    let library = documents::build_library(&manifest.documents, &mut source_map)?;
    debug!(
        types = manifest.types.len(),
        documents = library.len();
        "Manifest loaded"
    );

    Ok(Project::new(source, registry, library, source_map))
}
