//! Labeled locations for diagnostic messages.
//!
//! Serialization works on parsed assets, not source text, so a label points
//! at a document, optionally narrowed to one element and one attribute.
//! Hosts that kept source positions for their assets can map a [`Location`]
//! back to a span.

use std::fmt;

use tessera_core::asset::AssetId;

/// Where in the document library a diagnostic applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    document: String,
    element: Option<AssetId>,
    attribute: Option<String>,
}

impl Location {
    /// A whole document.
    pub fn document(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            element: None,
            attribute: None,
        }
    }

    /// One element (or template, or nested object) of a document.
    pub fn element(document: impl Into<String>, element: AssetId) -> Self {
        Self {
            document: document.into(),
            element: Some(element),
            attribute: None,
        }
    }

    /// Narrow the location to one attribute.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn document_key(&self) -> &str {
        &self.document
    }

    pub fn element_id(&self) -> Option<AssetId> {
        self.element
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document)?;
        if let Some(element) = self.element {
            write!(f, "#{element}")?;
        }
        if let Some(attribute) = &self.attribute {
            write!(f, ".{attribute}")?;
        }
        Ok(())
    }
}

/// A message attached to a [`Location`].
///
/// - **Primary labels** mark the asset the diagnostic is about.
/// - **Secondary labels** give context, such as "first reference here".
#[derive(Debug, Clone)]
pub struct Label {
    location: Location,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
