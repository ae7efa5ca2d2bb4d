//! The outcome of a serialization pass.

use std::fmt;

use crate::error::{Diagnostic, ErrorCode};

/// Diagnostics produced by one pass, in emission order.
///
/// A pass never fails as a whole; the report tells the host what was
/// recovered from.
#[derive(Debug, Clone, Default)]
pub struct SerializationReport {
    diagnostics: Vec<Diagnostic>,
}

impl SerializationReport {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Returns `true` if the pass produced no diagnostics at all.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity().is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity().is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity().is_warning())
    }

    /// Diagnostics carrying `code`.
    pub fn with_code(&self, code: ErrorCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.code() == Some(code))
    }

    /// Merge another report into this one, keeping emission order.
    pub fn merge(&mut self, other: SerializationReport) {
        self.diagnostics.extend(other.diagnostics);
    }
}

impl fmt::Display for SerializationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors().count();
        let warnings = self.warnings().count();
        write!(f, "{errors} error(s), {warnings} warning(s)")
    }
}
