//! Collector for accumulating diagnostics during a pass.

use log::{error, warn};

use crate::error::{Diagnostic, SerializationReport};

/// Accumulates the diagnostics of one serialization pass.
///
/// Every emitted diagnostic is mirrored to the log so hosts that only watch
/// the log still see it.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        let location = diagnostic
            .primary_location()
            .map(ToString::to_string)
            .unwrap_or_default();
        if diagnostic.severity().is_error() {
            error!(location = location.as_str(); "{diagnostic}");
        } else {
            warn!(location = location.as_str(); "{diagnostic}");
        }
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection and return the pass report.
    pub fn finish(self) -> SerializationReport {
        SerializationReport::new(self.diagnostics)
    }
}
