//! Error adapter for converting TesseraError to miette diagnostics.
//!
//! This module provides the bridge between the library's error and
//! diagnostic types and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Diagnostic Support
//!
//! When a serialization pass reports several diagnostics, each one is
//! rendered independently, with its labels placed in the manifest source
//! through the project's [`SourceMap`].

use std::{fmt, ops::Range};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity as MietteSeverity, SourceSpan};

use tessera::{
    TesseraError,
    diagnostics::{Diagnostic, Severity},
    manifest::{ManifestError, SourceMap},
};

/// Adapter for a single diagnostic of a serialization pass.
pub struct DiagnosticAdapter<'a> {
    /// The wrapped diagnostic
    diag: &'a Diagnostic,
    /// Manifest source for displaying snippets
    src: &'a str,
    /// Places diagnostic locations in `src`
    source_map: &'a SourceMap,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str, source_map: &'a SourceMap) -> Self {
        Self {
            diag,
            src,
            source_map,
        }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels: Vec<LabeledSpan> = self
            .diag
            .labels()
            .iter()
            .filter_map(|label| {
                let span = span_to_miette(self.source_map.span(label.location())?);
                let message = Some(format!("{} ({})", label.message(), label.location()));
                Some(if label.is_primary() {
                    LabeledSpan::new_primary_with_span(message, span)
                } else {
                    LabeledSpan::new_with_span(message, span)
                })
            })
            .collect();
        if labels.is_empty() {
            return None;
        }
        Some(Box::new(labels.into_iter()))
    }
}

/// Adapter for a manifest loading error.
pub struct ManifestAdapter<'a> {
    err: &'a ManifestError,
    src: &'a str,
}

impl<'a> ManifestAdapter<'a> {
    pub fn new(err: &'a ManifestError, src: &'a str) -> Self {
        Self { err, src }
    }
}

impl fmt::Debug for ManifestAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for ManifestAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.err, f)
    }
}

impl std::error::Error for ManifestAdapter<'_> {}

impl MietteDiagnostic for ManifestAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.err {
            ManifestError::Syntax(_) => "tessera::manifest::syntax",
            ManifestError::Invalid { .. } => "tessera::manifest",
            ManifestError::Registry { .. } => "tessera::manifest::schema",
        };
        Some(Box::new(code))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.err.span()?;
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some("here".to_string()),
            span_to_miette(span),
        ))))
    }
}

/// Adapter for [`TesseraError`] variants without source locations.
///
/// This adapter handles errors such as I/O and output errors.
pub struct ErrorAdapter<'a>(pub &'a TesseraError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            TesseraError::Io(_) => "tessera::io",
            TesseraError::Manifest { .. } => "tessera::manifest",
            TesseraError::Serialization { .. } => "tessera::serialization",
            TesseraError::Output(_) => "tessera::output",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A pass diagnostic placed in the manifest source.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A manifest loading error.
    Manifest(ManifestAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl Reportable<'_> {
    fn inner(&self) -> &dyn MietteDiagnostic {
        match self {
            Reportable::Diagnostic(d) => d,
            Reportable::Manifest(m) => m,
            Reportable::Error(e) => e,
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner(), f)
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Error(e) => e.source(),
            Reportable::Diagnostic(_) | Reportable::Manifest(_) => None,
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.inner().code()
    }

    fn severity(&self) -> Option<MietteSeverity> {
        self.inner().severity()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.inner().help()
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.inner().source_code()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.inner().labels()
    }
}

/// Convert a manifest byte range to a miette [`SourceSpan`].
fn span_to_miette(span: Range<usize>) -> SourceSpan {
    SourceSpan::from(span)
}

/// Convert a [`TesseraError`] into a list of reportable errors.
///
/// For [`TesseraError::Serialization`], this returns one [`Reportable`] for
/// each diagnostic of the pass. For other error variants, this returns a
/// single [`Reportable`].
pub fn to_reportables(err: &TesseraError) -> Vec<Reportable<'_>> {
    match err {
        TesseraError::Serialization {
            report,
            src,
            source_map,
        } => report
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src, source_map)))
            .collect(),
        TesseraError::Manifest { err: manifest_err, src } => {
            vec![Reportable::Manifest(ManifestAdapter::new(manifest_err, src))]
        }
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}
