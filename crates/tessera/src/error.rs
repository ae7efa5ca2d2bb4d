//! Error types for Tessera operations.
//!
//! This module provides the main error type [`TesseraError`] which wraps the
//! failures of loading a project, running a pass, and writing its output.

use std::io;

use thiserror::Error;

use tessera_serializer::SerializationReport;

use crate::{
    Project,
    manifest::{ManifestError, SourceMap},
};

/// The main error type for Tessera operations.
///
/// # Diagnostic Variants
///
/// `Manifest` and `Serialization` keep the manifest source, so hosts can
/// render the offending entries. `Serialization` also keeps the
/// [`SourceMap`] that places each diagnostic in that source.
#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Manifest { err: ManifestError, src: String },

    #[error("Serialization finished with {report}")]
    Serialization {
        report: SerializationReport,
        src: String,
        source_map: SourceMap,
    },

    #[error("Output error: {0}")]
    Output(#[from] toml::ser::Error),
}

impl TesseraError {
    /// Create a new `Manifest` error with the associated source.
    pub fn new_manifest_error(err: ManifestError, src: impl Into<String>) -> Self {
        Self::Manifest {
            err,
            src: src.into(),
        }
    }

    /// Create a new `Serialization` error for a pass over `project`.
    pub fn new_serialization_error(report: SerializationReport, project: &Project) -> Self {
        Self::Serialization {
            report,
            src: project.source().to_string(),
            source_map: project.source_map().clone(),
        }
    }
}
