//! CLI logic for the Tessera serializer.
//!
//! Loads a project manifest, runs one serialization pass, and writes the
//! resulting records as TOML.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use tessera::{ProjectBuilder, TesseraError};

/// Run the Tessera CLI application
///
/// The records are written even when the pass reports diagnostics; the
/// diagnostics are then returned as [`TesseraError::Serialization`] if any
/// of them is an error, or a warning under `--deny-warnings`.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `TesseraError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Manifest errors
/// - Output rendering errors
/// - Passes that reported errors
pub fn run(args: &Args) -> Result<(), TesseraError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing project"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let builder = ProjectBuilder::new(app_config);
    let mut project = builder.load(&args.input)?;
    let report = builder.serialize(&mut project);
    let rendered = builder.render_toml(&project, &report)?;

    fs::write(&args.output, rendered)?;
    info!(output_file = args.output; "Records written successfully");

    let warnings = report.warnings().count();
    if report.has_errors() || (args.deny_warnings && warnings > 0) {
        return Err(TesseraError::new_serialization_error(report, &project));
    }
    if warnings > 0 {
        warn!(warnings; "Serialization finished with warnings");
    }

    Ok(())
}
