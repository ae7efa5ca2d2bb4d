//! Tessera - schema-driven attribute serialization for UI markup.
//!
//! Loads a project manifest (a schema plus already-parsed documents), turns
//! every element into a typed record, resolves per-instance template
//! overrides, and renders the result as TOML.

pub mod config;
pub mod manifest;
pub mod output;

mod error;
mod project;

pub use tessera_core::{asset, document, identifier, record, registry, value};
pub use tessera_serializer::{SerializationReport, error as diagnostics};

pub use error::TesseraError;
pub use project::Project;

use std::{fs, path::Path};

use log::{debug, info, trace};

use config::AppConfig;

/// Builder for loading, serializing and rendering Tessera projects.
///
/// # Examples
///
/// ```rust
/// use tessera::{ProjectBuilder, config::AppConfig};
///
/// let source = r#"
///     [[types]]
///     name = "ui.Label"
///     attributes = [{ name = "text", kind = "string" }]
///
///     [[documents]]
///     key = "main"
///     elements = [{ id = 1, type = "ui.Label", attributes = { text = "Hi" } }]
/// "#;
///
/// let builder = ProjectBuilder::new(AppConfig::default());
/// let mut project = builder.parse(source).expect("Failed to load manifest");
/// let report = builder.serialize(&mut project);
/// assert!(report.is_clean());
///
/// let toml = builder.render_toml(&project, &report).expect("Failed to render");
/// assert!(toml.contains("text = \"Hi\""));
/// ```
#[derive(Default)]
pub struct ProjectBuilder {
    config: AppConfig,
}

impl ProjectBuilder {
    /// Create a new project builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including serializer and output settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Load a project from manifest source.
    ///
    /// # Errors
    ///
    /// Returns [`TesseraError::Manifest`] for malformed manifests and invalid
    /// schemas.
    pub fn parse(&self, source: &str) -> Result<Project, TesseraError> {
        info!("Loading manifest");

        let project =
            manifest::load(source).map_err(|err| TesseraError::new_manifest_error(err, source))?;

        debug!(
            documents = project.library().len(),
            types = project.registry().types().count();
            "Manifest loaded successfully"
        );
        trace!(registry:? = project.registry(); "Loaded schema");

        Ok(project)
    }

    /// Read and load the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TesseraError::Io`] if the file cannot be read, otherwise as
    /// [`ProjectBuilder::parse`].
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Project, TesseraError> {
        let path = path.as_ref();
        debug!(path = path.display().to_string(); "Reading manifest");
        let source = fs::read_to_string(path)?;
        self.parse(&source)
    }

    /// Serialize every document of `project` and attach the records.
    ///
    /// Never fails: recoveries are reported in the returned
    /// [`SerializationReport`].
    pub fn serialize(&self, project: &mut Project) -> SerializationReport {
        info!(documents = project.library().len(); "Serializing project");
        let report = project.serialize(self.config.serializer().into());
        debug!(report:% = report; "Serialization finished");
        report
    }

    /// Render the records attached to `project` as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`TesseraError::Output`] if the records cannot be written.
    pub fn render_toml(
        &self,
        project: &Project,
        report: &SerializationReport,
    ) -> Result<String, TesseraError> {
        let rendered = output::render(project, report, self.config.output())?;
        info!(bytes = rendered.len(); "Records rendered");
        Ok(rendered)
    }
}
