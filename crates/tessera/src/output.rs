//! TOML rendering of the records attached by a serialization pass.
//!
//! The output holds a `[summary]` table, one `[[documents]]` entry per
//! document with its element records and template records, and, unless
//! disabled, one `[[diagnostics]]` entry per diagnostic of the pass.
//! Override records are flattened: each carries the `path` of nested
//! template ids below the instance that owns it.

use serde::Serialize;

use tessera_core::{
    asset::{AssetId, SerializedDataOverrides, TemplateAsset},
    document::Document,
    record::SerializedRecord,
};
use tessera_serializer::{SerializationReport, error::Diagnostic};

use crate::{Project, config::OutputConfig};

#[derive(Serialize)]
struct Output<'a> {
    summary: Summary,
    documents: Vec<DocumentOutput<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<DiagnosticOutput<'a>>,
}

#[derive(Serialize)]
struct Summary {
    documents: usize,
    element_records: usize,
    template_records: usize,
    override_records: usize,
    errors: usize,
    warnings: usize,
}

#[derive(Serialize)]
struct DocumentOutput<'a> {
    key: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    elements: Vec<&'a SerializedRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    templates: Vec<TemplateOutput<'a>>,
}

#[derive(Serialize)]
struct TemplateOutput<'a> {
    asset_id: AssetId,
    alias: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a SerializedRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    overrides: Vec<OverrideOutput<'a>>,
}

#[derive(Serialize)]
struct OverrideOutput<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    path: Vec<AssetId>,
    #[serde(flatten)]
    record: &'a SerializedRecord,
}

#[derive(Serialize)]
struct DiagnosticOutput<'a> {
    severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'a str>,
}

/// Render the records attached to `project` and the diagnostics of the
/// pass that attached them.
///
/// # Errors
///
/// Returns a [`toml::ser::Error`] if the records cannot be written as TOML.
pub fn render(
    project: &Project,
    report: &SerializationReport,
    config: &OutputConfig,
) -> Result<String, toml::ser::Error> {
    let documents: Vec<DocumentOutput<'_>> = project
        .library()
        .documents()
        .map(|document| document_output(document, config))
        .collect();

    let summary = Summary {
        documents: documents.len(),
        element_records: documents.iter().map(|document| document.elements.len()).sum(),
        template_records: documents
            .iter()
            .flat_map(|document| &document.templates)
            .filter(|template| template.record.is_some())
            .count(),
        override_records: documents
            .iter()
            .flat_map(|document| &document.templates)
            .map(|template| template.overrides.len())
            .sum(),
        errors: report.errors().count(),
        warnings: report.warnings().count(),
    };

    let diagnostics = if config.include_diagnostics {
        report.diagnostics().iter().map(diagnostic_output).collect()
    } else {
        Vec::new()
    };

    toml::to_string(&Output {
        summary,
        documents,
        diagnostics,
    })
}

fn document_output<'a>(document: &'a Document, config: &OutputConfig) -> DocumentOutput<'a> {
    DocumentOutput {
        key: document.key(),
        elements: document
            .elements()
            .iter()
            .skip(1)
            .filter_map(|element| element.serialized_data())
            .collect(),
        templates: document
            .templates()
            .iter()
            .map(template_output)
            .filter(|template| {
                config.include_empty_templates
                    || template.record.is_some()
                    || !template.overrides.is_empty()
            })
            .collect(),
    }
}

fn template_output(template: &TemplateAsset) -> TemplateOutput<'_> {
    let mut overrides = Vec::new();
    flatten_overrides(template.serialized_data_overrides(), &mut Vec::new(), &mut overrides);
    TemplateOutput {
        asset_id: template.id(),
        alias: template.template_alias(),
        record: template.serialized_data(),
        overrides,
    }
}

fn flatten_overrides<'a>(
    overrides: &'a SerializedDataOverrides,
    path: &mut Vec<AssetId>,
    out: &mut Vec<OverrideOutput<'a>>,
) {
    for (_, record) in overrides.records() {
        out.push(OverrideOutput {
            path: path.clone(),
            record,
        });
    }
    for (template_id, nested) in overrides.nested_overrides() {
        path.push(template_id);
        flatten_overrides(nested, path, out);
        path.pop();
    }
}

fn diagnostic_output(diagnostic: &Diagnostic) -> DiagnosticOutput<'_> {
    DiagnosticOutput {
        severity: diagnostic.severity().to_string(),
        code: diagnostic.code().map(|code| code.as_str()),
        message: diagnostic.message(),
        location: diagnostic.primary_location().map(ToString::to_string),
        help: diagnostic.help(),
    }
}
