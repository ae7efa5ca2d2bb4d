//! Integration tests for the ProjectBuilder API
//!
//! These tests drive manifests through loading, serialization and rendering.

use std::fs;

use tessera::{
    ProjectBuilder, TesseraError,
    asset::AssetId,
    config::{AppConfig, OutputConfig, SerializerConfig},
    diagnostics::ErrorCode,
    value::Value,
};

const NESTED_TEMPLATES: &str = r#"
    [[types]]
    name = "ui.Label"
    attributes = [
        { name = "text", kind = "string" },
        { name = "size", kind = "int", default = 12 },
    ]

    [[types]]
    name = "ui.TemplateContainer"
    attributes = [{ name = "visible", kind = "bool", default = true }]

    [[documents]]
    key = "leaf"
    elements = [{ id = 1, type = "ui.Label", name = "e", attributes = { text = "base" } }]

    [[documents]]
    key = "middle"
    aliases = { Leaf = "leaf" }
    templates = [
        { id = 10, type = "ui.TemplateContainer", alias = "Leaf", overrides = [{ element = "e", attribute = "text", value = "B" }] },
    ]

    [[documents]]
    key = "root"
    aliases = { Middle = "middle" }
    templates = [
        { id = 20, type = "ui.TemplateContainer", alias = "Middle", overrides = [{ element = "e", attribute = "text", value = "A" }] },
    ]
"#;

fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

#[test]
fn test_builder_api_exists() {
    let _builder = ProjectBuilder::default();
}

#[test]
fn test_serialize_simple_project() {
    let source = r#"
        [[types]]
        name = "ui.Label"
        attributes = [
            { name = "text", kind = "string" },
            { name = "size", kind = "int", default = 12 },
        ]

        [[documents]]
        key = "main"
        elements = [{ id = 1, type = "ui.Label", attributes = { text = "Hello", size = 20 } }]
    "#;

    let builder = ProjectBuilder::default();
    let mut project = builder.parse(source).expect("Failed to load manifest");
    let report = builder.serialize(&mut project);
    assert!(report.is_clean(), "{:?}", report.diagnostics());

    let label = &project.library().get("main").unwrap().elements()[1];
    let record = label.serialized_data().expect("record attached");
    assert_eq!(text(record.get("text")), Some("Hello"));
    assert_eq!(record.get("size"), Some(&Value::Int(20)));
}

#[test]
fn test_ancestor_override_reaches_nested_template() {
    let builder = ProjectBuilder::default();
    let mut project = builder.parse(NESTED_TEMPLATES).unwrap();
    let report = builder.serialize(&mut project);
    assert!(report.is_clean(), "{:?}", report.diagnostics());

    let root = project.library().get("root").unwrap();
    let nested = root.templates()[0]
        .serialized_data_overrides()
        .nested(AssetId::new(10))
        .expect("records for the template inside `middle`");
    let record = nested.record(AssetId::new(1)).expect("record for `e`");
    assert_eq!(text(record.get("text")), Some("A"));
    assert_eq!(record.get("size"), Some(&Value::Int(12)));
}

#[test]
fn test_render_toml_output() {
    let builder = ProjectBuilder::default();
    let mut project = builder.parse(NESTED_TEMPLATES).unwrap();
    let report = builder.serialize(&mut project);

    let rendered = builder.render_toml(&project, &report).expect("Failed to render");
    let output: toml::Value = toml::from_str(&rendered).expect("Output should be valid TOML");

    let summary = &output["summary"];
    assert_eq!(summary["documents"].as_integer(), Some(3));
    assert_eq!(summary["element_records"].as_integer(), Some(1));
    // `middle` owns one override record, `root` owns the nested one.
    assert_eq!(summary["override_records"].as_integer(), Some(2));
    assert_eq!(summary["errors"].as_integer(), Some(0));
    assert!(output.get("diagnostics").is_none());

    let root = output["documents"]
        .as_array()
        .unwrap()
        .iter()
        .find(|document| document["key"].as_str() == Some("root"))
        .expect("root document");
    let entry = &root["templates"][0]["overrides"][0];
    assert_eq!(entry["path"].as_array().map(Vec::len), Some(1));
    assert_eq!(entry["asset_id"].as_integer(), Some(1));
    assert_eq!(entry["attributes"]["text"].as_str(), Some("A"));
}

#[test]
fn test_depth_limit_from_config() {
    let config = AppConfig::new(
        SerializerConfig {
            max_template_depth: 1,
            ..SerializerConfig::default()
        },
        OutputConfig::default(),
    );
    let builder = ProjectBuilder::new(config);
    let mut project = builder.parse(NESTED_TEMPLATES).unwrap();
    let report = builder.serialize(&mut project);

    assert!(report.has_errors());
    assert_eq!(report.with_code(ErrorCode::E402).count(), 1);

    let rendered = builder.render_toml(&project, &report).unwrap();
    assert!(rendered.contains("E402"));
}

#[test]
fn test_diagnostics_can_be_left_out_of_output() {
    let source = r#"
        [[types]]
        name = "ui.TemplateContainer"

        [[documents]]
        key = "main"
        templates = [
            { id = 1, type = "ui.TemplateContainer", alias = "Gone", overrides = [{ element = "e", attribute = "text", value = "X" }] },
        ]
    "#;
    let config = AppConfig::new(
        SerializerConfig::default(),
        OutputConfig {
            include_diagnostics: false,
            ..OutputConfig::default()
        },
    );
    let builder = ProjectBuilder::new(config);
    let mut project = builder.parse(source).unwrap();
    let report = builder.serialize(&mut project);
    assert_eq!(report.with_code(ErrorCode::E400).count(), 1);

    let rendered = builder.render_toml(&project, &report).unwrap();
    assert!(!rendered.contains("[[diagnostics]]"));
    assert!(rendered.contains("warnings = 1"));
}

#[test]
fn test_parse_invalid_manifest_returns_error() {
    let builder = ProjectBuilder::default();
    let result = builder.parse("this is not a manifest");

    match result {
        Err(TesseraError::Manifest { err, src }) => {
            assert_eq!(src, "this is not a manifest");
            assert!(err.span().is_some());
        }
        other => panic!("Expected a manifest error, got {other:?}"),
    }
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("project.toml");
    fs::write(&path, NESTED_TEMPLATES).unwrap();

    let builder = ProjectBuilder::default();
    let project = builder.load(&path).expect("Failed to load manifest file");
    assert_eq!(project.library().len(), 3);
    assert_eq!(project.source(), NESTED_TEMPLATES);

    let missing = builder.load(dir.path().join("missing.toml"));
    assert!(matches!(missing, Err(TesseraError::Io(_))));
}

#[test]
fn test_builder_reusability() {
    let builder = ProjectBuilder::default();

    let mut first = builder.parse(NESTED_TEMPLATES).unwrap();
    let first_report = builder.serialize(&mut first);
    let second_report = builder.serialize(&mut first);
    assert!(first_report.is_clean());
    assert!(second_report.is_clean());

    let mut other = builder.parse(NESTED_TEMPLATES).unwrap();
    builder.serialize(&mut other);

    let record = |project: &tessera::Project| {
        project.library().get("leaf").unwrap().elements()[1]
            .serialized_data()
            .and_then(|record| record.get("text"))
            .cloned()
    };
    assert_eq!(record(&first), record(&other));
}
