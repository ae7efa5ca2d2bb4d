mod common;

use tessera_core::{
    asset::{AssetId, ObjectAsset},
    coercion::StandardCoercion,
    document::{Document, DocumentLibrary},
    value::Value,
};
use tessera_serializer::{
    SerializationReport, SerializeConfig, Serializer, error::ErrorCode, serialize_library,
};

use common::{instance, label, registry, text_column};

/// `leaf` holds a named label `e` (id 1), an unnamed label (id 2) and a
/// named label `other` (id 3).
fn leaf() -> Document {
    let mut leaf = Document::new("leaf");
    leaf.push_element(label(1, Some("e"), "base"));
    leaf.push_element(label(2, None, "anonymous"));
    leaf.push_element(label(3, Some("other"), "untouched"));
    leaf
}

/// `middle` instantiates `leaf` (template id 10) overriding `e.text = B`.
fn middle() -> Document {
    let mut middle = Document::new("middle");
    middle.add_template_alias("Leaf", "leaf");
    middle.push_template(instance(10, "Leaf", &[("e", "text", "B")]));
    middle
}

/// `root` instantiates `middle` (template id 20) with `overrides`.
fn root(overrides: &[(&str, &str, &str)]) -> Document {
    let mut root = Document::new("root");
    root.add_template_alias("Middle", "middle");
    root.push_template(instance(20, "Middle", overrides));
    root
}

fn run(documents: Vec<Document>, config: SerializeConfig) -> (DocumentLibrary, SerializationReport) {
    let registry = registry();
    let mut library = DocumentLibrary::new();
    for document in documents {
        library.insert(document);
    }
    let report = serialize_library(&mut library, &registry, &StandardCoercion, config);
    (library, report)
}

fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

#[test]
fn test_local_override_applies_to_named_element() {
    let (library, report) = run(vec![leaf(), middle()], SerializeConfig::default());
    assert!(report.is_clean(), "{:?}", report.diagnostics());

    let template = &library.get("middle").unwrap().templates()[0];
    let overrides = template.serialized_data_overrides();
    let record = overrides.record(AssetId::new(1)).expect("override record for `e`");

    assert_eq!(record.asset_id(), AssetId::new(1));
    assert_eq!(text(record.get("text")), Some("B"));
    assert_eq!(record.get("size"), Some(&Value::Int(12)));
    assert!(overrides.record(AssetId::new(3)).is_none());
}

#[test]
fn test_ancestor_override_wins() {
    let (library, report) = run(
        vec![leaf(), middle(), root(&[("e", "text", "A")])],
        SerializeConfig::default(),
    );
    assert!(!report.has_errors());

    let template = &library.get("root").unwrap().templates()[0];
    let nested = template
        .serialized_data_overrides()
        .nested(AssetId::new(10))
        .expect("records for the template nested in `middle`");
    let record = nested.record(AssetId::new(1)).expect("override record for `e`");
    assert_eq!(text(record.get("text")), Some("A"));

    // The instance inside `middle` still resolves its own override alone.
    let own = library.get("middle").unwrap().templates()[0]
        .serialized_data_overrides()
        .record(AssetId::new(1))
        .cloned();
    assert_eq!(own.as_ref().and_then(|record| text(record.get("text"))), Some("B"));
}

#[test]
fn test_inherited_and_local_attributes_merge() {
    let (library, _) = run(
        vec![leaf(), middle(), root(&[("e", "size", "30")])],
        SerializeConfig::default(),
    );

    let record = library.get("root").unwrap().templates()[0]
        .serialized_data_overrides()
        .nested(AssetId::new(10))
        .and_then(|nested| nested.record(AssetId::new(1)))
        .cloned()
        .expect("override record");
    assert_eq!(record.get("size"), Some(&Value::Int(30)));
    assert_eq!(text(record.get("text")), Some("B"));
}

#[test]
fn test_referenced_documents_are_not_modified() {
    let (library, _) = run(
        vec![leaf(), middle(), root(&[("e", "text", "A")])],
        SerializeConfig::default(),
    );

    let leaf = library.get("leaf").unwrap();
    let own = leaf.elements()[1].serialized_data().expect("leaf record");
    assert_eq!(text(own.get("text")), Some("base"));
    assert!(leaf.templates().is_empty());
}

#[test]
fn test_unnamed_elements_never_receive_overrides() {
    let mut middle = Document::new("middle");
    middle.add_template_alias("Leaf", "leaf");
    middle.push_template(instance(10, "Leaf", &[("", "text", "X"), ("e", "text", "Y")]));

    let (library, report) = run(vec![leaf(), middle], SerializeConfig::default());

    let overrides = library.get("middle").unwrap().templates()[0]
        .serialized_data_overrides()
        .clone();
    let keys: Vec<_> = overrides.records().map(|(id, _)| id).collect();
    assert_eq!(keys, [AssetId::new(1)]);
    assert_eq!(report.with_code(ErrorCode::E403).count(), 1);
}

#[test]
fn test_no_overrides_is_a_no_op() {
    let mut middle = Document::new("middle");
    middle.add_template_alias("Leaf", "leaf");
    middle.push_template(instance(10, "Leaf", &[]));

    let (library, report) = run(vec![leaf(), middle], SerializeConfig::default());

    let template = &library.get("middle").unwrap().templates()[0];
    assert!(template.serialized_data_overrides().is_empty());
    assert_eq!(
        template.serialized_data().and_then(|record| record.get("visible")),
        Some(&Value::Bool(true))
    );
    assert!(report.is_clean());
}

#[test]
fn test_dangling_template_produces_nothing() {
    let mut main = Document::new("main");
    main.add_template_alias("Gone", "gone");
    main.push_template(instance(10, "Gone", &[("e", "text", "X")]));
    main.push_template(instance(11, "Undeclared", &[("e", "text", "X")]));

    let (library, report) = run(vec![main.clone()], SerializeConfig::default());
    for template in library.get("main").unwrap().templates() {
        assert!(template.serialized_data_overrides().is_empty());
    }
    assert_eq!(report.with_code(ErrorCode::E400).count(), 2);
    assert!(!report.has_errors());

    let quiet = SerializeConfig {
        report_dangling_templates: false,
        ..SerializeConfig::default()
    };
    let (_, report) = run(vec![main], quiet);
    assert!(report.is_clean());
}

#[test]
fn test_self_reference_is_refused() {
    let mut looped = Document::new("loop");
    looped.add_template_alias("Self", "loop");
    looped.push_element(label(1, Some("e"), "base"));
    looped.push_template(instance(10, "Self", &[("e", "text", "X")]));

    let (library, report) = run(vec![looped], SerializeConfig::default());

    let template = &library.get("loop").unwrap().templates()[0];
    assert!(template.serialized_data_overrides().is_empty());
    assert_eq!(report.with_code(ErrorCode::E401).count(), 1);
    assert_eq!(report.with_code(ErrorCode::E403).count(), 0);
}

#[test]
fn test_transitive_cycle_is_refused() {
    let mut a = Document::new("a");
    a.add_template_alias("B", "b");
    a.push_element(label(1, Some("e"), "in a"));
    a.push_template(instance(10, "B", &[("e", "text", "X")]));

    let mut b = Document::new("b");
    b.add_template_alias("A", "a");
    b.push_element(label(2, Some("e"), "in b"));
    b.push_template(instance(20, "A", &[]));

    let registry = registry();
    let mut library = DocumentLibrary::new();
    library.insert(a);
    library.insert(b);

    let mut serializer = Serializer::new(&registry, &StandardCoercion).with_library(&library);
    let a = library.get("a").unwrap();
    let resolved = serializer.resolve_overrides(a, &a.templates()[0]);

    // `b`'s own element is overridden; the branch back into `a` is cut.
    assert!(resolved.record(AssetId::new(2)).is_some());
    assert!(resolved.nested(AssetId::new(20)).is_none());
    let report = serializer.finish();
    assert_eq!(report.with_code(ErrorCode::E401).count(), 1);
}

#[test]
fn test_depth_limit() {
    let config = SerializeConfig {
        max_template_depth: 1,
        ..SerializeConfig::default()
    };
    let (library, report) = run(vec![leaf(), middle(), root(&[("e", "text", "A")])], config);

    let template = &library.get("root").unwrap().templates()[0];
    assert!(template.serialized_data_overrides().nested(AssetId::new(10)).is_none());
    assert_eq!(report.with_code(ErrorCode::E402).count(), 1);
}

/// `card` holds a table `grid` (id 1) whose `columns` group holds a text
/// column named `first` (id 3).
fn card() -> Document {
    let mut card = Document::new("card");
    card.push_element(
        tessera_core::asset::ElementAsset::new(AssetId::new(1), tessera_core::identifier::Id::new("ui.Table"))
            .with_name("grid"),
    );
    card.push_object(
        AssetId::new(1),
        ObjectAsset::Group {
            id: AssetId::new(2),
            field_name: "columns".into(),
        },
    );
    let named_column = match text_column(3, "Original") {
        ObjectAsset::Object(column) => ObjectAsset::Object(column.with_name("first")),
        group => group,
    };
    card.push_object(AssetId::new(2), named_column);
    card
}

fn main_with(overrides: &[(&str, &str, &str)]) -> Document {
    let mut main = Document::new("main");
    main.add_template_alias("Card", "card");
    main.push_template(instance(10, "Card", overrides));
    main
}

#[test]
fn test_named_nested_objects_follow_overrides() {
    let main = main_with(&[("grid", "caption", "Totals"), ("first", "header", "Renamed")]);

    let (library, report) = run(vec![card(), main], SerializeConfig::default());
    assert!(report.is_clean(), "{:?}", report.diagnostics());

    let grid = library.get("main").unwrap().templates()[0]
        .serialized_data_overrides()
        .record(AssetId::new(1))
        .cloned()
        .expect("override record for `grid`");
    assert_eq!(text(grid.get("caption")), Some("Totals"));
    let columns = grid.get("columns").and_then(Value::as_list).unwrap();
    assert_eq!(text(columns[0].get("header")), Some("Renamed"));
}

#[test]
fn test_nested_object_override_alone_rebuilds_owner() {
    let main = main_with(&[("first", "header", "Renamed")]);

    let (library, report) = run(vec![card(), main], SerializeConfig::default());
    assert!(report.is_clean(), "{:?}", report.diagnostics());

    let overrides = library.get("main").unwrap().templates()[0].serialized_data_overrides();
    assert_eq!(overrides.total_records(), 1);
    let grid = overrides.record(AssetId::new(1)).expect("override record for `grid`");
    let columns = grid.get("columns").and_then(Value::as_list).unwrap();
    assert_eq!(text(columns[0].get("header")), Some("Renamed"));

    // The instantiated document keeps its own values.
    let card = library.get("card").unwrap();
    let base = card.elements()[1].serialized_data().expect("record for `grid`");
    let base_columns = base.get("columns").and_then(Value::as_list).unwrap();
    assert_eq!(text(base_columns[0].get("header")), Some("Original"));
}

#[test]
fn test_nested_object_without_owning_element_is_reported() {
    let mut card = Document::new("card");
    let orphan = match text_column(3, "Original") {
        ObjectAsset::Object(column) => ObjectAsset::Object(column.with_name("first")),
        group => group,
    };
    card.push_object(AssetId::ROOT, orphan);
    let main = main_with(&[("first", "header", "Renamed")]);

    let (library, report) = run(vec![card, main], SerializeConfig::default());

    assert_eq!(report.with_code(ErrorCode::E403).count(), 1);
    assert!(
        library.get("main").unwrap().templates()[0]
            .serialized_data_overrides()
            .is_empty()
    );
}
