mod common;

use tessera_core::{
    asset::AssetId, coercion::StandardCoercion, identifier::Id, record::SerializedRecord,
    value::Value,
};
use tessera_serializer::{Serializer, error::ErrorCode};

use common::{LiveWidget, registry};

fn column(header: &str) -> LiveWidget {
    LiveWidget::new("ui.TextColumn").with_value("header", Value::Text(header.into()))
}

fn table(headers: &[&str]) -> LiveWidget {
    LiveWidget::new("ui.Table")
        .with_value("caption", Value::Text("Scores".into()))
        .with_list("columns", headers.iter().map(|header| column(header)).collect())
}

fn column_ids(record: &SerializedRecord) -> Vec<AssetId> {
    record
        .get("columns")
        .and_then(Value::as_list)
        .unwrap_or_default()
        .iter()
        .map(SerializedRecord::asset_id)
        .collect()
}

#[test]
fn test_round_trip_is_idempotent() {
    let registry = registry();
    let mut serializer = Serializer::new(&registry, &StandardCoercion);
    let live = table(&["Name", "Score"]);

    let first = serializer.serialize_live_object(&live).expect("table is managed");
    let mut second = first.clone();
    serializer.sync_live_object(&live, &mut second);

    assert_eq!(first, second);
    assert!(serializer.finish().is_clean());
}

#[test]
fn test_nested_ids_survive_positional_resync() {
    let registry = registry();
    let mut serializer = Serializer::new(&registry, &StandardCoercion);

    let mut record = serializer
        .serialize_live_object(&table(&["A", "B", "C"]))
        .unwrap();
    let before = column_ids(&record);
    assert_eq!(before.len(), 3);
    assert!(before.iter().all(AssetId::is_generated));

    // Drop the last column and reorder the rest: positions 0 and 1 keep ids.
    serializer.sync_live_object(&table(&["B", "A"]), &mut record);
    let after = column_ids(&record);
    assert_eq!(after, before[..2]);

    // A new trailing column gets a fresh id, never the removed one.
    serializer.sync_live_object(&table(&["B", "A", "D"]), &mut record);
    let grown = column_ids(&record);
    assert_eq!(grown[..2], before[..2]);
    assert_ne!(grown[2], before[2]);

    let headers: Vec<_> = record
        .get("columns")
        .and_then(Value::as_list)
        .unwrap()
        .iter()
        .filter_map(|column| column.get("header").and_then(Value::as_str))
        .collect();
    assert_eq!(headers, ["B", "A", "D"]);
}

#[test]
fn test_single_nested_record_reused() {
    let registry = registry();
    let mut serializer = Serializer::new(&registry, &StandardCoercion);

    let panel = |header: &str| LiveWidget::new("ui.Panel").with_object("content", Some(column(header)));
    let mut record = serializer.serialize_live_object(&panel("old")).unwrap();
    let id = record
        .get("content")
        .and_then(Value::as_record)
        .map(SerializedRecord::asset_id)
        .unwrap();

    serializer.sync_live_object(&panel("new"), &mut record);
    let content = record.get("content").and_then(Value::as_record).unwrap();
    assert_eq!(content.asset_id(), id);
    assert_eq!(content.get("header"), Some(&Value::Text("new".into())));

    // A different concrete type is a different object.
    let icon = LiveWidget::new("ui.Panel").with_object(
        "content",
        Some(LiveWidget::new("ui.IconColumn").with_value("icon", Value::Null)),
    );
    serializer.sync_live_object(&icon, &mut record);
    let content = record.get("content").and_then(Value::as_record).unwrap();
    assert_ne!(content.asset_id(), id);
    assert_eq!(content.type_name(), Id::new("ui.IconColumn"));
}

#[test]
fn test_access_failure_keeps_previous_value() {
    let registry = registry();
    let mut serializer = Serializer::new(&registry, &StandardCoercion);

    let live = LiveWidget::new("ui.Label")
        .with_value("text", Value::Text("before".into()))
        .with_value("size", Value::Int(14));
    let mut record = serializer.serialize_live_object(&live).unwrap();

    let mut broken = live.clone().with_value("size", Value::Int(20));
    broken.values.insert("text".into(), Value::Text("after".into()));
    broken.broken.push("text".into());
    serializer.sync_live_object(&broken, &mut record);

    assert_eq!(record.get("text"), Some(&Value::Text("before".into())));
    assert_eq!(record.get("size"), Some(&Value::Int(20)));

    let report = serializer.finish();
    assert_eq!(report.with_code(ErrorCode::E500).count(), 1);
}

#[test]
fn test_shape_mismatch_is_reported() {
    let registry = registry();
    let mut serializer = Serializer::new(&registry, &StandardCoercion);

    let live = LiveWidget::new("ui.Panel").with_value("content", Value::Int(3));
    let record = serializer.serialize_live_object(&live).unwrap();

    assert!(!record.contains("content"));
    let report = serializer.finish();
    assert_eq!(report.with_code(ErrorCode::E501).count(), 1);
}

#[test]
fn test_rejected_live_type_is_skipped() {
    let registry = registry();
    let mut serializer = Serializer::new(&registry, &StandardCoercion);

    let live = LiveWidget::new("ui.Table")
        .with_value("caption", Value::Text(String::new()))
        .with_list("columns", vec![column("ok"), LiveWidget::new("ui.Label")]);
    let record = serializer.serialize_live_object(&live).unwrap();

    assert_eq!(column_ids(&record).len(), 1);
    assert_eq!(serializer.finish().with_code(ErrorCode::E301).count(), 1);
}

#[test]
fn test_unmanaged_live_object() {
    let registry = registry();
    let mut serializer = Serializer::new(&registry, &StandardCoercion);

    assert!(serializer.serialize_live_object(&LiveWidget::new("vendor.Chart")).is_none());
}
