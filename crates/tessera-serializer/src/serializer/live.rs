//! Synchronizing records with live objects.
//!
//! The live direction reads values off in-memory objects instead of raw
//! bags. Nested records that already exist are reused so their asset ids
//! stay stable across passes.

use log::{debug, trace};

use tessera_core::{
    asset::AssetId,
    descriptor::AttributeDescriptor,
    live::{LiveObject, LiveValue},
    record::SerializedRecord,
    value::Value,
};

use super::Serializer;
use crate::error::{Diagnostic, ErrorCode, Location};

impl Serializer<'_> {
    /// Serialize a live object into a fresh record.
    ///
    /// Returns `None` when the object's type is not schema-managed.
    pub fn serialize_live_object(&mut self, live: &dyn LiveObject) -> Option<SerializedRecord> {
        self.registry.lookup(live.type_name())?;
        let mut record = self
            .registry
            .create_empty_record(live.type_name(), AssetId::generate());
        self.sync_live_object(live, &mut record);
        Some(record)
    }

    /// Refresh every attribute of `record` from `live`.
    ///
    /// An attribute whose member cannot be read keeps its previous value.
    pub fn sync_live_object(&mut self, live: &dyn LiveObject, record: &mut SerializedRecord) {
        let Some(set) = self.registry.lookup(live.type_name()) else {
            debug!(type_name:% = live.type_name(); "Live object type is unmanaged");
            return;
        };
        trace!(type_name:% = live.type_name(), asset_id:% = record.asset_id(); "Syncing live object");

        for descriptor in set.iter() {
            let location = Location::element(super::DETACHED_DOCUMENT, record.asset_id())
                .with_attribute(descriptor.name());
            let live_value = match live.read(descriptor.name()) {
                Ok(live_value) => live_value,
                Err(err) => {
                    self.diagnostics.emit(
                        Diagnostic::error(err.to_string())
                            .with_code(ErrorCode::E500)
                            .with_label(location, "previous value kept"),
                    );
                    continue;
                }
            };
            if let Some(value) =
                self.sync_from_live_value(descriptor, live_value, record.get(descriptor.name()), location)
            {
                record.set(descriptor.name(), value);
            }
        }
    }

    /// Convert one live member into a record value.
    ///
    /// Nested objects become records: the previous record at the same list
    /// position, or the previous single record, is reused when its type
    /// matches, so its asset id survives; other objects get a fresh id.
    /// Returns `None` when the live value has the wrong shape for the
    /// descriptor.
    pub fn sync_from_live_value(
        &mut self,
        descriptor: &AttributeDescriptor,
        live_value: LiveValue<'_>,
        previous: Option<&Value>,
        location: Location,
    ) -> Option<Value> {
        match (live_value, descriptor.is_nested_object(), descriptor.is_list_valued()) {
            (LiveValue::Value(value), false, _) => {
                Some(self.check_type_constraint(descriptor, value, location))
            }
            (LiveValue::Value(Value::Null) | LiveValue::Object(None), true, false) => Some(Value::Null),
            (LiveValue::Object(Some(object)), true, false) => {
                let previous = previous.and_then(Value::as_record);
                Some(
                    self.sync_nested(descriptor, object, previous, &location)
                        .map(|record| Value::Record(Box::new(record)))
                        .unwrap_or(Value::Null),
                )
            }
            (LiveValue::Objects(objects), true, true) => {
                let previous = previous.and_then(Value::as_list).unwrap_or_default();
                let records = objects
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, object)| {
                        self.sync_nested(descriptor, object, previous.get(index), &location)
                    })
                    .collect();
                Some(Value::List(records))
            }
            (live_value, _, _) => {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "live member `{}` has the wrong shape for a `{}` attribute",
                        descriptor.name(),
                        descriptor.ty().keyword()
                    ))
                    .with_code(ErrorCode::E501)
                    .with_label(location, format!("found {}", live_shape(&live_value))),
                );
                None
            }
        }
    }

    fn sync_nested(
        &mut self,
        descriptor: &AttributeDescriptor,
        object: &dyn LiveObject,
        previous: Option<&SerializedRecord>,
        location: &Location,
    ) -> Option<SerializedRecord> {
        let type_name = object.type_name();
        if !descriptor.accepts(type_name, self.registry) {
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "`{type_name}` is not accepted by nested attribute `{}`",
                    descriptor.name()
                ))
                .with_code(ErrorCode::E301)
                .with_label(location.clone(), "live object skipped"),
            );
            return None;
        }
        if self.registry.lookup(type_name).is_none() {
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "nested object type `{type_name}` has no registered attributes"
                ))
                .with_code(ErrorCode::E302)
                .with_label(location.clone(), "live object skipped"),
            );
            return None;
        }

        let mut record = match previous.filter(|record| record.type_name() == type_name) {
            Some(record) => record.clone(),
            None => self
                .registry
                .create_empty_record(type_name, AssetId::generate()),
        };
        self.sync_live_object(object, &mut record);
        Some(record)
    }
}

fn live_shape(value: &LiveValue<'_>) -> &'static str {
    match value {
        LiveValue::Value(value) => value.kind(),
        LiveValue::Object(_) => "a nested object",
        LiveValue::Objects(_) => "a list of nested objects",
    }
}
