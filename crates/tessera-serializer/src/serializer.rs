//! The serialization engine.
//!
//! A [`Serializer`] turns raw attribute bags into [`SerializedRecord`]s using
//! the descriptors of a [`DescriptorRegistry`]. It is created per pass,
//! collects the pass's diagnostics, and is consumed by [`Serializer::finish`].

mod live;
mod nested;
mod overrides;
mod records;

use std::collections::HashSet;

use log::{debug, trace};

use tessera_core::{
    asset::{AssetId, ElementAsset},
    bag::AttributeBag,
    coercion::TypeCoercion,
    descriptor::{AttributeDescriptor, AttributeType},
    document::{Document, DocumentLibrary},
    legacy::LegacyInput,
    record::SerializedRecord,
    registry::{DescriptorRegistry, DescriptorSet},
    value::Value,
};

use crate::{
    config::SerializeConfig,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, Location, SerializationReport},
};

pub use overrides::{ElementOverrides, OverrideContext, OverrideRange};
pub use records::{DocumentRecords, TemplateRecords};

/// Document key used in diagnostics for bags that belong to no document.
const DETACHED_DOCUMENT: &str = "<detached>";

/// Where a bag being serialized lives.
///
/// The document is needed to find nested objects; the override range is set
/// while the override resolver serializes elements of an instantiated
/// template, so named nested objects pick up their overrides too.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'s> {
    document: Option<&'s Document>,
    overrides: Option<&'s OverrideRange<'s>>,
}

impl<'s> Scope<'s> {
    /// A scope without a document. Nested-object attributes keep their
    /// defaults.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn document(document: &'s Document) -> Self {
        Self {
            document: Some(document),
            overrides: None,
        }
    }

    /// Stamp the scope with an accumulated override range.
    pub fn with_overrides(mut self, overrides: &'s OverrideRange<'s>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn current_document(&self) -> Option<&'s Document> {
        self.document
    }

    pub fn overrides(&self) -> Option<&'s OverrideRange<'s>> {
        self.overrides
    }

    fn document_key(&self) -> &'s str {
        self.document.map_or(DETACHED_DOCUMENT, Document::key)
    }

    fn location(&self, element: AssetId) -> Location {
        Location::element(self.document_key(), element)
    }

    /// The bag of `asset`, with this scope's overrides applied when the
    /// asset is named and overridden.
    fn bag_for<'b>(&self, asset: &'b ElementAsset) -> AttributeBag<'b> {
        let overridden = self
            .overrides
            .zip(asset.name())
            .filter(|(range, name)| range.overrides(name));
        match overridden {
            Some((range, name)) => AttributeBag::with_overrides(asset, range.effective_attributes(name)),
            None => AttributeBag::from_asset(asset),
        }
    }
}

/// Builds serialized records for one pass.
pub struct Serializer<'a> {
    registry: &'a dyn DescriptorRegistry,
    coercion: &'a dyn TypeCoercion,
    library: Option<&'a DocumentLibrary>,
    config: SerializeConfig,
    diagnostics: DiagnosticCollector,
    /// Nested objects currently being serialized, innermost last.
    object_chain: Vec<AssetId>,
}

impl<'a> Serializer<'a> {
    pub fn new(registry: &'a dyn DescriptorRegistry, coercion: &'a dyn TypeCoercion) -> Self {
        Self {
            registry,
            coercion,
            library: None,
            config: SerializeConfig::default(),
            diagnostics: DiagnosticCollector::new(),
            object_chain: Vec::new(),
        }
    }

    /// Resolve template aliases against `library`.
    ///
    /// Without a library every template reference is dangling.
    pub fn with_library(mut self, library: &'a DocumentLibrary) -> Self {
        self.library = Some(library);
        self
    }

    pub fn with_config(mut self, config: SerializeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SerializeConfig {
        &self.config
    }

    /// Finish the pass and return its diagnostics.
    pub fn finish(self) -> SerializationReport {
        self.diagnostics.finish()
    }

    // ============================================================================
    // Record Construction
    // ============================================================================

    /// Serialize `bag` with the descriptors of `set`.
    ///
    /// The record inherits the bag's asset id; a detached bag gets a freshly
    /// generated one. The legacy handler of `set`, if any, runs first and
    /// the attributes it marks handled are skipped by the descriptor loop.
    /// No attribute failure aborts the record: a failing attribute holds its
    /// default.
    pub fn serialize(
        &mut self,
        set: &DescriptorSet,
        bag: &AttributeBag<'_>,
        scope: Scope<'_>,
    ) -> SerializedRecord {
        let asset_id = bag.asset_id().unwrap_or_else(AssetId::generate);
        let mut record = self.registry.create_empty_record(set.type_name(), asset_id);
        let mut handled = HashSet::new();

        if let Some(handler) = set.legacy_handler() {
            let input = LegacyInput {
                bag,
                descriptors: set,
                coercion: self.coercion,
                catalog: self.registry,
            };
            if let Err(err) = handler.handle(&input, &mut record, &mut handled) {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "legacy attributes of `{}` could not be converted: {err}",
                        set.type_name()
                    ))
                    .with_code(ErrorCode::E101)
                    .with_label(scope.location(asset_id), "in this element"),
                );
            }
        }

        for descriptor in set.iter() {
            if handled.contains(descriptor.name()) {
                trace!(attribute = descriptor.name(); "Attribute consumed by legacy handler");
                continue;
            }

            let value = if descriptor.is_nested_object() {
                self.extract_nested(descriptor, bag.asset_id(), scope)
            } else {
                let value = descriptor.extract_from_bag(bag, self.coercion, self.registry);
                let location = scope.location(asset_id).with_attribute(descriptor.name());
                if bag.contains(descriptor.name()) {
                    self.check_restriction(descriptor, &value, &location);
                }
                self.check_type_constraint(descriptor, value, location)
            };
            trace!(attribute = descriptor.name(), value:%; "Attribute serialized");
            record.set(descriptor.name(), value);
        }

        record
    }

    /// Serialize `element` if its type is schema-managed.
    ///
    /// Returns `None` for unregistered types; they are not an error.
    pub fn serialize_element(
        &mut self,
        element: &ElementAsset,
        scope: Scope<'_>,
    ) -> Option<SerializedRecord> {
        let Some(set) = self.registry.lookup(element.type_name()) else {
            debug!(type_name:% = element.type_name(), element_id:% = element.id(); "Unmanaged element skipped");
            return None;
        };
        Some(self.serialize(set, &scope.bag_for(element), scope))
    }

    /// Validate a type-reference value against the declared base type.
    ///
    /// Accepted references are stored as their fully-qualified name. A
    /// reference that is not assignable to the base is dropped in favor of
    /// the default.
    fn check_type_constraint(
        &mut self,
        descriptor: &AttributeDescriptor,
        value: Value,
        location: Location,
    ) -> Value {
        let Value::TypeRef(type_name) = value else {
            return value;
        };
        if let AttributeType::Type { base: Some(base) } = descriptor.ty() {
            if !self.registry.is_assignable(type_name, *base) {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "`{type_name}` is not assignable to `{base}` required by `{}`",
                        descriptor.name()
                    ))
                    .with_code(ErrorCode::E200)
                    .with_label(location, "type reference declared here")
                    .with_help(format!("use `{base}` or a type derived from it")),
                );
                return stored_type_ref(descriptor.default_value().clone());
            }
        }
        stored_type_ref(Value::TypeRef(type_name))
    }

    fn check_restriction(
        &mut self,
        descriptor: &AttributeDescriptor,
        value: &Value,
        location: &Location,
    ) {
        let Some(restriction) = descriptor.restriction() else {
            return;
        };
        if !restriction.allows(value) {
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "value `{value}` of `{}` is outside its declared restriction",
                    descriptor.name()
                ))
                .with_code(ErrorCode::E100)
                .with_label(location.clone(), "value set here"),
            );
        }
    }
}

/// Type references are stored as their fully-qualified name.
fn stored_type_ref(value: Value) -> Value {
    match value {
        Value::TypeRef(type_name) => Value::Text(type_name.to_string()),
        other => other,
    }
}
