//! Nested-object extraction from a document's object table.

use indexmap::IndexMap;
use log::{debug, trace};

use tessera_core::{
    asset::{AssetId, ElementAsset, ObjectAsset},
    descriptor::AttributeDescriptor,
    identifier::Id,
    record::SerializedRecord,
    value::Value,
};

use super::{Scope, Serializer};
use crate::error::{Diagnostic, ErrorCode};

/// The objects a nested attribute is resolved from.
struct Candidates<'d> {
    objects: &'d [ObjectAsset],
    /// Whether the objects come from the attribute's own root group.
    explicit_root: bool,
}

impl Serializer<'_> {
    /// Resolve a nested-object attribute of the element `owner`.
    ///
    /// Candidates come from the group named by the descriptor's root name
    /// when the element has one, and from the element's direct nested
    /// objects otherwise. Only candidates whose type the descriptor accepts
    /// are serialized. List attributes take every match in document order;
    /// single attributes take the first and warn when several candidates
    /// share a concrete type.
    pub(super) fn extract_nested(
        &mut self,
        descriptor: &AttributeDescriptor,
        owner: Option<AssetId>,
        scope: Scope<'_>,
    ) -> Value {
        let (Some(document), Some(owner)) = (scope.current_document(), owner) else {
            return descriptor.default_value().clone();
        };
        let candidates = match descriptor
            .root_name()
            .and_then(|root| document.field_group(owner, root))
        {
            Some(objects) => Candidates {
                objects,
                explicit_root: true,
            },
            None => Candidates {
                objects: document.object_children(owner),
                explicit_root: false,
            },
        };

        let accepted = self.accepted_candidates(descriptor, &candidates, scope);
        trace!(
            attribute = descriptor.name(),
            candidates = candidates.objects.len(),
            accepted = accepted.len();
            "Nested candidates resolved"
        );

        if descriptor.is_list_valued() {
            let records = accepted
                .into_iter()
                .filter_map(|object| self.serialize_object(object, scope))
                .collect();
            return Value::List(records);
        }

        let Some(first) = accepted.first().copied() else {
            return descriptor.default_value().clone();
        };
        if !candidates.explicit_root && self.config.warn_on_ambiguous_nested {
            self.warn_ambiguous(descriptor, owner, &accepted, scope);
        }
        self.serialize_object(first, scope)
            .map(|record| Value::Record(Box::new(record)))
            .unwrap_or_else(|| descriptor.default_value().clone())
    }

    /// Objects among `candidates` whose type `descriptor` accepts.
    ///
    /// Members of an explicit root group that are rejected are reported; the
    /// direct children of an element are shared by all of its nested
    /// attributes, so rejecting one of them is expected.
    fn accepted_candidates<'d>(
        &mut self,
        descriptor: &AttributeDescriptor,
        candidates: &Candidates<'d>,
        scope: Scope<'_>,
    ) -> Vec<&'d ElementAsset> {
        let mut accepted = Vec::new();
        for object in candidates.objects.iter().filter_map(ObjectAsset::as_object) {
            if descriptor.accepts(object.type_name(), self.registry) {
                accepted.push(object);
            } else if candidates.explicit_root {
                let help = accepted_help(descriptor, self);
                self.diagnostics.emit(
                    Diagnostic::warning(format!(
                        "`{}` is not accepted by nested attribute `{}`",
                        object.type_name(),
                        descriptor.name()
                    ))
                    .with_code(ErrorCode::E301)
                    .with_label(scope.location(object.id()), "object ignored")
                    .with_help(help),
                );
            }
        }
        accepted
    }

    fn warn_ambiguous(
        &mut self,
        descriptor: &AttributeDescriptor,
        owner: AssetId,
        accepted: &[&ElementAsset],
        scope: Scope<'_>,
    ) {
        let mut by_type: IndexMap<Id, Vec<AssetId>> = IndexMap::new();
        for object in accepted {
            by_type.entry(object.type_name()).or_default().push(object.id());
        }
        let Some((type_name, ids)) = by_type.into_iter().find(|(_, ids)| ids.len() > 1) else {
            return;
        };

        let mut diagnostic = Diagnostic::warning(format!(
            "multiple `{type_name}` candidates for nested attribute `{}`, only the first is used",
            descriptor.name()
        ))
        .with_code(ErrorCode::E300)
        .with_label(
            scope.location(owner).with_attribute(descriptor.name()),
            "attribute resolved here",
        );
        for (index, id) in ids.into_iter().enumerate() {
            let message = if index == 0 { "used" } else { "ignored" };
            diagnostic = diagnostic.with_secondary_label(scope.location(id), message);
        }
        self.diagnostics.emit(diagnostic.with_help(
            "declare a root name for the attribute or remove the extra objects",
        ));
    }

    /// Serialize one nested object with its own descriptors.
    fn serialize_object(&mut self, object: &ElementAsset, scope: Scope<'_>) -> Option<SerializedRecord> {
        if self.object_chain.contains(&object.id()) {
            debug!(element_id:% = object.id(); "Nested object owns itself, skipped");
            return None;
        }
        let Some(set) = self.registry.lookup(object.type_name()) else {
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "nested object type `{}` has no registered attributes",
                    object.type_name()
                ))
                .with_code(ErrorCode::E302)
                .with_label(scope.location(object.id()), "object ignored"),
            );
            return None;
        };

        self.object_chain.push(object.id());
        let record = self.serialize(set, &scope.bag_for(object), scope);
        self.object_chain.pop();
        Some(record)
    }
}

fn accepted_help(descriptor: &AttributeDescriptor, serializer: &Serializer<'_>) -> String {
    let names: Vec<String> = descriptor
        .compute_accepted_types(serializer.registry)
        .iter()
        .map(ToString::to_string)
        .collect();
    format!("accepted types: {}", names.join(", "))
}
