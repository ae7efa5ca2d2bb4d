//! Per-instance override resolution across nested templates.
//!
//! A template instance may override attributes of named elements inside the
//! document it instantiates. Overrides travel down: when the instantiated
//! document itself instantiates further templates, the accumulated
//! [`OverrideRange`] is passed along so an outer instance can reach elements
//! at any depth.
//!
//! Precedence is fixed: contexts inherited from an enclosing instantiation
//! come before the local one, and for each attribute the first override
//! found walking the range wins. The override closest to the instantiation
//! root is authoritative.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace};

use tessera_core::{
    asset::{AssetId, AttributeOverride, SerializedDataOverrides, TemplateAsset},
    document::Document,
};

use super::{Scope, Serializer};
use crate::error::{Diagnostic, ErrorCode, Location};

/// The overrides one template instance declares for one named element.
#[derive(Debug, Clone)]
pub struct ElementOverrides<'t> {
    element_name: &'t str,
    attributes: Vec<&'t AttributeOverride>,
}

impl<'t> ElementOverrides<'t> {
    pub fn element_name(&self) -> &'t str {
        self.element_name
    }

    pub fn attributes(&self) -> &[&'t AttributeOverride] {
        &self.attributes
    }
}

/// The local overrides of one template instance.
#[derive(Debug, Clone)]
pub struct OverrideContext<'t> {
    source: &'t TemplateAsset,
    document: &'t str,
    elements: Vec<ElementOverrides<'t>>,
}

impl<'t> OverrideContext<'t> {
    /// Group the overrides of `source`, which lives in `document`, by
    /// element name in declaration order.
    pub fn from_template(document: &'t str, source: &'t TemplateAsset) -> Self {
        let mut grouped: IndexMap<&'t str, Vec<&'t AttributeOverride>> = IndexMap::new();
        for attribute_override in source.attribute_overrides() {
            grouped
                .entry(attribute_override.element_name.as_str())
                .or_default()
                .push(attribute_override);
        }
        Self {
            source,
            document,
            elements: grouped
                .into_iter()
                .map(|(element_name, attributes)| ElementOverrides {
                    element_name,
                    attributes,
                })
                .collect(),
        }
    }

    pub fn source(&self) -> &'t TemplateAsset {
        self.source
    }

    /// Key of the document `source` lives in.
    pub fn document_key(&self) -> &'t str {
        self.document
    }

    pub fn elements(&self) -> &[ElementOverrides<'t>] {
        &self.elements
    }

    pub fn element(&self, element_name: &str) -> Option<&ElementOverrides<'t>> {
        self.elements
            .iter()
            .find(|entry| entry.element_name == element_name)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Override contexts accumulated from the instantiation root downwards.
#[derive(Debug, Clone, Default)]
pub struct OverrideRange<'t> {
    contexts: Vec<OverrideContext<'t>>,
}

impl<'t> OverrideRange<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The inherited contexts followed by `local`.
    ///
    /// An empty local context is not added.
    pub fn inherit(inherited: Option<&Self>, local: OverrideContext<'t>) -> Self {
        let mut contexts = inherited
            .map(|range| range.contexts.clone())
            .unwrap_or_default();
        if !local.is_empty() {
            contexts.push(local);
        }
        Self { contexts }
    }

    pub fn contexts(&self) -> &[OverrideContext<'t>] {
        &self.contexts
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Returns `true` if any context overrides the element named
    /// `element_name`.
    pub fn overrides(&self, element_name: &str) -> bool {
        self.contexts
            .iter()
            .any(|context| context.element(element_name).is_some())
    }

    /// The effective raw value of every overridden attribute of
    /// `element_name`.
    ///
    /// Contexts are walked outermost first and the first value found for an
    /// attribute wins, also within one context. Attributes keep the order in
    /// which they were first seen.
    pub fn effective_attributes(&self, element_name: &str) -> IndexMap<&'t str, &'t str> {
        let mut effective = IndexMap::new();
        for entry in self
            .contexts
            .iter()
            .filter_map(|context| context.element(element_name))
        {
            for attribute in &entry.attributes {
                effective
                    .entry(attribute.attribute_name.as_str())
                    .or_insert(attribute.value.as_str());
            }
        }
        effective
    }
}

/// Pass-local state of one top-level template expansion.
struct Expansion<'d> {
    /// Keys of the documents being expanded, outermost first.
    chain: Vec<&'d str>,
    /// Names of the elements some override matched.
    matched: HashSet<&'d str>,
    /// Whether a branch was cut short by a dangling, cyclic or too deep
    /// reference.
    aborted: bool,
}

impl<'a> Serializer<'a> {
    /// Build the override records of `template`, which lives in `owner`.
    ///
    /// Records for elements of the instantiated document are keyed by
    /// element id; records produced inside nested templates are grouped
    /// under the nested template's id. The referenced documents are never
    /// modified.
    pub fn resolve_overrides<'d>(
        &mut self,
        owner: &'d Document,
        template: &'d TemplateAsset,
    ) -> SerializedDataOverrides
    where
        'a: 'd,
    {
        let mut expansion = Expansion {
            chain: vec![owner.key()],
            matched: HashSet::new(),
            aborted: false,
        };
        let resolved = self.resolve_level(owner, template, None, &mut expansion);

        if !expansion.aborted {
            self.report_unused_overrides(owner, template, &expansion.matched);
        }
        if !resolved.is_empty() {
            info!(
                document = owner.key(),
                template_id:% = template.id(),
                alias = template.template_alias(),
                records = resolved.total_records();
                "Template overrides resolved"
            );
        }
        resolved
    }

    fn resolve_level<'d>(
        &mut self,
        owner: &'d Document,
        template: &'d TemplateAsset,
        inherited: Option<&OverrideRange<'d>>,
        expansion: &mut Expansion<'d>,
    ) -> SerializedDataOverrides
    where
        'a: 'd,
    {
        let mut resolved = SerializedDataOverrides::new();
        if !template.has_attribute_overrides() && inherited.is_none_or(OverrideRange::is_empty) {
            trace!(template_id:% = template.id(); "No overrides in scope");
            return resolved;
        }

        let location = Location::element(owner.key(), template.id());
        let alias = template.template_alias();
        let library = self.library;
        let Some(referenced) = library.and_then(|library| library.resolve_template(owner, template))
        else {
            expansion.aborted = true;
            if self.config.report_dangling_templates {
                self.diagnostics.emit(
                    Diagnostic::warning(format!("template `{alias}` does not resolve to a loaded document"))
                        .with_code(ErrorCode::E400)
                        .with_label(location, "instantiated here")
                        .with_help("declare the alias in the document and load the document it names"),
                );
            }
            return resolved;
        };

        if let Some(start) = expansion
            .chain
            .iter()
            .position(|key| *key == referenced.key())
        {
            expansion.aborted = true;
            self.diagnostics.emit(
                Diagnostic::error(format!(
                    "template `{alias}` instantiates `{}`, which is already being expanded",
                    referenced.key()
                ))
                .with_code(ErrorCode::E401)
                .with_label(location, "cyclic instantiation")
                .with_secondary_label(
                    Location::document(expansion.chain[start]),
                    "expansion starts here",
                ),
            );
            return resolved;
        }
        if expansion.chain.len() > self.config.max_template_depth {
            expansion.aborted = true;
            self.diagnostics.emit(
                Diagnostic::error(format!(
                    "template nesting exceeds the maximum depth of {}",
                    self.config.max_template_depth
                ))
                .with_code(ErrorCode::E402)
                .with_label(location, "not expanded"),
            );
            return resolved;
        }

        let range = OverrideRange::inherit(inherited, OverrideContext::from_template(owner.key(), template));
        debug!(
            alias,
            document = referenced.key(),
            contexts = range.len(),
            depth = expansion.chain.len();
            "Expanding template"
        );
        expansion.chain.push(referenced.key());

        let owners = Self::overridden_object_owners(referenced, &range, expansion);
        for element in referenced.elements().iter().skip(1) {
            let named = element.name().filter(|name| range.overrides(name));
            if let Some(name) = named {
                expansion.matched.insert(name);
            } else if !owners.contains(&element.id()) {
                continue;
            }

            let scope = Scope::document(referenced).with_overrides(&range);
            let Some(record) = self.serialize_element(element, scope) else {
                continue;
            };
            trace!(element_id:% = element.id(); "Override record built");
            resolved.insert_record(element.id(), record);
        }

        for nested in referenced.templates() {
            let nested_resolved = self.resolve_level(referenced, nested, Some(&range), expansion);
            if !nested_resolved.is_empty() {
                resolved.insert_nested(nested.id(), nested_resolved);
            }
        }

        expansion.chain.pop();
        resolved
    }

    /// Elements owning an overridden named nested object.
    ///
    /// The nested object is overridden through a fresh record of its owner.
    /// Objects without an owning element stay unmatched.
    fn overridden_object_owners<'d>(
        referenced: &'d Document,
        range: &OverrideRange<'_>,
        expansion: &mut Expansion<'d>,
    ) -> HashSet<AssetId> {
        let mut owners = HashSet::new();
        for object in referenced.objects() {
            let Some(name) = object.name().filter(|name| range.overrides(name)) else {
                continue;
            };
            match referenced.owning_element(object.id()) {
                Some(owner) if owner != AssetId::ROOT => {
                    expansion.matched.insert(name);
                    owners.insert(owner);
                }
                _ => debug!(object = name; "Overridden nested object has no owning element"),
            }
        }
        owners
    }

    fn report_unused_overrides(
        &mut self,
        owner: &Document,
        template: &TemplateAsset,
        matched: &HashSet<&str>,
    ) {
        let unused: IndexSet<&str> = template
            .attribute_overrides()
            .iter()
            .map(|attribute_override| attribute_override.element_name.as_str())
            .filter(|element_name| !matched.contains(element_name))
            .collect();
        for element_name in unused {
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "override for `{element_name}` matches no named element of template `{}`",
                    template.template_alias()
                ))
                .with_code(ErrorCode::E403)
                .with_label(Location::element(owner.key(), template.id()), "override declared here"),
            );
        }
    }
}
