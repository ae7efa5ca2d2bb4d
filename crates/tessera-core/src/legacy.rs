//! Backward-compatible handling of historical attribute spellings.
//!
//! A descriptor set may carry a [`LegacyAttributeHandler`]. It runs before the
//! generic descriptor loop, writes the attributes it understands and marks
//! them handled so the loop does not write them a second time.

use std::{collections::HashSet, fmt};

use crate::{
    bag::AttributeBag, coercion::CoercionError, coercion::TypeCoercion, record::SerializedRecord,
    registry::DescriptorSet, registry::TypeCatalog,
};

/// Everything a legacy handler may read.
pub struct LegacyInput<'a> {
    pub bag: &'a AttributeBag<'a>,
    pub descriptors: &'a DescriptorSet,
    pub coercion: &'a dyn TypeCoercion,
    pub catalog: &'a dyn TypeCatalog,
}

/// Consumes legacy attributes before generic serialization.
pub trait LegacyAttributeHandler: fmt::Debug + Send + Sync {
    /// Write recognized attributes into `record` and add their descriptor
    /// names to `handled`.
    ///
    /// # Errors
    ///
    /// Returns the coercion error of the first attribute that could not be
    /// converted. Attributes written before the failure stay written.
    fn handle(
        &self,
        input: &LegacyInput<'_>,
        record: &mut SerializedRecord,
        handled: &mut HashSet<String>,
    ) -> Result<(), CoercionError>;
}

/// One composite attribute assembled from several historical parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeAttribute {
    pub target: String,
    pub parts: Vec<String>,
    pub separator: String,
}

impl CompositeAttribute {
    pub fn new(
        target: impl Into<String>,
        parts: impl IntoIterator<Item = impl Into<String>>,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            parts: parts.into_iter().map(Into::into).collect(),
            separator: separator.into(),
        }
    }
}

/// Folds attributes that older markup split across several primitive fields
/// into the single composite attribute newer schemas declare.
///
/// A composite is only assembled when the markup does not already use the
/// composite spelling; parts that are absent are skipped.
#[derive(Debug, Clone, Default)]
pub struct CompositeAttributeHandler {
    composites: Vec<CompositeAttribute>,
}

impl CompositeAttributeHandler {
    pub fn new(composites: Vec<CompositeAttribute>) -> Self {
        Self { composites }
    }

    pub fn composites(&self) -> &[CompositeAttribute] {
        &self.composites
    }
}

impl LegacyAttributeHandler for CompositeAttributeHandler {
    fn handle(
        &self,
        input: &LegacyInput<'_>,
        record: &mut SerializedRecord,
        handled: &mut HashSet<String>,
    ) -> Result<(), CoercionError> {
        for composite in &self.composites {
            if input.bag.contains(&composite.target) {
                continue;
            }
            let Some(descriptor) = input.descriptors.get(&composite.target) else {
                continue;
            };
            let present: Vec<&str> = composite
                .parts
                .iter()
                .filter_map(|part| input.bag.get(part))
                .collect();
            if present.is_empty() {
                continue;
            }

            let raw = present.join(&composite.separator);
            let value = input.coercion.to_value(descriptor.ty(), &raw, input.catalog)?;
            record.set(descriptor.name(), value);
            handled.insert(composite.target.clone());
        }
        Ok(())
    }
}
