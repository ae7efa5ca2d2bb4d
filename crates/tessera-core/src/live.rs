//! Access to in-memory UI objects.
//!
//! The live object model is owned by the host. The serializer reads it
//! through [`LiveObject`], an opaque accessor table keyed by attribute name.

use thiserror::Error;

use crate::{identifier::Id, value::Value};

/// Errors raised while reading a live object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("`{type_name}` has no accessible member `{attribute}`")]
    MissingMember { type_name: Id, attribute: String },

    #[error("reading `{attribute}` on `{type_name}` failed: {reason}")]
    Failed {
        type_name: Id,
        attribute: String,
        reason: String,
    },
}

/// The current value of one live member.
#[derive(Debug)]
pub enum LiveValue<'a> {
    /// A primitive value.
    Value(Value),
    /// A single nested object, or `None` when unset.
    Object(Option<&'a dyn LiveObject>),
    /// An ordered list of nested objects.
    Objects(Vec<&'a dyn LiveObject>),
}

/// An in-memory object whose attributes can be read by name.
pub trait LiveObject: std::fmt::Debug {
    fn type_name(&self) -> Id;

    /// Read the member backing `attribute`.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessError`] when the member does not exist or cannot be
    /// read.
    fn read(&self, attribute: &str) -> Result<LiveValue<'_>, AccessError>;
}
