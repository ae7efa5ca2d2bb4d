//! Conversion between raw attribute strings and typed values.

use thiserror::Error;

use crate::{descriptor::AttributeType, identifier::Id, registry::TypeCatalog, value::Value};

/// Errors raised by a [`TypeCoercion`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("`{raw}` is not a valid {expected}")]
    Invalid { expected: &'static str, raw: String },

    #[error("`{raw}` is not a variant of `{type_name}`")]
    UnknownVariant { type_name: Id, raw: String },

    #[error("`{0}` is not a registered type")]
    UnknownType(String),

    #[error("{found} value cannot be written as {expected}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0} attributes are not stored as text")]
    Unsupported(&'static str),
}

/// Raw string ⇄ typed value conversion for a declared attribute type.
pub trait TypeCoercion {
    /// Convert `raw` to a value of type `ty`.
    fn to_value(
        &self,
        ty: &AttributeType,
        raw: &str,
        catalog: &dyn TypeCatalog,
    ) -> Result<Value, CoercionError>;

    /// Convert `value` back to its raw markup form.
    fn to_raw(
        &self,
        ty: &AttributeType,
        value: &Value,
        catalog: &dyn TypeCatalog,
    ) -> Result<String, CoercionError>;
}

/// Coercion for the built-in attribute kinds.
///
/// - `bool`: `true`/`false`, case-insensitive
/// - `int`, `float`: standard Rust number syntax, surrounding whitespace ignored
/// - `enum`: exact variant, falling back to a case-insensitive match
/// - `type`: a registered type name
/// - `asset`: any path; an empty value clears the reference
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCoercion;

impl TypeCoercion for StandardCoercion {
    fn to_value(
        &self,
        ty: &AttributeType,
        raw: &str,
        catalog: &dyn TypeCatalog,
    ) -> Result<Value, CoercionError> {
        let invalid = |expected| CoercionError::Invalid {
            expected,
            raw: raw.to_string(),
        };
        let trimmed = raw.trim();

        match ty {
            AttributeType::Bool => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(invalid("bool"))
                }
            }
            AttributeType::Int => trimmed
                .parse()
                .map(Value::Int)
                .map_err(|_| invalid("int")),
            AttributeType::Float => trimmed
                .parse()
                .map(Value::Float)
                .map_err(|_| invalid("float")),
            AttributeType::String => Ok(Value::Text(raw.to_string())),
            AttributeType::Enum {
                type_name,
                variants,
            } => variants
                .iter()
                .find(|variant| *variant == trimmed)
                .or_else(|| {
                    variants
                        .iter()
                        .find(|variant| variant.eq_ignore_ascii_case(trimmed))
                })
                .map(|variant| Value::Enum(variant.clone()))
                .ok_or_else(|| CoercionError::UnknownVariant {
                    type_name: *type_name,
                    raw: raw.to_string(),
                }),
            AttributeType::Type { .. } => {
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                let id = Id::new(trimmed);
                catalog
                    .type_info(id)
                    .map(|_| Value::TypeRef(id))
                    .ok_or_else(|| CoercionError::UnknownType(trimmed.to_string()))
            }
            AttributeType::AssetRef { .. } => {
                if trimmed.is_empty() {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Asset(trimmed.to_string()))
                }
            }
            AttributeType::Nested { .. } | AttributeType::NestedList { .. } => {
                Err(CoercionError::Unsupported(ty.keyword()))
            }
        }
    }

    fn to_raw(
        &self,
        ty: &AttributeType,
        value: &Value,
        _catalog: &dyn TypeCatalog,
    ) -> Result<String, CoercionError> {
        let mismatch = || CoercionError::Mismatch {
            expected: ty.keyword(),
            found: value.kind(),
        };

        match (ty, value) {
            (AttributeType::Nested { .. } | AttributeType::NestedList { .. }, _) => {
                Err(CoercionError::Unsupported(ty.keyword()))
            }
            (AttributeType::Type { .. } | AttributeType::AssetRef { .. }, Value::Null) => {
                Ok(String::new())
            }
            (AttributeType::Bool, Value::Bool(flag)) => Ok(flag.to_string()),
            (AttributeType::Int, Value::Int(number)) => Ok(number.to_string()),
            (AttributeType::Float, Value::Float(number)) => Ok(number.to_string()),
            (AttributeType::String, Value::Text(text))
            | (AttributeType::Enum { .. }, Value::Enum(text))
            | (AttributeType::AssetRef { .. }, Value::Asset(text))
            | (AttributeType::Type { .. }, Value::Text(text)) => Ok(text.clone()),
            (AttributeType::Type { .. }, Value::TypeRef(id)) => Ok(id.to_string()),
            _ => Err(mismatch()),
        }
    }
}
