//! Error codes for the Tessera diagnostic system.
//!
//! Error codes are organized by area:
//! - `E1xx` - Attribute values
//! - `E2xx` - Type constraints
//! - `E3xx` - Nested objects
//! - `E4xx` - Templates and overrides
//! - `E5xx` - Live object access

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Attribute Value Diagnostics (E1xx)
    // =========================================================================
    /// Restriction violated.
    ///
    /// A coerced value lies outside the descriptor's enumeration or numeric
    /// bounds. The value is kept; authoring tools should flag it.
    E100,

    /// Legacy attribute handler failed.
    ///
    /// The descriptor set's legacy handler could not convert a historical
    /// attribute. Attributes it did not mark handled are serialized normally.
    E101,

    // =========================================================================
    // Type Constraint Diagnostics (E2xx)
    // =========================================================================
    /// Type constraint violation.
    ///
    /// A type-reference attribute names a type that is not assignable to the
    /// attribute's declared base type. The attribute keeps its default.
    E200,

    // =========================================================================
    // Nested Object Diagnostics (E3xx)
    // =========================================================================
    /// Ambiguous nested object.
    ///
    /// A single-valued nested attribute has several candidates of the same
    /// concrete type. The first one in document order is used.
    E300,

    /// Nested type not accepted.
    ///
    /// A nested object's type is not in the attribute's accepted type set.
    E301,

    /// Unmanaged nested type.
    ///
    /// A nested object is accepted by its attribute but its type has no
    /// registered descriptors, so it cannot be serialized.
    E302,

    // =========================================================================
    // Template Diagnostics (E4xx)
    // =========================================================================
    /// Dangling template reference.
    ///
    /// A template alias is undeclared or points at a document that is not
    /// loaded. No override records are produced for it.
    E400,

    /// Cyclic template reference.
    ///
    /// A template instantiates a document that is already being expanded.
    E401,

    /// Template nesting too deep.
    ///
    /// Template instantiation exceeded the configured maximum depth.
    E402,

    /// Unused attribute override.
    ///
    /// An override names an element that does not exist, or has no name, in
    /// the instantiated template.
    E403,

    // =========================================================================
    // Live Object Diagnostics (E5xx)
    // =========================================================================
    /// Live member access failed.
    ///
    /// Reading an attribute from a live object failed. The record keeps its
    /// previous value.
    E500,

    /// Live value shape mismatch.
    ///
    /// A live member returned a value of the wrong shape for its descriptor,
    /// e.g. a primitive for a nested-object attribute.
    E501,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Attribute values
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            // Type constraints
            ErrorCode::E200 => "E200",
            // Nested objects
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            // Templates
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
            ErrorCode::E402 => "E402",
            ErrorCode::E403 => "E403",
            // Live objects
            ErrorCode::E500 => "E500",
            ErrorCode::E501 => "E501",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Attribute values
            ErrorCode::E100 => "restriction violated",
            ErrorCode::E101 => "legacy attribute handler failed",
            // Type constraints
            ErrorCode::E200 => "type constraint violation",
            // Nested objects
            ErrorCode::E300 => "ambiguous nested object",
            ErrorCode::E301 => "nested type not accepted",
            ErrorCode::E302 => "unmanaged nested type",
            // Templates
            ErrorCode::E400 => "dangling template reference",
            ErrorCode::E401 => "cyclic template reference",
            ErrorCode::E402 => "template nesting too deep",
            ErrorCode::E403 => "unused attribute override",
            // Live objects
            ErrorCode::E500 => "live member access failed",
            ErrorCode::E501 => "live value shape mismatch",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E300.to_string(), "E300");
        assert_eq!(ErrorCode::E401.to_string(), "E401");
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::E200.as_str(), "E200");
        assert_eq!(ErrorCode::E501.as_str(), "E501");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E300.description(), "ambiguous nested object");
        assert_eq!(ErrorCode::E400.description(), "dangling template reference");
        assert_eq!(ErrorCode::E401.description(), "cyclic template reference");
    }
}
