//! Diagnostics reported by a serialization pass.
//!
//! Nothing in a pass is fatal: a failing attribute keeps its default, a
//! failing template branch produces no override records. Every such recovery
//! is reported as a [`Diagnostic`] so hosts can surface it.
//!
//! # Example
//!
//! ```
//! # use tessera_core::asset::AssetId;
//! # use tessera_serializer::error::{Diagnostic, ErrorCode, Location};
//!
//! let diag = Diagnostic::warning("multiple `Column` candidates for `columns`")
//!     .with_code(ErrorCode::E300)
//!     .with_label(Location::element("main", AssetId::new(4)), "this one is used")
//!     .with_secondary_label(Location::element("main", AssetId::new(5)), "ignored")
//!     .with_help("declare a root name for the attribute or remove the extra object");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod report;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use label::{Label, Location};
pub use report::SerializationReport;
