//! Tessera Core Types and Definitions
//!
//! This crate provides the data model shared by the Tessera serializer and its
//! hosts:
//!
//! - **Identifiers**: interned type names ([`identifier::Id`])
//! - **Assets**: parser output, [`asset::ElementAsset`], [`asset::TemplateAsset`],
//!   [`document::Document`]
//! - **Records**: [`record::SerializedRecord`] and [`value::Value`]
//! - **Schema**: [`descriptor::AttributeDescriptor`] and the
//!   [`registry::DescriptorRegistry`] / [`registry::TypeCatalog`] interfaces
//! - **Collaborators**: [`coercion::TypeCoercion`], [`live::LiveObject`],
//!   [`legacy::LegacyAttributeHandler`]

pub mod asset;
pub mod bag;
pub mod coercion;
pub mod descriptor;
pub mod document;
pub mod identifier;
pub mod legacy;
pub mod live;
pub mod record;
pub mod registry;
pub mod value;
