//! Veneer Attribute Tables
//!
//! Frozen, thread-safe overlays of custom attributes for types, members and
//! parameters. Tables are collected with [`AttributeTableBuilder`], frozen
//! into an [`AttributeTable`] and queried through [`CustomAttributeTable`].
//!
//! Lookups never fail: an entity without an overlay yields an empty slice.

#![warn(missing_docs)]

pub mod builder;
pub mod metadata;
pub mod table;

pub use builder::AttributeTableBuilder;
pub use metadata::{MethodMetadata, TypeMetadata};
pub use table::{AttributeTable, CustomAttributeTable};
