//! Veneer Type System
//!
//! Type-description capability traits, attribute values, identity keys and
//! an in-memory type universe for veneer.
//!
//! Every entity of a type-system graph (types, assemblies, members and
//! parameters) is described through a trait in [`describe`]. The
//! [`model`] module provides a concrete universe implementing those traits;
//! other hosts can implement them for their own metadata.

#![warn(missing_docs)]

pub mod attribute;
pub mod describe;
pub mod error;
pub mod flags;
pub mod handle;
pub mod keys;
pub mod model;
pub mod resolve;

pub use attribute::{matches_kind, Attribute, AttributeKind, AttributeRef, AttributeValue};
pub use describe::{
    AssemblyDescription, AssemblyRef, AttributeProvider, EventDescription, EventRef,
    FieldDescription, FieldRef, InterfaceMapping, MemberDescription, MemberRef, MethodDescription,
    MethodRef, ParameterDescription, ParameterRef, PropertyDescription, PropertyRef,
    TypeDescription, TypeRef,
};
pub use error::{MetaError, MetaResult};
pub use flags::{BindingFlags, MemberKinds};
pub use handle::{
    AssemblyHandle, AssemblyIdentity, AssemblyVersion, ContextId, ContextPath, DefId,
    MemberIdentity, MemberKind, ParameterIdentity, TypeHandle, TypeIdentity, TypeKind,
};
pub use keys::{MemberKey, MethodKey};
pub use model::{Universe, UniverseBuilder};
pub use resolve::{field_of, member_of, method_of, property_of, resolve_member, AccessExpr};
