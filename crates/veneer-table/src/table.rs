//! Frozen attribute overlay
//!
//! An [`AttributeTable`] maps real types to the [`TypeMetadata`] registered
//! for them. Lookups are total: an entity that was never registered yields an
//! empty slice. Members are found through the metadata of their declaring
//! type, so every description of one declaration (including those reached
//! through derived types) lands on the same entry.

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::trace;
use veneer_types::{
    AttributeRef, MemberDescription, MemberKey, MemberRef, MethodDescription, MethodKey,
    ParameterDescription, TypeDescription, TypeHandle,
};

use crate::metadata::{MethodMetadata, TypeMetadata};

/// Source of overlay attributes for types, members and parameters
pub trait CustomAttributeTable: Send + Sync + fmt::Debug {
    /// Overlay attributes of a type
    fn type_attributes(&self, ty: &dyn TypeDescription) -> &[AttributeRef];

    /// Overlay attributes of a member
    ///
    /// Fields, properties and events are looked up by [`MemberKey`], methods
    /// and constructors by [`MethodKey`]. Nested types report the overlay of
    /// the type itself; custom members have none.
    fn member_attributes(&self, member: &MemberRef) -> &[AttributeRef];

    /// Overlay attributes of a method or constructor parameter, or of the
    /// return value at position -1
    fn parameter_attributes(&self, parameter: &dyn ParameterDescription) -> &[AttributeRef];
}

/// Immutable overlay keyed by type
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    metadata: FxHashMap<TypeHandle, TypeMetadata>,
}

impl AttributeTable {
    pub(crate) fn from_metadata(metadata: FxHashMap<TypeHandle, TypeMetadata>) -> Self {
        AttributeTable { metadata }
    }

    /// Table without any overlay
    pub fn empty() -> Self {
        Self::default()
    }

    /// Metadata registered for a type, the shared empty bundle if none
    pub fn metadata(&self, ty: &TypeHandle) -> &TypeMetadata {
        self.metadata.get(ty).unwrap_or_else(|| TypeMetadata::empty())
    }

    /// Number of types with an overlay
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// Check if no type has an overlay
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Handles of every type with an overlay
    pub fn types(&self) -> impl Iterator<Item = &TypeHandle> {
        self.metadata.keys()
    }

    fn declaring_metadata(&self, member: &dyn MemberDescription) -> &TypeMetadata {
        match member.declaring_type() {
            Some(declaring) => self.metadata(&declaring.handle()),
            None => TypeMetadata::empty(),
        }
    }

    fn method_metadata(&self, method: &dyn MethodDescription) -> Option<&MethodMetadata> {
        let key = MethodKey::of(method);
        let found = self.declaring_metadata(method).method(&key);
        trace!(method = %key, found = found.is_some(), "method overlay lookup");
        found
    }
}

impl CustomAttributeTable for AttributeTable {
    fn type_attributes(&self, ty: &dyn TypeDescription) -> &[AttributeRef] {
        self.metadata(&ty.handle()).type_attributes()
    }

    fn member_attributes(&self, member: &MemberRef) -> &[AttributeRef] {
        match member {
            MemberRef::Field(field) => {
                let key = MemberKey::of(field.as_ref());
                self.declaring_metadata(field.as_ref()).member_attributes(&key)
            }
            MemberRef::Property(property) => {
                let key = MemberKey::of(property.as_ref());
                self.declaring_metadata(property.as_ref()).member_attributes(&key)
            }
            MemberRef::Event(event) => {
                let key = MemberKey::of(event.as_ref());
                self.declaring_metadata(event.as_ref()).member_attributes(&key)
            }
            MemberRef::Method(method) | MemberRef::Constructor(method) => self
                .method_metadata(method.as_ref())
                .map(MethodMetadata::method_attributes)
                .unwrap_or_default(),
            MemberRef::NestedType(ty) => self.type_attributes(ty.as_ref()),
            MemberRef::Custom(_) => &[],
        }
    }

    fn parameter_attributes(&self, parameter: &dyn ParameterDescription) -> &[AttributeRef] {
        match parameter.member() {
            MemberRef::Method(method) | MemberRef::Constructor(method) => {
                match self.method_metadata(method.as_ref()) {
                    Some(metadata) => metadata.parameter_attributes(parameter.position()),
                    None => &[],
                }
            }
            _ => &[],
        }
    }
}
