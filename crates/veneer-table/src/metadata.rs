//! Per-type and per-method overlay bundles

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use veneer_types::{AttributeRef, MemberKey, MethodKey};

/// Shared empty bundle returned for types without an overlay
static EMPTY: Lazy<TypeMetadata> = Lazy::new(TypeMetadata::default);

/// Overlay of one method or constructor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodMetadata {
    method_attributes: Vec<AttributeRef>,
    return_attributes: Vec<AttributeRef>,
    /// One list per declared parameter, indexed by position
    parameter_attributes: Vec<Vec<AttributeRef>>,
}

impl MethodMetadata {
    /// Empty overlay for a method declaring `parameter_count` parameters
    pub fn new(parameter_count: usize) -> Self {
        MethodMetadata {
            method_attributes: Vec::new(),
            return_attributes: Vec::new(),
            parameter_attributes: vec![Vec::new(); parameter_count],
        }
    }

    /// Attributes of the method itself
    pub fn method_attributes(&self) -> &[AttributeRef] {
        &self.method_attributes
    }

    /// Attributes of the return value
    pub fn return_parameter_attributes(&self) -> &[AttributeRef] {
        &self.return_attributes
    }

    /// Attributes of the parameter at `position`; -1 addresses the return
    /// value and positions past the declared count are empty
    pub fn parameter_attributes(&self, position: i32) -> &[AttributeRef] {
        if position == -1 {
            return &self.return_attributes;
        }
        usize::try_from(position)
            .ok()
            .and_then(|position| self.parameter_attributes.get(position))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of declared parameters
    pub fn parameter_count(&self) -> usize {
        self.parameter_attributes.len()
    }

    pub(crate) fn method_attributes_mut(&mut self) -> &mut Vec<AttributeRef> {
        &mut self.method_attributes
    }

    pub(crate) fn return_attributes_mut(&mut self) -> &mut Vec<AttributeRef> {
        &mut self.return_attributes
    }

    pub(crate) fn parameter_attributes_mut(&mut self, position: usize) -> Option<&mut Vec<AttributeRef>> {
        self.parameter_attributes.get_mut(position)
    }
}

/// Overlay of one type: the type's own attributes plus those of its
/// fields, properties, events, methods and constructors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMetadata {
    type_attributes: Vec<AttributeRef>,
    member_attributes: FxHashMap<MemberKey, Vec<AttributeRef>>,
    method_attributes: FxHashMap<MethodKey, MethodMetadata>,
}

impl TypeMetadata {
    /// The shared empty bundle
    pub fn empty() -> &'static TypeMetadata {
        &EMPTY
    }

    /// Check if the bundle carries no attributes at all
    pub fn is_empty(&self) -> bool {
        self.type_attributes.is_empty()
            && self.member_attributes.is_empty()
            && self.method_attributes.is_empty()
    }

    /// Attributes of the type itself
    pub fn type_attributes(&self) -> &[AttributeRef] {
        &self.type_attributes
    }

    /// Attributes of a field, property or event
    pub fn member_attributes(&self, key: &MemberKey) -> &[AttributeRef] {
        self.member_attributes
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Overlay of a method or constructor
    pub fn method(&self, key: &MethodKey) -> Option<&MethodMetadata> {
        self.method_attributes.get(key)
    }

    /// Keys of every field, property and event with an overlay
    pub fn member_keys(&self) -> impl Iterator<Item = &MemberKey> {
        self.member_attributes.keys()
    }

    /// Keys of every method and constructor with an overlay
    pub fn method_keys(&self) -> impl Iterator<Item = &MethodKey> {
        self.method_attributes.keys()
    }

    pub(crate) fn type_attributes_mut(&mut self) -> &mut Vec<AttributeRef> {
        &mut self.type_attributes
    }

    pub(crate) fn member_attributes_mut(&mut self, key: MemberKey) -> &mut Vec<AttributeRef> {
        self.member_attributes.entry(key).or_default()
    }

    pub(crate) fn method_mut(&mut self, key: MethodKey, parameter_count: usize) -> &mut MethodMetadata {
        self.method_attributes
            .entry(key)
            .or_insert_with(|| MethodMetadata::new(parameter_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_types::{Attribute, AttributeKind};

    fn attr(name: &str) -> AttributeRef {
        Attribute::new(AttributeKind::new(name)).into_ref()
    }

    #[test]
    fn test_parameter_indexing() {
        let mut method = MethodMetadata::new(2);
        method.parameter_attributes_mut(0).unwrap().push(attr("X"));
        method.parameter_attributes_mut(1).unwrap().push(attr("Y"));
        method.return_attributes_mut().push(attr("R"));

        assert_eq!(method.parameter_attributes(0)[0].kind().name(), "X");
        assert_eq!(method.parameter_attributes(1)[0].kind().name(), "Y");
        assert_eq!(method.parameter_attributes(-1)[0].kind().name(), "R");
        assert!(method.parameter_attributes(2).is_empty());
        assert!(method.parameter_attributes(-7).is_empty());
        assert!(method.parameter_attributes_mut(2).is_none());
    }

    #[test]
    fn test_empty_singleton() {
        let a = TypeMetadata::empty();
        let b = TypeMetadata::empty();
        assert!(std::ptr::eq(a, b));
        assert!(a.is_empty());
        assert!(a.member_attributes(&MemberKey::new(None, "X", veneer_types::MemberKind::Field)).is_empty());
    }
}
