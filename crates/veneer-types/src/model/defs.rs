//! Arena records backing the in-memory universe

use crate::attribute::AttributeRef;
use crate::handle::{AssemblyVersion, MemberKind, TypeHandle, TypeKind};

use super::{MemberIdx, MethodIdx};

#[derive(Debug, Clone)]
pub(crate) struct AssemblyDef {
    pub name: String,
    pub version: AssemblyVersion,
    pub culture: Option<String>,
    pub attributes: Vec<AttributeRef>,
    /// Every type defined in the assembly, nested types included
    pub types: Vec<u32>,
    pub entry_point: Option<MethodIdx>,
    pub satellites: Vec<u32>,
}

#[derive(Debug, Clone)]
pub(crate) struct TypeDef {
    pub name: String,
    pub namespace: Option<String>,
    pub kind: TypeKind,
    pub is_public: bool,
    pub assembly: u32,
    /// Enclosing type of a nested type or owner of a generic type parameter
    pub declaring: Option<u32>,
    /// Owner of a generic method parameter
    pub declaring_method: Option<MethodIdx>,
    pub base: Option<TypeHandle>,
    pub interfaces: Vec<TypeHandle>,
    pub generic_parameters: Vec<u32>,
    pub generic_position: Option<usize>,
    pub constraints: Vec<TypeHandle>,
    pub enum_underlying: Option<TypeHandle>,
    pub members: Vec<MemberDef>,
    pub nested: Vec<u32>,
    pub attributes: Vec<AttributeRef>,
}

impl TypeDef {
    pub fn new(name: &str, namespace: Option<String>, kind: TypeKind, assembly: u32) -> Self {
        TypeDef {
            name: name.to_string(),
            namespace,
            kind,
            is_public: true,
            assembly,
            declaring: None,
            declaring_method: None,
            base: None,
            interfaces: Vec::new(),
            generic_parameters: Vec::new(),
            generic_position: None,
            constraints: Vec::new(),
            enum_underlying: None,
            members: Vec::new(),
            nested: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ParamDef {
    pub name: String,
    pub param_type: TypeHandle,
    pub attributes: Vec<AttributeRef>,
}

#[derive(Debug, Clone)]
pub(crate) struct MethodDef {
    pub parameters: Vec<ParamDef>,
    pub return_type: Option<TypeHandle>,
    pub return_attributes: Vec<AttributeRef>,
    pub generic_parameters: Vec<u32>,
    pub is_virtual: bool,
    pub overrides: Option<MethodIdx>,
}

#[derive(Debug, Clone)]
pub(crate) enum MemberBody {
    Field {
        field_type: TypeHandle,
    },
    Property {
        property_type: TypeHandle,
        getter: Option<u32>,
        setter: Option<u32>,
        index_parameters: Vec<ParamDef>,
    },
    Method(MethodDef),
    Constructor(MethodDef),
    Event {
        handler_type: Option<TypeHandle>,
        add: Option<u32>,
        remove: Option<u32>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct MemberDef {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub attributes: Vec<AttributeRef>,
    pub body: MemberBody,
}

impl MemberDef {
    pub fn kind(&self) -> MemberKind {
        match self.body {
            MemberBody::Field { .. } => MemberKind::Field,
            MemberBody::Property { .. } => MemberKind::Property,
            MemberBody::Method(_) => MemberKind::Method,
            MemberBody::Constructor(_) => MemberKind::Constructor,
            MemberBody::Event { .. } => MemberKind::Event,
        }
    }

    pub fn method(&self) -> Option<&MethodDef> {
        match &self.body {
            MemberBody::Method(method) | MemberBody::Constructor(method) => Some(method),
            _ => None,
        }
    }

    pub fn method_mut(&mut self) -> Option<&mut MethodDef> {
        match &mut self.body {
            MemberBody::Method(method) | MemberBody::Constructor(method) => Some(method),
            _ => None,
        }
    }

    /// Key used to detect members hidden by a more derived declaration:
    /// name for fields, properties and events, name plus parameter types
    /// and generic arity for methods
    pub fn hiding_key(&self) -> (MemberKind, &str, Vec<&TypeHandle>, usize) {
        match self.method() {
            Some(method) => (
                self.kind(),
                self.name.as_str(),
                method.parameters.iter().map(|p| &p.param_type).collect(),
                method.generic_parameters.len(),
            ),
            None => (self.kind(), self.name.as_str(), Vec::new(), 0),
        }
    }
}

/// Member slot inside the arena, for records that point at members
impl MemberIdx {
    pub(crate) fn slot(self) -> (u32, u32) {
        (self.ty.0.index, self.index)
    }
}
