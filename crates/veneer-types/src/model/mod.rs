//! In-memory type universe
//!
//! An immutable arena of assemblies and type definitions that implements the
//! description traits. Definitions are addressed by [`DefId`]; every entity
//! handed out holds an `Arc` of the universe plus the handle it describes, so
//! descriptions are cheap to create and compare by identity.
//!
//! ```text
//! UniverseBuilder ──build()──> Arc<Universe>
//!                                   │
//!              ┌────────────────────┼──────────────────────┐
//!         ModelAssembly         ModelType          ModelField / ModelMethod / ...
//!        (universe, index)  (universe, handle)   (universe, declaring, index, reflected)
//! ```

mod builder;
mod defs;
mod members;
mod types;

pub use builder::{UniverseBuilder, CONSTRUCTOR_NAME};
pub use members::{ModelEvent, ModelField, ModelMethod, ModelParameter, ModelProperty};
pub use types::{ModelAssembly, ModelType};

use std::fmt;
use std::sync::Arc;

use crate::describe::{
    AssemblyRef, EventRef, FieldRef, MemberRef, MethodRef, PropertyRef, TypeRef,
};
use crate::handle::{AssemblyHandle, DefId, TypeHandle};

use defs::{AssemblyDef, MemberDef, TypeDef};
use members::MemberCursor;

/// Assembly slot in a universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssemblyIdx(pub(crate) DefId);

impl AssemblyIdx {
    /// Structural handle
    pub fn handle(self) -> AssemblyHandle {
        AssemblyHandle(self.0)
    }
}

/// Type definition slot in a universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeIdx(pub(crate) DefId);

impl TypeIdx {
    /// Definition id
    pub fn id(self) -> DefId {
        self.0
    }

    /// Handle of the defined type
    pub fn handle(self) -> TypeHandle {
        TypeHandle::Defined(self.0)
    }

    /// Handle of an instantiation of this generic type definition
    pub fn instantiate(self, arguments: Vec<TypeHandle>) -> TypeHandle {
        TypeHandle::Generic {
            definition: self.0,
            arguments,
        }
    }

    /// Handle of a single-dimensional vector of this type
    pub fn vector(self) -> TypeHandle {
        TypeHandle::Array {
            element: Box::new(self.handle()),
            rank: None,
        }
    }
}

impl From<TypeIdx> for TypeHandle {
    fn from(idx: TypeIdx) -> Self {
        idx.handle()
    }
}

/// Member slot of any category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberIdx {
    pub(crate) ty: TypeIdx,
    pub(crate) index: u32,
}

impl MemberIdx {
    /// Declaring type
    pub fn declaring(self) -> TypeIdx {
        self.ty
    }
}

macro_rules! member_idx {
    ($($name:ident => $doc:literal),* $(,)?) => {
        $(
            #[doc = $doc]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(pub(crate) MemberIdx);

            impl $name {
                /// Declaring type
                pub fn declaring(self) -> TypeIdx {
                    self.0.ty
                }
            }

            impl From<$name> for MemberIdx {
                fn from(idx: $name) -> Self {
                    idx.0
                }
            }
        )*
    };
}

member_idx!(
    FieldIdx => "Field slot",
    PropertyIdx => "Property slot",
    MethodIdx => "Method or constructor slot",
    EventIdx => "Event slot",
);

/// Frozen arena of assemblies and types
pub struct Universe {
    id: u32,
    assemblies: Vec<AssemblyDef>,
    types: Vec<TypeDef>,
}

impl fmt::Debug for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Universe")
            .field("id", &self.id)
            .field("assemblies", &self.assemblies.len())
            .field("types", &self.types.len())
            .finish()
    }
}

impl Universe {
    /// Universe id, shared by every [`DefId`] it hands out
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of type definitions
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    fn owns(&self, id: DefId) -> bool {
        id.universe == self.id
    }

    /// Description of a type definition
    pub fn ty(self: &Arc<Self>, idx: TypeIdx) -> Option<TypeRef> {
        self.resolve(&idx.handle())
    }

    /// Description of any type handle whose definitions live here
    pub fn resolve(self: &Arc<Self>, handle: &TypeHandle) -> Option<TypeRef> {
        if !self.handle_is_valid(handle) {
            return None;
        }
        Some(self.type_ref(handle.clone()))
    }

    /// Description of an assembly
    pub fn assembly(self: &Arc<Self>, idx: AssemblyIdx) -> Option<AssemblyRef> {
        (self.owns(idx.0) && (idx.0.index as usize) < self.assemblies.len())
            .then(|| self.assembly_ref(idx.0.index))
    }

    /// Every assembly, satellites included
    pub fn assemblies(self: &Arc<Self>) -> Vec<AssemblyRef> {
        (0..self.assemblies.len() as u32)
            .map(|index| self.assembly_ref(index))
            .collect()
    }

    /// Type by namespace-qualified name across all assemblies
    pub fn find_type(self: &Arc<Self>, full_name: &str) -> Option<TypeRef> {
        self.assemblies
            .iter()
            .flat_map(|assembly| assembly.types.iter())
            .map(|&index| self.type_ref(TypeHandle::Defined(DefId::new(self.id, index))))
            .find(|ty| ty.full_name() == full_name)
    }

    /// Description of a field as seen from its declaring type
    pub fn field(self: &Arc<Self>, idx: FieldIdx) -> Option<FieldRef> {
        self.cursor(idx.0).map(|cursor| cursor.field())
    }

    /// Description of a property as seen from its declaring type
    pub fn property(self: &Arc<Self>, idx: PropertyIdx) -> Option<PropertyRef> {
        self.cursor(idx.0).map(|cursor| cursor.property())
    }

    /// Description of a method or constructor as seen from its declaring type
    pub fn method(self: &Arc<Self>, idx: MethodIdx) -> Option<MethodRef> {
        self.cursor(idx.0).map(|cursor| cursor.method())
    }

    /// Description of an event as seen from its declaring type
    pub fn event(self: &Arc<Self>, idx: EventIdx) -> Option<EventRef> {
        self.cursor(idx.0).map(|cursor| cursor.event())
    }

    /// Description of a member of any category
    pub fn member(self: &Arc<Self>, idx: MemberIdx) -> Option<MemberRef> {
        self.cursor(idx).map(|cursor| cursor.into_member_ref())
    }

    // ------------------------------------------------------------------------
    // Internal access
    // ------------------------------------------------------------------------

    fn handle_is_valid(&self, handle: &TypeHandle) -> bool {
        handle_in_range(self.id, self.types.len(), handle)
    }

    fn cursor(self: &Arc<Self>, idx: MemberIdx) -> Option<MemberCursor> {
        let id = idx.ty.0;
        if !self.owns(id) {
            return None;
        }
        let def = self.types.get(id.index as usize)?;
        def.members.get(idx.index as usize)?;
        Some(MemberCursor::new(
            Arc::clone(self),
            id.index,
            idx.index,
            TypeHandle::Defined(id),
        ))
    }

    pub(crate) fn type_ref(self: &Arc<Self>, handle: TypeHandle) -> TypeRef {
        Arc::new(ModelType::new(Arc::clone(self), handle))
    }

    pub(crate) fn assembly_ref(self: &Arc<Self>, index: u32) -> AssemblyRef {
        Arc::new(ModelAssembly::new(Arc::clone(self), index))
    }

    pub(crate) fn defined(&self, index: u32) -> TypeHandle {
        TypeHandle::Defined(DefId::new(self.id, index))
    }

    pub(crate) fn type_def(&self, index: u32) -> &TypeDef {
        &self.types[index as usize]
    }

    pub(crate) fn assembly_def(&self, index: u32) -> &AssemblyDef {
        &self.assemblies[index as usize]
    }

    pub(crate) fn member_def(&self, ty: u32, index: u32) -> &MemberDef {
        &self.type_def(ty).members[index as usize]
    }
}

/// Whether every definition a handle names lives in universe `id` with
/// `type_count` definitions
pub(crate) fn handle_in_range(id: u32, type_count: usize, handle: &TypeHandle) -> bool {
    match handle {
        TypeHandle::Defined(def) => def.universe == id && (def.index as usize) < type_count,
        TypeHandle::Generic {
            definition,
            arguments,
        } => {
            handle_in_range(id, type_count, &TypeHandle::Defined(*definition))
                && arguments
                    .iter()
                    .all(|arg| handle_in_range(id, type_count, arg))
        }
        TypeHandle::Array { element, .. }
        | TypeHandle::Pointer(element)
        | TypeHandle::ByRef(element) => handle_in_range(id, type_count, element),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{AssemblyVersion, TypeKind};

    #[test]
    fn test_foreign_handles_are_rejected() {
        let mut a = UniverseBuilder::new();
        let asm = a.add_assembly("A", AssemblyVersion::new(1, 0, 0, 0));
        let foo = a.add_type(asm, "Acme", "Foo", TypeKind::Class);
        let a = a.build().unwrap();

        let mut b = UniverseBuilder::new();
        let asm_b = b.add_assembly("B", AssemblyVersion::new(1, 0, 0, 0));
        b.add_type(asm_b, "Acme", "Bar", TypeKind::Class);
        let b = b.build().unwrap();

        assert!(a.ty(foo).is_some());
        assert!(b.ty(foo).is_none());
        assert!(b.resolve(&foo.vector()).is_none());
    }

    #[test]
    fn test_find_type() {
        let mut builder = UniverseBuilder::new();
        let asm = builder.add_assembly("A", AssemblyVersion::default());
        let outer = builder.add_type(asm, "Acme", "Outer", TypeKind::Class);
        builder.add_nested_type(outer, "Inner", TypeKind::Struct);
        let universe = builder.build().unwrap();

        let inner = universe.find_type("Acme.Outer+Inner").unwrap();
        assert_eq!(inner.name(), "Inner");
        assert_eq!(inner.declaring_type().unwrap().handle(), outer.handle());
        assert!(universe.find_type("Acme.Missing").is_none());
    }
}
