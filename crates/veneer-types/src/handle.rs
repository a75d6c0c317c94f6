//! Structural handles and identities for type-system entities
//!
//! A handle names a declaration independently of the Rust object that
//! describes it: two descriptions of the same type produce equal handles.
//! Identities add the projection context that produced the description, so
//! a real type and its projection never compare equal while two projections
//! of the same type under one context always do.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Index of a definition inside one type universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId {
    /// Universe the definition belongs to
    pub universe: u32,
    /// Position of the definition in the universe's arena
    pub index: u32,
}

impl DefId {
    /// Create a definition id
    pub const fn new(universe: u32, index: u32) -> Self {
        DefId { universe, index }
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.universe, self.index)
    }
}

/// Structural handle of a type
///
/// Defined types are addressed by their arena slot; constructed types
/// (arrays, pointers, by-refs, generic instantiations) are addressed by
/// their shape, so constructing the same shape twice yields equal handles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHandle {
    /// Class, struct, interface, enum or generic parameter
    Defined(DefId),

    /// Array of `element`; `rank` is `None` for a single-dimensional
    /// zero-based vector and `Some(n)` for an explicit rank
    Array {
        /// Element type
        element: Box<TypeHandle>,
        /// Explicit rank, if any
        rank: Option<u32>,
    },

    /// Unmanaged pointer: T*
    Pointer(Box<TypeHandle>),

    /// Managed reference: T&
    ByRef(Box<TypeHandle>),

    /// Generic instantiation: Def[A1, ..., An]
    Generic {
        /// Generic type definition
        definition: DefId,
        /// Type arguments, in declaration order
        arguments: Vec<TypeHandle>,
    },
}

impl TypeHandle {
    /// Handle of a defined type
    pub fn defined(id: DefId) -> Self {
        TypeHandle::Defined(id)
    }

    /// The arena slot holding this type's definition
    ///
    /// For generic instantiations this is the generic type definition;
    /// arrays, pointers and by-refs have no definition of their own.
    pub fn definition(&self) -> Option<DefId> {
        match self {
            TypeHandle::Defined(id) => Some(*id),
            TypeHandle::Generic { definition, .. } => Some(*definition),
            _ => None,
        }
    }

    /// Element handle of an array, pointer or by-ref
    pub fn element(&self) -> Option<&TypeHandle> {
        match self {
            TypeHandle::Array { element, .. } => Some(element),
            TypeHandle::Pointer(element) | TypeHandle::ByRef(element) => Some(element),
            _ => None,
        }
    }

    /// Check if this handle is an array, pointer or by-ref
    pub fn has_element_type(&self) -> bool {
        self.element().is_some()
    }

    /// Check if this handle is a generic instantiation
    pub fn is_constructed_generic(&self) -> bool {
        matches!(self, TypeHandle::Generic { .. })
    }

    /// Check if this handle is a by-ref
    pub fn is_by_ref(&self) -> bool {
        matches!(self, TypeHandle::ByRef(_))
    }
}

impl From<DefId> for TypeHandle {
    fn from(id: DefId) -> Self {
        TypeHandle::Defined(id)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHandle::Defined(id) => write!(f, "T{}", id),
            TypeHandle::Array { element, rank } => match rank {
                None => write!(f, "{}[]", element),
                Some(1) => write!(f, "{}[*]", element),
                Some(n) => {
                    write!(f, "{}[", element)?;
                    for _ in 1..*n {
                        write!(f, ",")?;
                    }
                    write!(f, "]")
                }
            },
            TypeHandle::Pointer(element) => write!(f, "{}*", element),
            TypeHandle::ByRef(element) => write!(f, "{}&", element),
            TypeHandle::Generic {
                definition,
                arguments,
            } => {
                write!(f, "T{}[", definition)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Structural handle of an assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssemblyHandle(pub DefId);

impl fmt::Display for AssemblyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Unique identifier of a projection context
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

impl ContextId {
    /// Generate a new unique ContextId
    pub fn new() -> Self {
        ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric ID value
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Create a ContextId from a u64 value (for reading it back from a marker)
    pub fn from_u64(id: u64) -> Self {
        ContextId(id)
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Projection layers a description was produced through, innermost first
///
/// Empty for real entities. Projecting a description through context `c`
/// appends `c`, so stacked projections of one entity keep distinct
/// identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContextPath(Vec<ContextId>);

impl ContextPath {
    /// Path of a real entity
    pub fn real() -> Self {
        ContextPath(Vec::new())
    }

    /// Whether no projection is involved
    pub fn is_real(&self) -> bool {
        self.0.is_empty()
    }

    /// Context that produced the description, `None` if real
    pub fn outermost(&self) -> Option<ContextId> {
        self.0.last().copied()
    }

    /// Layers, innermost first
    pub fn layers(&self) -> &[ContextId] {
        &self.0
    }

    /// This path seen through one more context
    pub fn through(mut self, context: ContextId) -> Self {
        self.0.push(context);
        self
    }
}

impl From<Option<ContextId>> for ContextPath {
    fn from(context: Option<ContextId>) -> Self {
        ContextPath(context.into_iter().collect())
    }
}

/// Kind of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Reference type
    Class,
    /// Value type
    Struct,
    /// Interface
    Interface,
    /// Enumeration
    Enum,
    /// Generic type or method parameter
    GenericParameter,
    /// Array type
    Array,
    /// Pointer type
    Pointer,
    /// By-ref type
    ByRef,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::GenericParameter => "generic parameter",
            TypeKind::Array => "array",
            TypeKind::Pointer => "pointer",
            TypeKind::ByRef => "by-ref",
        };
        f.write_str(name)
    }
}

/// Category of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Field
    Field,
    /// Property
    Property,
    /// Method
    Method,
    /// Instance or static constructor
    Constructor,
    /// Event
    Event,
    /// Top-level type seen as a member
    TypeInfo,
    /// Nested type
    NestedType,
    /// Host-specific member category
    Custom,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberKind::Field => "field",
            MemberKind::Property => "property",
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
            MemberKind::Event => "event",
            MemberKind::TypeInfo => "type",
            MemberKind::NestedType => "nested type",
            MemberKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Four-part assembly version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AssemblyVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Create a version
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

// ============================================================================
// Identities
// ============================================================================

/// Equality identity of a type description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeIdentity {
    /// Structural handle of the described type
    pub handle: TypeHandle,
    /// Projection layers that produced the description
    pub contexts: ContextPath,
}

/// Equality identity of an assembly description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    /// Structural handle of the described assembly
    pub handle: AssemblyHandle,
    /// Projection layers that produced the description
    pub contexts: ContextPath,
}

/// Equality identity of a member description
///
/// Includes the reflected type: a member reached through a derived type is
/// a different handle from the same member reached through its declaring
/// type, even though both resolve to the same overlay key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberIdentity {
    /// Member category
    pub kind: MemberKind,
    /// Declaring type handle
    pub declaring: Option<TypeHandle>,
    /// Type the member was obtained from
    pub reflected: Option<TypeHandle>,
    /// Token unique within the declaring type
    pub token: u32,
    /// Projection layers that produced the description
    pub contexts: ContextPath,
}

/// Equality identity of a parameter description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterIdentity {
    /// Owning member
    pub member: MemberIdentity,
    /// Parameter position, -1 for the return value
    pub position: i32,
}
