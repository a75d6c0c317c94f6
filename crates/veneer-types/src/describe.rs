//! Type-description capability traits
//!
//! Every entity of a type-system graph (types, assemblies, members and
//! parameters) is reached through one of the traits in this module and
//! shared as an `Arc<dyn ...>`. Hosts implement the traits for their real
//! entities; projections implement them again on top of those.
//!
//! Equality and hashing of the trait objects go through the entity's
//! identity (structural handle + producing context), so `Arc`s of two
//! separately created descriptions of the same declaration compare equal.
//!
//! Several lookups have default implementations written against the
//! primitive listing methods. An implementation that overrides the
//! listings automatically gets consistent lookups.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::attribute::{AttributeKind, AttributeRef, AttributeValue};
use crate::error::{MetaError, MetaResult};
use crate::flags::{BindingFlags, MemberKinds};
use crate::handle::{
    AssemblyHandle, AssemblyIdentity, AssemblyVersion, ContextId, ContextPath, MemberIdentity,
    MemberKind, ParameterIdentity, TypeHandle, TypeIdentity, TypeKind,
};

/// Shared type description
pub type TypeRef = Arc<dyn TypeDescription>;
/// Shared assembly description
pub type AssemblyRef = Arc<dyn AssemblyDescription>;
/// Shared field description
pub type FieldRef = Arc<dyn FieldDescription>;
/// Shared property description
pub type PropertyRef = Arc<dyn PropertyDescription>;
/// Shared method or constructor description
pub type MethodRef = Arc<dyn MethodDescription>;
/// Shared event description
pub type EventRef = Arc<dyn EventDescription>;
/// Shared parameter description
pub type ParameterRef = Arc<dyn ParameterDescription>;

/// Name of the attribute kind that names a type's default members
pub const DEFAULT_MEMBER_ATTRIBUTE: &str = "DefaultMemberAttribute";

/// Access to the custom attributes attached to an entity
pub trait AttributeProvider {
    /// Attributes of the entity, optionally filtered to those assignable to
    /// `kind`. With `inherit`, attributes of inheritable kinds declared on
    /// base declarations are included after the entity's own.
    fn custom_attributes(&self, kind: Option<&AttributeKind>, inherit: bool) -> Vec<AttributeRef>;

    /// Whether at least one attribute assignable to `kind` is present
    fn is_defined(&self, kind: &AttributeKind, inherit: bool) -> bool {
        !self.custom_attributes(Some(kind), inherit).is_empty()
    }
}

// ============================================================================
// Types
// ============================================================================

/// Pairing of an interface's methods with the implementing methods of a type
#[derive(Debug, Clone)]
pub struct InterfaceMapping {
    /// Implementing type
    pub target_type: TypeRef,
    /// Mapped interface
    pub interface_type: TypeRef,
    /// Methods declared by the interface
    pub interface_methods: Vec<MethodRef>,
    /// Implementing methods, index-aligned with `interface_methods`
    pub target_methods: Vec<MethodRef>,
}

/// Read-only structural surface of a type
pub trait TypeDescription: AttributeProvider + Send + Sync + fmt::Debug {
    /// Structural handle
    fn handle(&self) -> TypeHandle;

    /// Projection context that produced this description
    fn context(&self) -> Option<ContextId> {
        None
    }

    /// Equality identity
    fn identity(&self) -> TypeIdentity {
        TypeIdentity {
            handle: self.handle(),
            contexts: ContextPath::from(self.context()),
        }
    }

    /// Description this one projects, `None` unless it is a projection
    fn projected_from(&self) -> Option<TypeRef> {
        None
    }

    /// Simple name, including array/pointer/by-ref decorations
    fn name(&self) -> String;

    /// Namespace, `None` for the global namespace
    fn namespace(&self) -> Option<String>;

    /// Namespace-qualified name; nested types use `Outer+Inner`
    fn full_name(&self) -> String;

    /// Kind of type
    fn kind(&self) -> TypeKind;

    /// Whether the type is visible outside its assembly
    fn is_public(&self) -> bool;

    /// Assembly that defines the type
    fn assembly(&self) -> AssemblyRef;

    /// Base type, `None` for interfaces, generic parameters without a
    /// class constraint and the root of the hierarchy
    fn base_type(&self) -> Option<TypeRef>;

    /// Enclosing type of a nested type or generic parameter
    fn declaring_type(&self) -> Option<TypeRef>;

    /// Type this description was obtained from
    fn reflected_type(&self) -> Option<TypeRef> {
        self.declaring_type()
    }

    /// Method declaring this generic method parameter
    fn declaring_method(&self) -> Option<MethodRef>;

    /// Element type of an array, pointer or by-ref
    fn element_type(&self) -> Option<TypeRef>;

    /// Underlying integral type of an enum
    fn enum_underlying_type(&self) -> MetaResult<TypeRef>;

    /// Rank of an array type
    fn array_rank(&self) -> MetaResult<usize>;

    /// Whether this type is a generic type definition (open, with parameters)
    fn is_generic_type_definition(&self) -> bool;

    /// Position of a generic parameter in its owner's parameter list
    fn generic_parameter_position(&self) -> Option<usize>;

    /// Generic parameters of a definition or arguments of an instantiation
    fn generic_arguments(&self) -> Vec<TypeRef>;

    /// Arguments of a constructed generic type, empty for definitions
    fn generic_type_arguments(&self) -> Vec<TypeRef>;

    /// Constraints of a generic parameter
    fn generic_parameter_constraints(&self) -> MetaResult<Vec<TypeRef>>;

    /// Generic type definition of a generic type
    fn generic_type_definition(&self) -> MetaResult<TypeRef>;

    /// Interfaces implemented by the type, directly or through its bases
    fn interfaces(&self) -> Vec<TypeRef>;

    /// Implemented interface by simple or full name
    fn interface(&self, name: &str, ignore_case: bool) -> Option<TypeRef> {
        let flags = if ignore_case {
            BindingFlags::IGNORE_CASE
        } else {
            BindingFlags::empty()
        };
        self.interfaces().into_iter().find(|iface| {
            flags.name_matches(&iface.name(), name) || flags.name_matches(&iface.full_name(), name)
        })
    }

    /// Implemented interfaces accepted by `filter`
    fn find_interfaces(&self, filter: &dyn Fn(&TypeRef) -> bool) -> Vec<TypeRef> {
        self.interfaces().into_iter().filter(|iface| filter(iface)).collect()
    }

    /// Mapping of `interface`'s methods to this type's implementations
    fn interface_map(&self, interface: &TypeRef) -> MetaResult<InterfaceMapping>;

    /// Nested types passing `flags`
    fn nested_types(&self, flags: BindingFlags) -> Vec<TypeRef>;

    /// Nested type by name
    fn nested_type(&self, name: &str, flags: BindingFlags) -> Option<TypeRef> {
        self.nested_types(flags)
            .into_iter()
            .find(|nested| flags.name_matches(&nested.name(), name))
    }

    /// Fields passing `flags`
    fn fields(&self, flags: BindingFlags) -> Vec<FieldRef>;

    /// Field by name
    fn field(&self, name: &str, flags: BindingFlags) -> Option<FieldRef> {
        self.fields(flags)
            .into_iter()
            .find(|field| flags.name_matches(&field.name(), name))
    }

    /// Properties passing `flags`
    fn properties(&self, flags: BindingFlags) -> Vec<PropertyRef>;

    /// Property by name
    fn property(&self, name: &str, flags: BindingFlags) -> Option<PropertyRef> {
        self.properties(flags)
            .into_iter()
            .find(|property| flags.name_matches(&property.name(), name))
    }

    /// Methods passing `flags`, constructors excluded
    fn methods(&self, flags: BindingFlags) -> Vec<MethodRef>;

    /// Method by name, optionally narrowed by parameter types
    ///
    /// Without parameter types more than one overload is an
    /// [`MetaError::AmbiguousMatch`].
    fn method(
        &self,
        name: &str,
        flags: BindingFlags,
        parameter_types: Option<&[TypeRef]>,
    ) -> MetaResult<Option<MethodRef>> {
        let mut candidates = self
            .methods(flags)
            .into_iter()
            .filter(|method| flags.name_matches(&method.name(), name));

        match parameter_types {
            Some(types) => Ok(candidates.find(|method| signature_matches(method.as_ref(), types))),
            None => {
                let first = candidates.next();
                if candidates.next().is_some() {
                    return Err(MetaError::AmbiguousMatch {
                        kind: MemberKind::Method.to_string(),
                        name: name.to_string(),
                        owner: self.full_name(),
                    });
                }
                Ok(first)
            }
        }
    }

    /// Constructors passing `flags`
    fn constructors(&self, flags: BindingFlags) -> Vec<MethodRef>;

    /// Constructor by parameter types
    fn constructor(&self, flags: BindingFlags, parameter_types: &[TypeRef]) -> Option<MethodRef> {
        self.constructors(flags)
            .into_iter()
            .find(|ctor| signature_matches(ctor.as_ref(), parameter_types))
    }

    /// Events passing `flags`
    fn events(&self, flags: BindingFlags) -> Vec<EventRef>;

    /// Event by name
    fn event(&self, name: &str, flags: BindingFlags) -> Option<EventRef> {
        self.events(flags)
            .into_iter()
            .find(|event| flags.name_matches(&event.name(), name))
    }

    /// Every member passing `flags`: methods, constructors, properties,
    /// events, fields, then nested types
    fn members(&self, flags: BindingFlags) -> Vec<MemberRef> {
        let mut members: Vec<MemberRef> = Vec::new();
        members.extend(self.methods(flags).into_iter().map(MemberRef::Method));
        members.extend(self.constructors(flags).into_iter().map(MemberRef::Constructor));
        members.extend(self.properties(flags).into_iter().map(MemberRef::Property));
        members.extend(self.events(flags).into_iter().map(MemberRef::Event));
        members.extend(self.fields(flags).into_iter().map(MemberRef::Field));
        members.extend(self.nested_types(flags).into_iter().map(MemberRef::NestedType));
        members
    }

    /// Members of the given kinds with the given name
    fn member(&self, name: &str, kinds: MemberKinds, flags: BindingFlags) -> Vec<MemberRef> {
        self.members(flags)
            .into_iter()
            .filter(|member| kinds.contains(member.kind().as_kinds()))
            .filter(|member| flags.name_matches(&member.name(), name))
            .collect()
    }

    /// Members of the given kinds accepted by `filter`
    fn find_members(
        &self,
        kinds: MemberKinds,
        flags: BindingFlags,
        filter: &dyn Fn(&MemberRef) -> bool,
    ) -> Vec<MemberRef> {
        self.members(flags)
            .into_iter()
            .filter(|member| kinds.contains(member.kind().as_kinds()))
            .filter(|member| filter(member))
            .collect()
    }

    /// Members named by the type's `DefaultMemberAttribute`
    fn default_members(&self) -> Vec<MemberRef> {
        let kind = AttributeKind::new(DEFAULT_MEMBER_ATTRIBUTE);
        let names: Vec<String> = self
            .custom_attributes(Some(&kind), true)
            .iter()
            .filter_map(|attr| match attr.arguments().first() {
                Some(AttributeValue::Str(name)) => Some(name.clone()),
                _ => None,
            })
            .collect();
        if names.is_empty() {
            return Vec::new();
        }
        self.members(BindingFlags::ALL)
            .into_iter()
            .filter(|member| names.contains(&member.name()))
            .collect()
    }

    /// Array of this type; `None` builds a vector, `Some(rank)` an array of
    /// explicit rank
    fn make_array_type(&self, rank: Option<usize>) -> MetaResult<TypeRef>;

    /// Pointer to this type
    fn make_pointer_type(&self) -> MetaResult<TypeRef>;

    /// By-ref of this type
    fn make_by_ref_type(&self) -> MetaResult<TypeRef>;

    /// Instantiation of this generic type definition
    fn make_generic_type(&self, arguments: &[TypeRef]) -> MetaResult<TypeRef>;

    /// Whether a value of `other` can be used where this type is expected
    fn is_assignable_from(&self, other: &TypeRef) -> bool;

    /// Whether `other` is a strict base class of this type
    fn is_subclass_of(&self, other: &TypeRef) -> bool {
        let target = other.handle();
        let mut current = self.base_type();
        while let Some(base) = current {
            if base.handle() == target {
                return true;
            }
            current = base.base_type();
        }
        false
    }
}

/// Whether `method`'s parameter types match `types` by handle
pub fn signature_matches(method: &dyn MethodDescription, types: &[TypeRef]) -> bool {
    let parameters = method.parameters();
    parameters.len() == types.len()
        && parameters.iter().zip(types).all(|(param, ty)| {
            param
                .parameter_type()
                .is_some_and(|param_ty| param_ty.handle() == ty.handle())
        })
}

// ============================================================================
// Assemblies
// ============================================================================

/// Read-only structural surface of an assembly
pub trait AssemblyDescription: AttributeProvider + Send + Sync + fmt::Debug {
    /// Structural handle
    fn handle(&self) -> AssemblyHandle;

    /// Projection context that produced this description
    fn context(&self) -> Option<ContextId> {
        None
    }

    /// Equality identity
    fn identity(&self) -> AssemblyIdentity {
        AssemblyIdentity {
            handle: self.handle(),
            contexts: ContextPath::from(self.context()),
        }
    }

    /// Description this one projects, `None` unless it is a projection
    fn projected_from(&self) -> Option<AssemblyRef> {
        None
    }

    /// Simple name
    fn name(&self) -> String;

    /// Version
    fn version(&self) -> AssemblyVersion;

    /// Culture, `None` for the neutral culture
    fn culture(&self) -> Option<String>;

    /// Display name: `Name, Version=x.y.z.w, Culture=neutral`
    fn full_name(&self) -> String {
        format!(
            "{}, Version={}, Culture={}",
            self.name(),
            self.version(),
            self.culture().as_deref().unwrap_or("neutral")
        )
    }

    /// Every type defined in the assembly
    fn defined_types(&self) -> Vec<TypeRef>;

    /// Types visible outside the assembly
    fn exported_types(&self) -> Vec<TypeRef>;

    /// Type by full name
    ///
    /// A missing type is `Ok(None)` unless `throw_on_error` is set, in which
    /// case it is [`MetaError::TypeNotFound`].
    fn get_type(
        &self,
        name: &str,
        throw_on_error: bool,
        ignore_case: bool,
    ) -> MetaResult<Option<TypeRef>>;

    /// Entry point method, if the assembly is an executable
    fn entry_point(&self) -> Option<MethodRef>;

    /// Satellite assembly for `culture`, optionally of an exact version
    fn satellite_assembly(
        &self,
        culture: &str,
        version: Option<AssemblyVersion>,
    ) -> MetaResult<AssemblyRef>;
}

// ============================================================================
// Members
// ============================================================================

/// Surface shared by fields, properties, methods, constructors and events
pub trait MemberDescription: AttributeProvider + Send + Sync + fmt::Debug {
    /// Member name
    fn name(&self) -> String;

    /// Member category
    fn kind(&self) -> MemberKind;

    /// Token unique within the declaring type
    fn metadata_token(&self) -> u32;

    /// Type that declares the member
    fn declaring_type(&self) -> Option<TypeRef>;

    /// Type the member was obtained from
    fn reflected_type(&self) -> Option<TypeRef>;

    /// Whether the member is public
    fn is_public(&self) -> bool;

    /// Whether the member is static
    fn is_static(&self) -> bool;

    /// Projection context that produced this description
    fn context(&self) -> Option<ContextId> {
        None
    }

    /// Equality identity
    fn identity(&self) -> MemberIdentity {
        MemberIdentity {
            kind: self.kind(),
            declaring: self.declaring_type().map(|ty| ty.handle()),
            reflected: self.reflected_type().map(|ty| ty.handle()),
            token: self.metadata_token(),
            contexts: ContextPath::from(self.context()),
        }
    }
}

/// Field surface
pub trait FieldDescription: MemberDescription {
    /// Declared field type
    fn field_type(&self) -> TypeRef;
}

/// Property surface
pub trait PropertyDescription: MemberDescription {
    /// Declared property type
    fn property_type(&self) -> TypeRef;

    /// Get accessor
    fn getter(&self) -> Option<MethodRef>;

    /// Set accessor
    fn setter(&self) -> Option<MethodRef>;

    /// Index parameters of an indexer, empty otherwise
    fn index_parameters(&self) -> Vec<ParameterRef>;
}

/// Method and constructor surface
pub trait MethodDescription: MemberDescription {
    /// Ordinal parameters
    fn parameters(&self) -> Vec<ParameterRef>;

    /// Return-value pseudo-parameter (position -1), `None` for constructors
    fn return_parameter(&self) -> Option<ParameterRef>;

    /// Return type, `None` for void methods and constructors
    fn return_type(&self) -> Option<TypeRef>;

    /// Generic parameters of a generic method definition
    fn generic_arguments(&self) -> Vec<TypeRef>;

    /// Whether the method is virtual
    fn is_virtual(&self) -> bool;

    /// Root declaration this method overrides, `None` if it is the root
    fn base_definition(&self) -> Option<MethodRef>;

    /// Whether this is a constructor
    fn is_constructor(&self) -> bool {
        self.kind() == MemberKind::Constructor
    }
}

/// Event surface
pub trait EventDescription: MemberDescription {
    /// Delegate type of the handler
    fn handler_type(&self) -> Option<TypeRef>;

    /// Subscribe accessor
    fn add_method(&self) -> Option<MethodRef>;

    /// Unsubscribe accessor
    fn remove_method(&self) -> Option<MethodRef>;
}

/// Parameter surface
pub trait ParameterDescription: AttributeProvider + Send + Sync + fmt::Debug {
    /// Parameter name, `None` for the return value
    fn name(&self) -> Option<String>;

    /// Position, -1 for the return value
    fn position(&self) -> i32;

    /// Declared type, `None` for a void return value
    fn parameter_type(&self) -> Option<TypeRef>;

    /// Owning method, constructor or property
    fn member(&self) -> MemberRef;

    /// Projection context that produced this description
    fn context(&self) -> Option<ContextId> {
        None
    }

    /// Equality identity
    fn identity(&self) -> ParameterIdentity {
        ParameterIdentity {
            member: self.member().identity(),
            position: self.position(),
        }
    }

    /// Whether this is the return-value pseudo-parameter
    fn is_return_value(&self) -> bool {
        self.position() == -1
    }
}

// ============================================================================
// Tagged member reference
// ============================================================================

/// A member of any category
#[derive(Debug, Clone)]
pub enum MemberRef {
    /// Field
    Field(FieldRef),
    /// Property
    Property(PropertyRef),
    /// Method
    Method(MethodRef),
    /// Constructor
    Constructor(MethodRef),
    /// Event
    Event(EventRef),
    /// Nested type
    NestedType(TypeRef),
    /// Host-specific member
    Custom(Arc<dyn MemberDescription>),
}

impl MemberRef {
    /// Wrap a method or constructor, choosing the variant by its kind
    pub fn from_method(method: MethodRef) -> Self {
        if method.is_constructor() {
            MemberRef::Constructor(method)
        } else {
            MemberRef::Method(method)
        }
    }

    /// Member category
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberRef::Field(_) => MemberKind::Field,
            MemberRef::Property(_) => MemberKind::Property,
            MemberRef::Method(_) => MemberKind::Method,
            MemberRef::Constructor(_) => MemberKind::Constructor,
            MemberRef::Event(_) => MemberKind::Event,
            MemberRef::NestedType(_) => MemberKind::NestedType,
            MemberRef::Custom(member) => member.kind(),
        }
    }

    /// The member viewed through the shared member surface, `None` for
    /// nested types
    pub fn as_member(&self) -> Option<&dyn MemberDescription> {
        match self {
            MemberRef::Field(field) => Some(field.as_ref()),
            MemberRef::Property(property) => Some(property.as_ref()),
            MemberRef::Method(method) | MemberRef::Constructor(method) => Some(method.as_ref()),
            MemberRef::Event(event) => Some(event.as_ref()),
            MemberRef::Custom(member) => Some(member.as_ref()),
            MemberRef::NestedType(_) => None,
        }
    }

    /// Member name
    pub fn name(&self) -> String {
        match self {
            MemberRef::NestedType(ty) => ty.name(),
            _ => self.as_member().map(|m| m.name()).unwrap_or_default(),
        }
    }

    /// Declaring type
    pub fn declaring_type(&self) -> Option<TypeRef> {
        match self {
            MemberRef::NestedType(ty) => ty.declaring_type(),
            _ => self.as_member().and_then(|m| m.declaring_type()),
        }
    }

    /// Projection context that produced this member
    pub fn context(&self) -> Option<ContextId> {
        match self {
            MemberRef::NestedType(ty) => ty.context(),
            _ => self.as_member().and_then(|m| m.context()),
        }
    }

    /// Attributes of the member
    pub fn custom_attributes(&self, kind: Option<&AttributeKind>, inherit: bool) -> Vec<AttributeRef> {
        match self {
            MemberRef::NestedType(ty) => ty.custom_attributes(kind, inherit),
            _ => self
                .as_member()
                .map(|m| m.custom_attributes(kind, inherit))
                .unwrap_or_default(),
        }
    }

    /// Whether an attribute assignable to `kind` is present
    pub fn is_defined(&self, kind: &AttributeKind, inherit: bool) -> bool {
        match self {
            MemberRef::NestedType(ty) => ty.is_defined(kind, inherit),
            _ => self.as_member().is_some_and(|m| m.is_defined(kind, inherit)),
        }
    }

    /// Method or constructor payload
    pub fn as_method(&self) -> Option<&MethodRef> {
        match self {
            MemberRef::Method(method) | MemberRef::Constructor(method) => Some(method),
            _ => None,
        }
    }

    /// Field payload
    pub fn as_field(&self) -> Option<&FieldRef> {
        match self {
            MemberRef::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Property payload
    pub fn as_property(&self) -> Option<&PropertyRef> {
        match self {
            MemberRef::Property(property) => Some(property),
            _ => None,
        }
    }

    /// Event payload
    pub fn as_event(&self) -> Option<&EventRef> {
        match self {
            MemberRef::Event(event) => Some(event),
            _ => None,
        }
    }

    /// Nested type payload
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            MemberRef::NestedType(ty) => Some(ty),
            _ => None,
        }
    }

    /// Equality identity; nested types use their declaring type as the
    /// declaring handle and their own handle as the reflected one
    pub fn identity(&self) -> MemberIdentity {
        match self {
            MemberRef::NestedType(ty) => MemberIdentity {
                kind: MemberKind::NestedType,
                declaring: ty.declaring_type().map(|outer| outer.handle()),
                reflected: Some(ty.handle()),
                token: 0,
                contexts: ty.identity().contexts,
            },
            MemberRef::Field(field) => field.identity(),
            MemberRef::Property(property) => property.identity(),
            MemberRef::Method(method) | MemberRef::Constructor(method) => method.identity(),
            MemberRef::Event(event) => event.identity(),
            MemberRef::Custom(member) => member.identity(),
        }
    }
}

impl PartialEq for MemberRef {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for MemberRef {}

impl Hash for MemberRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl From<FieldRef> for MemberRef {
    fn from(field: FieldRef) -> Self {
        MemberRef::Field(field)
    }
}

impl From<PropertyRef> for MemberRef {
    fn from(property: PropertyRef) -> Self {
        MemberRef::Property(property)
    }
}

impl From<MethodRef> for MemberRef {
    fn from(method: MethodRef) -> Self {
        MemberRef::from_method(method)
    }
}

impl From<EventRef> for MemberRef {
    fn from(event: EventRef) -> Self {
        MemberRef::Event(event)
    }
}

// ============================================================================
// Identity-based equality for the trait objects
// ============================================================================

macro_rules! identity_eq {
    ($($trait:ident),* $(,)?) => {
        $(
            impl PartialEq for dyn $trait {
                fn eq(&self, other: &Self) -> bool {
                    self.identity() == other.identity()
                }
            }

            impl Eq for dyn $trait {}

            impl Hash for dyn $trait {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    self.identity().hash(state);
                }
            }
        )*
    };
}

identity_eq!(
    TypeDescription,
    AssemblyDescription,
    MemberDescription,
    FieldDescription,
    PropertyDescription,
    MethodDescription,
    EventDescription,
    ParameterDescription,
);

impl fmt::Display for dyn TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl fmt::Display for dyn AssemblyDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
