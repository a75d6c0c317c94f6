//! Projected types

use std::fmt;

use veneer_types::{
    AssemblyRef, AttributeKind, AttributeProvider, AttributeRef, BindingFlags, ContextId,
    EventRef, FieldRef, InterfaceMapping, MemberKinds, MemberRef, MetaResult, MethodRef,
    PropertyRef, TypeDescription, TypeHandle, TypeIdentity, TypeKind, TypeRef,
};

use crate::context::{Entity, ProjectionContext};

/// A real type seen through a [`ProjectionContext`]
///
/// Structural reads delegate to the real type. Every type, member or
/// assembly a read yields is projected through the owning context, and
/// projected arguments are unwrapped before they reach the real type.
pub struct ProjectedType {
    real: TypeRef,
    context: ProjectionContext,
}

impl ProjectedType {
    pub(crate) fn new(real: TypeRef, context: ProjectionContext) -> Self {
        ProjectedType { real, context }
    }

    /// The wrapped type
    pub fn real(&self) -> &TypeRef {
        &self.real
    }

    /// The owning context
    pub fn projection_context(&self) -> &ProjectionContext {
        &self.context
    }

    fn map_fields(&self, fields: Vec<FieldRef>) -> Vec<FieldRef> {
        fields
            .iter()
            .map(|field| self.context.map_field(field))
            .collect()
    }

    fn map_properties(&self, properties: Vec<PropertyRef>) -> Vec<PropertyRef> {
        properties
            .iter()
            .map(|property| self.context.map_property(property))
            .collect()
    }

    fn map_events(&self, events: Vec<EventRef>) -> Vec<EventRef> {
        events
            .iter()
            .map(|event| self.context.map_event(event))
            .collect()
    }
}

impl fmt::Debug for ProjectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedType")
            .field("real", &self.real)
            .field("context", &self.context.id())
            .finish()
    }
}

impl AttributeProvider for ProjectedType {
    fn custom_attributes(&self, kind: Option<&AttributeKind>, inherit: bool) -> Vec<AttributeRef> {
        self.context
            .custom_attributes(Entity::Type(self.real.as_ref()), kind, inherit)
    }

    fn is_defined(&self, kind: &AttributeKind, inherit: bool) -> bool {
        self.context
            .is_attribute_defined(Entity::Type(self.real.as_ref()), kind, inherit)
    }
}

impl TypeDescription for ProjectedType {
    fn handle(&self) -> TypeHandle {
        self.real.handle()
    }

    fn context(&self) -> Option<ContextId> {
        Some(self.context.id())
    }

    fn identity(&self) -> TypeIdentity {
        let real = self.real.identity();
        TypeIdentity {
            contexts: real.contexts.through(self.context.id()),
            ..real
        }
    }

    fn projected_from(&self) -> Option<TypeRef> {
        Some(self.real.clone())
    }

    fn name(&self) -> String {
        self.real.name()
    }

    fn namespace(&self) -> Option<String> {
        self.real.namespace()
    }

    fn full_name(&self) -> String {
        self.real.full_name()
    }

    fn kind(&self) -> TypeKind {
        self.real.kind()
    }

    fn is_public(&self) -> bool {
        self.real.is_public()
    }

    fn assembly(&self) -> AssemblyRef {
        self.context.map_assembly(&self.real.assembly())
    }

    fn base_type(&self) -> Option<TypeRef> {
        self.context.map_type_opt(self.real.base_type())
    }

    fn declaring_type(&self) -> Option<TypeRef> {
        self.context.map_type_opt(self.real.declaring_type())
    }

    fn reflected_type(&self) -> Option<TypeRef> {
        self.context.map_type_opt(self.real.reflected_type())
    }

    fn declaring_method(&self) -> Option<MethodRef> {
        self.real
            .declaring_method()
            .map(|method| self.context.map_method(&method))
    }

    fn element_type(&self) -> Option<TypeRef> {
        self.context.map_type_opt(self.real.element_type())
    }

    fn enum_underlying_type(&self) -> MetaResult<TypeRef> {
        Ok(self.context.map_type(&self.real.enum_underlying_type()?))
    }

    fn array_rank(&self) -> MetaResult<usize> {
        self.real.array_rank()
    }

    fn is_generic_type_definition(&self) -> bool {
        self.real.is_generic_type_definition()
    }

    fn generic_parameter_position(&self) -> Option<usize> {
        self.real.generic_parameter_position()
    }

    fn generic_arguments(&self) -> Vec<TypeRef> {
        self.context.map_types(self.real.generic_arguments())
    }

    fn generic_type_arguments(&self) -> Vec<TypeRef> {
        self.context.map_types(self.real.generic_type_arguments())
    }

    fn generic_parameter_constraints(&self) -> MetaResult<Vec<TypeRef>> {
        Ok(self
            .context
            .map_types(self.real.generic_parameter_constraints()?))
    }

    fn generic_type_definition(&self) -> MetaResult<TypeRef> {
        Ok(self.context.map_type(&self.real.generic_type_definition()?))
    }

    fn interfaces(&self) -> Vec<TypeRef> {
        self.context.map_types(self.real.interfaces())
    }

    fn interface(&self, name: &str, ignore_case: bool) -> Option<TypeRef> {
        self.context
            .map_type_opt(self.real.interface(name, ignore_case))
    }

    fn interface_map(&self, interface: &TypeRef) -> MetaResult<InterfaceMapping> {
        let map = self
            .real
            .interface_map(&self.context.unwrap_type(interface))?;
        Ok(InterfaceMapping {
            target_type: self.context.map_type(&map.target_type),
            interface_type: self.context.map_type(&map.interface_type),
            interface_methods: self.context.map_methods(map.interface_methods),
            target_methods: self.context.map_methods(map.target_methods),
        })
    }

    fn nested_types(&self, flags: BindingFlags) -> Vec<TypeRef> {
        self.context.map_types(self.real.nested_types(flags))
    }

    fn nested_type(&self, name: &str, flags: BindingFlags) -> Option<TypeRef> {
        self.context
            .map_type_opt(self.real.nested_type(name, flags))
    }

    fn fields(&self, flags: BindingFlags) -> Vec<FieldRef> {
        self.map_fields(self.real.fields(flags))
    }

    fn field(&self, name: &str, flags: BindingFlags) -> Option<FieldRef> {
        self.real
            .field(name, flags)
            .map(|field| self.context.map_field(&field))
    }

    fn properties(&self, flags: BindingFlags) -> Vec<PropertyRef> {
        self.map_properties(self.real.properties(flags))
    }

    fn property(&self, name: &str, flags: BindingFlags) -> Option<PropertyRef> {
        self.real
            .property(name, flags)
            .map(|property| self.context.map_property(&property))
    }

    fn methods(&self, flags: BindingFlags) -> Vec<MethodRef> {
        self.context.map_methods(self.real.methods(flags))
    }

    fn method(
        &self,
        name: &str,
        flags: BindingFlags,
        parameter_types: Option<&[TypeRef]>,
    ) -> MetaResult<Option<MethodRef>> {
        let parameter_types = parameter_types.map(|types| self.context.unwrap_types(types));
        Ok(self
            .real
            .method(name, flags, parameter_types.as_deref())?
            .map(|method| self.context.map_method(&method)))
    }

    fn constructors(&self, flags: BindingFlags) -> Vec<MethodRef> {
        self.context.map_methods(self.real.constructors(flags))
    }

    fn constructor(&self, flags: BindingFlags, parameter_types: &[TypeRef]) -> Option<MethodRef> {
        self.real
            .constructor(flags, &self.context.unwrap_types(parameter_types))
            .map(|ctor| self.context.map_method(&ctor))
    }

    fn events(&self, flags: BindingFlags) -> Vec<EventRef> {
        self.map_events(self.real.events(flags))
    }

    fn event(&self, name: &str, flags: BindingFlags) -> Option<EventRef> {
        self.real
            .event(name, flags)
            .map(|event| self.context.map_event(&event))
    }

    fn members(&self, flags: BindingFlags) -> Vec<MemberRef> {
        self.context.map_members(self.real.members(flags))
    }

    fn member(&self, name: &str, kinds: MemberKinds, flags: BindingFlags) -> Vec<MemberRef> {
        self.context
            .map_members(self.real.member(name, kinds, flags))
    }

    fn default_members(&self) -> Vec<MemberRef> {
        self.context.map_members(self.real.default_members())
    }

    fn make_array_type(&self, rank: Option<usize>) -> MetaResult<TypeRef> {
        Ok(self.context.map_type(&self.real.make_array_type(rank)?))
    }

    fn make_pointer_type(&self) -> MetaResult<TypeRef> {
        Ok(self.context.map_type(&self.real.make_pointer_type()?))
    }

    fn make_by_ref_type(&self) -> MetaResult<TypeRef> {
        Ok(self.context.map_type(&self.real.make_by_ref_type()?))
    }

    fn make_generic_type(&self, arguments: &[TypeRef]) -> MetaResult<TypeRef> {
        let arguments = self.context.unwrap_types(arguments);
        Ok(self
            .context
            .map_type(&self.real.make_generic_type(&arguments)?))
    }

    fn is_assignable_from(&self, other: &TypeRef) -> bool {
        self.real
            .is_assignable_from(&self.context.unwrap_type(other))
    }
}
