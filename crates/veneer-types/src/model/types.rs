//! Type and assembly descriptions over the arena

use std::fmt;
use std::sync::Arc;

use crate::attribute::{matches_kind, AttributeKind, AttributeRef};
use crate::describe::{
    AssemblyDescription, AssemblyRef, AttributeProvider, EventRef, FieldRef, InterfaceMapping,
    MethodRef, PropertyRef, TypeDescription, TypeRef,
};
use crate::error::{MetaError, MetaResult};
use crate::flags::BindingFlags;
use crate::handle::{AssemblyHandle, AssemblyVersion, DefId, MemberKind, TypeHandle, TypeKind};
use crate::keys::MethodKey;

use super::defs::TypeDef;
use super::members::MemberCursor;
use super::Universe;

/// Upper bound on explicit array ranks
const MAX_ARRAY_RANK: usize = 32;

fn array_suffix(rank: Option<u32>) -> String {
    match rank {
        None => "[]".to_string(),
        Some(1) => "[*]".to_string(),
        Some(n) => format!("[{}]", ",".repeat(n as usize - 1)),
    }
}

/// Definition the handle is ultimately built from
fn root_definition(handle: &TypeHandle) -> DefId {
    match handle {
        TypeHandle::Defined(id) | TypeHandle::Generic { definition: id, .. } => *id,
        TypeHandle::Array { element, .. }
        | TypeHandle::Pointer(element)
        | TypeHandle::ByRef(element) => root_definition(element),
    }
}

// ============================================================================
// Types
// ============================================================================

/// Description of one type handle in a [`Universe`]
#[derive(Clone)]
pub struct ModelType {
    universe: Arc<Universe>,
    handle: TypeHandle,
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("handle", &self.handle)
            .field("name", &self.full_name())
            .finish()
    }
}

impl ModelType {
    pub(crate) fn new(universe: Arc<Universe>, handle: TypeHandle) -> Self {
        ModelType { universe, handle }
    }

    fn wrap(&self, handle: TypeHandle) -> TypeRef {
        self.universe.type_ref(handle)
    }

    fn def(&self) -> Option<&TypeDef> {
        self.handle
            .definition()
            .map(|id| self.universe.type_def(id.index))
    }

    fn root_def(&self) -> &TypeDef {
        self.universe.type_def(root_definition(&self.handle).index)
    }

    fn kind_of(&self, handle: &TypeHandle) -> TypeKind {
        match handle {
            TypeHandle::Defined(id) | TypeHandle::Generic { definition: id, .. } => {
                self.universe.type_def(id.index).kind
            }
            TypeHandle::Array { .. } => TypeKind::Array,
            TypeHandle::Pointer(_) => TypeKind::Pointer,
            TypeHandle::ByRef(_) => TypeKind::ByRef,
        }
    }

    /// Base of a definition; generic parameters use their class constraint
    fn base_of(&self, def: &TypeDef) -> Option<TypeHandle> {
        if def.kind == TypeKind::GenericParameter {
            return def
                .constraints
                .iter()
                .find(|c| self.kind_of(c) != TypeKind::Interface)
                .cloned();
        }
        def.base.clone()
    }

    /// Directly implemented interfaces; generic parameters use their
    /// interface constraints
    fn declared_interfaces<'a>(&'a self, def: &'a TypeDef) -> Vec<&'a TypeHandle> {
        if def.kind == TypeKind::GenericParameter {
            return def
                .constraints
                .iter()
                .filter(|c| self.kind_of(c) == TypeKind::Interface)
                .collect();
        }
        def.interfaces.iter().collect()
    }

    fn collect_interfaces(&self, handle: &TypeHandle, out: &mut Vec<TypeHandle>) {
        let Some(id) = handle.definition() else {
            return;
        };
        let def = self.universe.type_def(id.index);
        for iface in self.declared_interfaces(def) {
            if !out.contains(iface) {
                out.push(iface.clone());
                self.collect_interfaces(iface, out);
            }
        }
        if let Some(base) = self.base_of(def) {
            self.collect_interfaces(&base, out);
        }
    }

    /// Nominal assignability over handles
    fn handle_assignable(&self, target: &TypeHandle, source: &TypeHandle) -> bool {
        if target == source {
            return true;
        }

        // Reference-element arrays are covariant
        if let (
            TypeHandle::Array {
                element: target_element,
                rank: target_rank,
            },
            TypeHandle::Array {
                element: source_element,
                rank: source_rank,
            },
        ) = (target, source)
        {
            let by_reference = matches!(
                self.kind_of(source_element),
                TypeKind::Class | TypeKind::Interface | TypeKind::Array
            );
            return target_rank == source_rank
                && by_reference
                && self.handle_assignable(target_element, source_element);
        }

        let Some(id) = source.definition() else {
            return false;
        };
        let def = self.universe.type_def(id.index);
        if let Some(base) = self.base_of(def) {
            if self.handle_assignable(target, &base) {
                return true;
            }
        }
        self.declared_interfaces(def)
            .into_iter()
            .any(|iface| self.handle_assignable(target, iface))
    }

    /// Members of one category visible from this type
    ///
    /// Walks the base chain unless `DECLARED_ONLY` is set. Inherited
    /// members must be public instance members not hidden by a more derived
    /// declaration with the same hiding key. Constructors are never
    /// inherited.
    fn collect(&self, flags: BindingFlags, kind: MemberKind) -> Vec<MemberCursor> {
        let Some(id) = self.handle.definition() else {
            return Vec::new();
        };

        let universe = &self.universe;
        let mut hidden = Vec::new();
        let mut out = Vec::new();
        let mut current = Some(id.index);
        let mut declared = true;

        while let Some(index) = current {
            let def = universe.type_def(index);
            for (slot, member) in def.members.iter().enumerate() {
                if member.kind() != kind {
                    continue;
                }
                if !declared && (member.is_static || !member.is_public) {
                    continue;
                }
                let key = member.hiding_key();
                if hidden.contains(&key) {
                    continue;
                }
                hidden.push(key);
                if flags.accepts(member.is_public, member.is_static) {
                    out.push(MemberCursor::new(
                        Arc::clone(universe),
                        index,
                        slot as u32,
                        self.handle.clone(),
                    ));
                }
            }

            if flags.contains(BindingFlags::DECLARED_ONLY) || kind == MemberKind::Constructor {
                break;
            }
            declared = false;
            current = def
                .base
                .as_ref()
                .and_then(TypeHandle::definition)
                .map(|base| base.index);
        }
        out
    }
}

impl AttributeProvider for ModelType {
    fn custom_attributes(&self, kind: Option<&AttributeKind>, inherit: bool) -> Vec<AttributeRef> {
        let Some(def) = self.def() else {
            return Vec::new();
        };
        let mut attributes: Vec<AttributeRef> = def
            .attributes
            .iter()
            .filter(|attr| matches_kind(attr, kind))
            .cloned()
            .collect();

        if inherit {
            let mut base = def.base.as_ref().and_then(TypeHandle::definition);
            while let Some(id) = base {
                let base_def = self.universe.type_def(id.index);
                attributes.extend(
                    base_def
                        .attributes
                        .iter()
                        .filter(|attr| attr.kind().is_inherited() && matches_kind(attr, kind))
                        .cloned(),
                );
                base = base_def.base.as_ref().and_then(TypeHandle::definition);
            }
        }
        attributes
    }
}

impl TypeDescription for ModelType {
    fn handle(&self) -> TypeHandle {
        self.handle.clone()
    }

    fn name(&self) -> String {
        match &self.handle {
            TypeHandle::Defined(id) | TypeHandle::Generic { definition: id, .. } => {
                self.universe.type_def(id.index).name.clone()
            }
            TypeHandle::Array { element, rank } => {
                format!("{}{}", self.wrap((**element).clone()).name(), array_suffix(*rank))
            }
            TypeHandle::Pointer(element) => format!("{}*", self.wrap((**element).clone()).name()),
            TypeHandle::ByRef(element) => format!("{}&", self.wrap((**element).clone()).name()),
        }
    }

    fn namespace(&self) -> Option<String> {
        self.root_def().namespace.clone()
    }

    fn full_name(&self) -> String {
        match &self.handle {
            TypeHandle::Defined(id) => {
                let def = self.universe.type_def(id.index);
                if def.kind == TypeKind::GenericParameter {
                    return def.name.clone();
                }
                match (def.declaring, &def.namespace) {
                    (Some(outer), _) => format!(
                        "{}+{}",
                        self.wrap(self.universe.defined(outer)).full_name(),
                        def.name
                    ),
                    (None, Some(namespace)) => format!("{}.{}", namespace, def.name),
                    (None, None) => def.name.clone(),
                }
            }
            TypeHandle::Generic {
                definition,
                arguments,
            } => {
                let arguments: Vec<String> = arguments
                    .iter()
                    .map(|arg| self.wrap(arg.clone()).full_name())
                    .collect();
                format!(
                    "{}[{}]",
                    self.wrap(TypeHandle::Defined(*definition)).full_name(),
                    arguments.join(", ")
                )
            }
            TypeHandle::Array { element, rank } => format!(
                "{}{}",
                self.wrap((**element).clone()).full_name(),
                array_suffix(*rank)
            ),
            TypeHandle::Pointer(element) => {
                format!("{}*", self.wrap((**element).clone()).full_name())
            }
            TypeHandle::ByRef(element) => {
                format!("{}&", self.wrap((**element).clone()).full_name())
            }
        }
    }

    fn kind(&self) -> TypeKind {
        self.kind_of(&self.handle)
    }

    fn is_public(&self) -> bool {
        self.root_def().is_public
    }

    fn assembly(&self) -> AssemblyRef {
        self.universe.assembly_ref(self.root_def().assembly)
    }

    fn base_type(&self) -> Option<TypeRef> {
        let def = self.def()?;
        self.base_of(def).map(|base| self.wrap(base))
    }

    fn declaring_type(&self) -> Option<TypeRef> {
        let def = self.def()?;
        def.declaring
            .map(|outer| self.wrap(self.universe.defined(outer)))
    }

    fn declaring_method(&self) -> Option<MethodRef> {
        let def = self.def()?;
        def.declaring_method
            .and_then(|method| self.universe.method(method))
    }

    fn element_type(&self) -> Option<TypeRef> {
        self.handle.element().map(|element| self.wrap(element.clone()))
    }

    fn enum_underlying_type(&self) -> MetaResult<TypeRef> {
        if self.kind() != TypeKind::Enum {
            return Err(MetaError::invalid_argument(format!(
                "{} is not an enum",
                self.full_name()
            )));
        }
        self.def()
            .and_then(|def| def.enum_underlying.clone())
            .map(|underlying| self.wrap(underlying))
            .ok_or_else(|| {
                MetaError::invalid_operation(format!(
                    "enum {} has no underlying type",
                    self.full_name()
                ))
            })
    }

    fn array_rank(&self) -> MetaResult<usize> {
        match &self.handle {
            TypeHandle::Array { rank, .. } => Ok(rank.unwrap_or(1) as usize),
            _ => Err(MetaError::invalid_argument(format!(
                "{} is not an array type",
                self.full_name()
            ))),
        }
    }

    fn is_generic_type_definition(&self) -> bool {
        matches!(self.handle, TypeHandle::Defined(_))
            && self.def().is_some_and(|def| !def.generic_parameters.is_empty())
    }

    fn generic_parameter_position(&self) -> Option<usize> {
        self.def().and_then(|def| def.generic_position)
    }

    fn generic_arguments(&self) -> Vec<TypeRef> {
        match &self.handle {
            TypeHandle::Defined(id) => self
                .universe
                .type_def(id.index)
                .generic_parameters
                .iter()
                .map(|&param| self.wrap(self.universe.defined(param)))
                .collect(),
            TypeHandle::Generic { arguments, .. } => arguments
                .iter()
                .map(|arg| self.wrap(arg.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn generic_type_arguments(&self) -> Vec<TypeRef> {
        match &self.handle {
            TypeHandle::Generic { arguments, .. } => arguments
                .iter()
                .map(|arg| self.wrap(arg.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn generic_parameter_constraints(&self) -> MetaResult<Vec<TypeRef>> {
        match self.def() {
            Some(def) if def.kind == TypeKind::GenericParameter => Ok(def
                .constraints
                .iter()
                .map(|constraint| self.wrap(constraint.clone()))
                .collect()),
            _ => Err(MetaError::invalid_operation(format!(
                "{} is not a generic parameter",
                self.full_name()
            ))),
        }
    }

    fn generic_type_definition(&self) -> MetaResult<TypeRef> {
        match &self.handle {
            TypeHandle::Generic { definition, .. } => Ok(self.wrap(TypeHandle::Defined(*definition))),
            TypeHandle::Defined(_) if self.is_generic_type_definition() => {
                Ok(self.wrap(self.handle.clone()))
            }
            _ => Err(MetaError::invalid_operation(format!(
                "{} is not a generic type",
                self.full_name()
            ))),
        }
    }

    fn interfaces(&self) -> Vec<TypeRef> {
        let mut handles = Vec::new();
        self.collect_interfaces(&self.handle, &mut handles);
        handles.into_iter().map(|iface| self.wrap(iface)).collect()
    }

    fn interface_map(&self, interface: &TypeRef) -> MetaResult<InterfaceMapping> {
        if self.kind() == TypeKind::Interface {
            return Err(MetaError::invalid_operation(format!(
                "interface map requested on interface {}",
                self.full_name()
            )));
        }
        let target = interface.handle();
        if !self.interfaces().iter().any(|iface| iface.handle() == target) {
            return Err(MetaError::invalid_argument(format!(
                "{} does not implement {}",
                self.full_name(),
                interface.full_name()
            )));
        }

        let interface_type = self.wrap(target);
        let lookup = BindingFlags::INSTANCE | BindingFlags::PUBLIC | BindingFlags::NON_PUBLIC;
        let candidates: Vec<(MethodKey, MethodRef)> = self
            .methods(lookup)
            .into_iter()
            .map(|method| (MethodKey::of(method.as_ref()), method))
            .collect();

        let mut interface_methods = Vec::new();
        let mut target_methods = Vec::new();
        for method in interface_type.methods(lookup | BindingFlags::DECLARED_ONLY) {
            let key = MethodKey::of(method.as_ref());
            if let Some((_, implementation)) = candidates.iter().find(|(k, _)| *k == key) {
                interface_methods.push(method);
                target_methods.push(Arc::clone(implementation));
            }
        }

        Ok(InterfaceMapping {
            target_type: self.wrap(self.handle.clone()),
            interface_type,
            interface_methods,
            target_methods,
        })
    }

    fn nested_types(&self, flags: BindingFlags) -> Vec<TypeRef> {
        let Some(def) = self.def() else {
            return Vec::new();
        };
        def.nested
            .iter()
            .filter(|&&nested| {
                let visibility = if self.universe.type_def(nested).is_public {
                    BindingFlags::PUBLIC
                } else {
                    BindingFlags::NON_PUBLIC
                };
                flags.contains(visibility)
            })
            .map(|&nested| self.wrap(self.universe.defined(nested)))
            .collect()
    }

    fn fields(&self, flags: BindingFlags) -> Vec<FieldRef> {
        self.collect(flags, MemberKind::Field)
            .into_iter()
            .map(MemberCursor::field)
            .collect()
    }

    fn properties(&self, flags: BindingFlags) -> Vec<PropertyRef> {
        self.collect(flags, MemberKind::Property)
            .into_iter()
            .map(MemberCursor::property)
            .collect()
    }

    fn methods(&self, flags: BindingFlags) -> Vec<MethodRef> {
        self.collect(flags, MemberKind::Method)
            .into_iter()
            .map(MemberCursor::method)
            .collect()
    }

    fn constructors(&self, flags: BindingFlags) -> Vec<MethodRef> {
        self.collect(flags, MemberKind::Constructor)
            .into_iter()
            .map(MemberCursor::method)
            .collect()
    }

    fn events(&self, flags: BindingFlags) -> Vec<EventRef> {
        self.collect(flags, MemberKind::Event)
            .into_iter()
            .map(MemberCursor::event)
            .collect()
    }

    fn make_array_type(&self, rank: Option<usize>) -> MetaResult<TypeRef> {
        if self.handle.is_by_ref() {
            return Err(MetaError::invalid_operation(format!(
                "cannot create an array of by-ref type {}",
                self.full_name()
            )));
        }
        let rank = match rank {
            None => None,
            Some(r) if r == 0 || r > MAX_ARRAY_RANK => {
                return Err(MetaError::invalid_argument(format!(
                    "array rank {} is out of range 1..={}",
                    r, MAX_ARRAY_RANK
                )))
            }
            Some(r) => Some(r as u32),
        };
        Ok(self.wrap(TypeHandle::Array {
            element: Box::new(self.handle.clone()),
            rank,
        }))
    }

    fn make_pointer_type(&self) -> MetaResult<TypeRef> {
        if self.handle.is_by_ref() {
            return Err(MetaError::invalid_operation(format!(
                "cannot create a pointer to by-ref type {}",
                self.full_name()
            )));
        }
        Ok(self.wrap(TypeHandle::Pointer(Box::new(self.handle.clone()))))
    }

    fn make_by_ref_type(&self) -> MetaResult<TypeRef> {
        if self.handle.is_by_ref() {
            return Err(MetaError::invalid_operation(format!(
                "cannot create a by-ref of by-ref type {}",
                self.full_name()
            )));
        }
        Ok(self.wrap(TypeHandle::ByRef(Box::new(self.handle.clone()))))
    }

    fn make_generic_type(&self, arguments: &[TypeRef]) -> MetaResult<TypeRef> {
        let definition = match (&self.handle, self.def()) {
            (TypeHandle::Defined(id), Some(def)) if !def.generic_parameters.is_empty() => {
                (*id, def.generic_parameters.len())
            }
            _ => {
                return Err(MetaError::invalid_operation(format!(
                    "{} is not a generic type definition",
                    self.full_name()
                )))
            }
        };
        let (id, arity) = definition;
        if arguments.len() != arity {
            return Err(MetaError::invalid_argument(format!(
                "{} expects {} type arguments, got {}",
                self.full_name(),
                arity,
                arguments.len()
            )));
        }

        let mut handles = Vec::with_capacity(arity);
        for argument in arguments {
            let handle = argument.handle();
            if !self.universe.handle_is_valid(&handle) {
                return Err(MetaError::invalid_argument(format!(
                    "type argument {} belongs to another universe",
                    handle
                )));
            }
            handles.push(handle);
        }
        Ok(self.wrap(TypeHandle::Generic {
            definition: id,
            arguments: handles,
        }))
    }

    fn is_assignable_from(&self, other: &TypeRef) -> bool {
        let source = other.handle();
        if !self.universe.handle_is_valid(&source) {
            return false;
        }
        self.handle_assignable(&self.handle, &source)
    }
}

// ============================================================================
// Assemblies
// ============================================================================

/// Description of one assembly in a [`Universe`]
#[derive(Clone)]
pub struct ModelAssembly {
    universe: Arc<Universe>,
    index: u32,
}

impl fmt::Debug for ModelAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAssembly")
            .field("index", &self.index)
            .field("name", &self.full_name())
            .finish()
    }
}

impl ModelAssembly {
    pub(crate) fn new(universe: Arc<Universe>, index: u32) -> Self {
        ModelAssembly { universe, index }
    }

    fn is_visible(&self, ty: u32) -> bool {
        let def = self.universe.type_def(ty);
        def.is_public && def.declaring.map_or(true, |outer| self.is_visible(outer))
    }
}

impl AttributeProvider for ModelAssembly {
    fn custom_attributes(&self, kind: Option<&AttributeKind>, _inherit: bool) -> Vec<AttributeRef> {
        self.universe
            .assembly_def(self.index)
            .attributes
            .iter()
            .filter(|attr| matches_kind(attr, kind))
            .cloned()
            .collect()
    }
}

impl AssemblyDescription for ModelAssembly {
    fn handle(&self) -> AssemblyHandle {
        AssemblyHandle(DefId::new(self.universe.id(), self.index))
    }

    fn name(&self) -> String {
        self.universe.assembly_def(self.index).name.clone()
    }

    fn version(&self) -> AssemblyVersion {
        self.universe.assembly_def(self.index).version
    }

    fn culture(&self) -> Option<String> {
        self.universe.assembly_def(self.index).culture.clone()
    }

    fn defined_types(&self) -> Vec<TypeRef> {
        self.universe
            .assembly_def(self.index)
            .types
            .iter()
            .map(|&ty| self.universe.type_ref(self.universe.defined(ty)))
            .collect()
    }

    fn exported_types(&self) -> Vec<TypeRef> {
        self.universe
            .assembly_def(self.index)
            .types
            .iter()
            .filter(|&&ty| self.is_visible(ty))
            .map(|&ty| self.universe.type_ref(self.universe.defined(ty)))
            .collect()
    }

    fn get_type(
        &self,
        name: &str,
        throw_on_error: bool,
        ignore_case: bool,
    ) -> MetaResult<Option<TypeRef>> {
        let found = self.defined_types().into_iter().find(|ty| {
            let full_name = ty.full_name();
            if ignore_case {
                full_name.eq_ignore_ascii_case(name)
            } else {
                full_name == name
            }
        });

        match found {
            None if throw_on_error => Err(MetaError::TypeNotFound {
                name: name.to_string(),
                assembly: self.full_name(),
            }),
            found => Ok(found),
        }
    }

    fn entry_point(&self) -> Option<MethodRef> {
        self.universe
            .assembly_def(self.index)
            .entry_point
            .and_then(|method| self.universe.method(method))
    }

    fn satellite_assembly(
        &self,
        culture: &str,
        version: Option<AssemblyVersion>,
    ) -> MetaResult<AssemblyRef> {
        let def = self.universe.assembly_def(self.index);
        def.satellites
            .iter()
            .copied()
            .find(|&satellite| {
                let sat = self.universe.assembly_def(satellite);
                sat.culture
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(culture))
                    && version.map_or(true, |v| sat.version == v)
            })
            .map(|satellite| self.universe.assembly_ref(satellite))
            .ok_or_else(|| MetaError::SatelliteNotFound {
                assembly: def.name.clone(),
                culture: culture.to_string(),
            })
    }
}
