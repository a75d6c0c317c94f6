//! Mutable construction of a [`Universe`]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::attribute::{Attribute, AttributeRef};
use crate::error::{MetaError, MetaResult};
use crate::handle::{AssemblyVersion, DefId, TypeHandle, TypeKind};

use super::defs::{AssemblyDef, MemberBody, MemberDef, MethodDef, ParamDef, TypeDef};
use super::{handle_in_range, AssemblyIdx, EventIdx, FieldIdx, MemberIdx, MethodIdx, PropertyIdx, TypeIdx, Universe};

static NEXT_UNIVERSE_ID: AtomicU32 = AtomicU32::new(1);

/// Name given to every constructor
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// Collects assemblies, types and members, then freezes them into a
/// [`Universe`]
///
/// Misuse (an index from another builder, an accessor on another type, a
/// parameter position out of range) is recorded and reported by
/// [`UniverseBuilder::build`], so construction code stays free of `?`.
#[derive(Debug)]
pub struct UniverseBuilder {
    id: u32,
    assemblies: Vec<AssemblyDef>,
    types: Vec<TypeDef>,
    error: Option<MetaError>,
}

impl Default for UniverseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UniverseBuilder {
    /// Start an empty universe with a fresh id
    pub fn new() -> Self {
        UniverseBuilder {
            id: NEXT_UNIVERSE_ID.fetch_add(1, Ordering::Relaxed),
            assemblies: Vec::new(),
            types: Vec::new(),
            error: None,
        }
    }

    /// Id of the universe under construction
    pub fn id(&self) -> u32 {
        self.id
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(MetaError::invalid_argument(message));
        }
    }

    fn owns(&self, id: DefId) -> bool {
        id.universe == self.id
    }

    fn assembly_mut(&mut self, idx: AssemblyIdx) -> Option<&mut AssemblyDef> {
        if !self.owns(idx.0) || idx.0.index as usize >= self.assemblies.len() {
            self.fail(format!("assembly {} is not part of universe {}", idx.0, self.id));
            return None;
        }
        self.assemblies.get_mut(idx.0.index as usize)
    }

    fn type_mut(&mut self, idx: TypeIdx) -> Option<&mut TypeDef> {
        if !self.owns(idx.0) || idx.0.index as usize >= self.types.len() {
            self.fail(format!("type {} is not part of universe {}", idx.0, self.id));
            return None;
        }
        self.types.get_mut(idx.0.index as usize)
    }

    fn member_mut(&mut self, idx: MemberIdx) -> Option<&mut MemberDef> {
        let index = idx.index;
        let found = self
            .type_mut(idx.ty)
            .map(|def| def.members.get_mut(index as usize).is_some())
            .unwrap_or(false);
        if !found {
            self.fail(format!("member {} of type {} does not exist", index, idx.ty.0));
            return None;
        }
        self.type_mut(idx.ty)
            .and_then(|def| def.members.get_mut(index as usize))
    }

    fn method_mut(&mut self, idx: MethodIdx) -> Option<&mut MethodDef> {
        self.member_mut(idx.0).and_then(MemberDef::method_mut)
    }

    fn next_type(&self, index: usize) -> TypeIdx {
        TypeIdx(DefId::new(self.id, index as u32))
    }

    // ------------------------------------------------------------------------
    // Assemblies
    // ------------------------------------------------------------------------

    /// Add a culture-neutral assembly
    pub fn add_assembly(&mut self, name: &str, version: AssemblyVersion) -> AssemblyIdx {
        let index = self.assemblies.len() as u32;
        self.assemblies.push(AssemblyDef {
            name: name.to_string(),
            version,
            culture: None,
            attributes: Vec::new(),
            types: Vec::new(),
            entry_point: None,
            satellites: Vec::new(),
        });
        AssemblyIdx(DefId::new(self.id, index))
    }

    /// Add a satellite of `main` for `culture`, named `<main>.resources`
    pub fn add_satellite_assembly(
        &mut self,
        main: AssemblyIdx,
        culture: &str,
        version: AssemblyVersion,
    ) -> AssemblyIdx {
        let name = match self.assembly_mut(main) {
            Some(def) => format!("{}.resources", def.name),
            None => return main,
        };
        let satellite = self.add_assembly(&name, version);
        if let Some(def) = self.assemblies.get_mut(satellite.0.index as usize) {
            def.culture = Some(culture.to_string());
        }
        if let Some(def) = self.assembly_mut(main) {
            def.satellites.push(satellite.0.index);
        }
        satellite
    }

    /// Attach an attribute to an assembly
    pub fn add_assembly_attribute(&mut self, assembly: AssemblyIdx, attribute: Attribute) {
        if let Some(def) = self.assembly_mut(assembly) {
            def.attributes.push(attribute.into_ref());
        }
    }

    /// Mark `method` as the assembly's entry point
    pub fn set_entry_point(&mut self, assembly: AssemblyIdx, method: MethodIdx) {
        if let Some(def) = self.assembly_mut(assembly) {
            def.entry_point = Some(method);
        }
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    /// Add a top-level type; an empty namespace is the global one
    pub fn add_type(
        &mut self,
        assembly: AssemblyIdx,
        namespace: &str,
        name: &str,
        kind: TypeKind,
    ) -> TypeIdx {
        let idx = self.next_type(self.types.len());
        let namespace = (!namespace.is_empty()).then(|| namespace.to_string());
        self.types
            .push(TypeDef::new(name, namespace, kind, assembly.0.index));
        if let Some(def) = self.assembly_mut(assembly) {
            def.types.push(idx.0.index);
        }
        idx
    }

    /// Add a type nested in `outer`
    pub fn add_nested_type(&mut self, outer: TypeIdx, name: &str, kind: TypeKind) -> TypeIdx {
        let idx = self.next_type(self.types.len());
        let Some(outer_def) = self.type_mut(outer) else {
            return outer;
        };
        outer_def.nested.push(idx.0.index);
        let mut def = TypeDef::new(name, outer_def.namespace.clone(), kind, outer_def.assembly);
        def.declaring = Some(outer.0.index);
        let assembly = def.assembly;
        self.types.push(def);
        if let Some(asm) = self.assemblies.get_mut(assembly as usize) {
            asm.types.push(idx.0.index);
        }
        idx
    }

    /// Add the next generic parameter of a generic type definition
    pub fn add_generic_parameter(&mut self, owner: TypeIdx, name: &str) -> TypeIdx {
        let idx = self.next_type(self.types.len());
        let Some(owner_def) = self.type_mut(owner) else {
            return owner;
        };
        let position = owner_def.generic_parameters.len();
        owner_def.generic_parameters.push(idx.0.index);
        let mut def = TypeDef::new(
            name,
            owner_def.namespace.clone(),
            TypeKind::GenericParameter,
            owner_def.assembly,
        );
        def.declaring = Some(owner.0.index);
        def.generic_position = Some(position);
        self.types.push(def);
        idx
    }

    /// Add the next generic parameter of a generic method definition
    pub fn add_method_generic_parameter(&mut self, method: MethodIdx, name: &str) -> TypeIdx {
        let idx = self.next_type(self.types.len());
        let Some(method_def) = self.method_mut(method) else {
            return method.declaring();
        };
        let position = method_def.generic_parameters.len();
        method_def.generic_parameters.push(idx.0.index);

        let owner = method.declaring();
        let Some(owner_def) = self.type_mut(owner) else {
            return owner;
        };
        let mut def = TypeDef::new(
            name,
            owner_def.namespace.clone(),
            TypeKind::GenericParameter,
            owner_def.assembly,
        );
        def.declaring = Some(owner.0.index);
        def.declaring_method = Some(method);
        def.generic_position = Some(position);
        self.types.push(def);
        idx
    }

    /// Change a type's visibility (types are public by default)
    pub fn set_public(&mut self, ty: TypeIdx, is_public: bool) {
        if let Some(def) = self.type_mut(ty) {
            def.is_public = is_public;
        }
    }

    /// Set the base class
    pub fn set_base_type(&mut self, ty: TypeIdx, base: impl Into<TypeHandle>) {
        if let Some(def) = self.type_mut(ty) {
            def.base = Some(base.into());
        }
    }

    /// Add a directly implemented interface
    pub fn add_interface(&mut self, ty: TypeIdx, interface: impl Into<TypeHandle>) {
        if let Some(def) = self.type_mut(ty) {
            def.interfaces.push(interface.into());
        }
    }

    /// Add a constraint to a generic parameter
    pub fn add_constraint(&mut self, parameter: TypeIdx, constraint: impl Into<TypeHandle>) {
        if let Some(def) = self.type_mut(parameter) {
            def.constraints.push(constraint.into());
        }
    }

    /// Set the underlying integral type of an enum
    pub fn set_enum_underlying_type(&mut self, ty: TypeIdx, underlying: impl Into<TypeHandle>) {
        if let Some(def) = self.type_mut(ty) {
            def.enum_underlying = Some(underlying.into());
        }
    }

    /// Attach an attribute to a type
    pub fn add_type_attribute(&mut self, ty: TypeIdx, attribute: Attribute) {
        if let Some(def) = self.type_mut(ty) {
            def.attributes.push(attribute.into_ref());
        }
    }

    // ------------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------------

    fn push_member(&mut self, ty: TypeIdx, name: &str, body: MemberBody) -> MemberIdx {
        let index = match self.type_mut(ty) {
            Some(def) => {
                def.members.push(MemberDef {
                    name: name.to_string(),
                    is_public: true,
                    is_static: false,
                    attributes: Vec::new(),
                    body,
                });
                def.members.len() as u32 - 1
            }
            None => u32::MAX,
        };
        MemberIdx { ty, index }
    }

    fn params(parameters: &[(&str, TypeHandle)]) -> Vec<ParamDef> {
        parameters
            .iter()
            .map(|(name, param_type)| ParamDef {
                name: name.to_string(),
                param_type: param_type.clone(),
                attributes: Vec::new(),
            })
            .collect()
    }

    fn method_body(parameters: &[(&str, TypeHandle)], return_type: Option<TypeHandle>) -> MethodDef {
        MethodDef {
            parameters: Self::params(parameters),
            return_type,
            return_attributes: Vec::new(),
            generic_parameters: Vec::new(),
            is_virtual: false,
            overrides: None,
        }
    }

    /// Add a public instance field
    pub fn add_field(&mut self, ty: TypeIdx, name: &str, field_type: impl Into<TypeHandle>) -> FieldIdx {
        let body = MemberBody::Field {
            field_type: field_type.into(),
        };
        FieldIdx(self.push_member(ty, name, body))
    }

    /// Add a public instance property without accessors
    pub fn add_property(
        &mut self,
        ty: TypeIdx,
        name: &str,
        property_type: impl Into<TypeHandle>,
    ) -> PropertyIdx {
        self.add_indexer(ty, name, property_type, &[])
    }

    /// Add a property taking index parameters
    pub fn add_indexer(
        &mut self,
        ty: TypeIdx,
        name: &str,
        property_type: impl Into<TypeHandle>,
        parameters: &[(&str, TypeHandle)],
    ) -> PropertyIdx {
        let body = MemberBody::Property {
            property_type: property_type.into(),
            getter: None,
            setter: None,
            index_parameters: Self::params(parameters),
        };
        PropertyIdx(self.push_member(ty, name, body))
    }

    /// Add a public instance method; `None` returns void
    pub fn add_method(
        &mut self,
        ty: TypeIdx,
        name: &str,
        parameters: &[(&str, TypeHandle)],
        return_type: Option<TypeHandle>,
    ) -> MethodIdx {
        let body = MemberBody::Method(Self::method_body(parameters, return_type));
        MethodIdx(self.push_member(ty, name, body))
    }

    /// Add a public instance constructor
    pub fn add_constructor(&mut self, ty: TypeIdx, parameters: &[(&str, TypeHandle)]) -> MethodIdx {
        let body = MemberBody::Constructor(Self::method_body(parameters, None));
        MethodIdx(self.push_member(ty, CONSTRUCTOR_NAME, body))
    }

    /// Add a public instance event without accessors
    pub fn add_event(&mut self, ty: TypeIdx, name: &str, handler_type: Option<TypeHandle>) -> EventIdx {
        let body = MemberBody::Event {
            handler_type,
            add: None,
            remove: None,
        };
        EventIdx(self.push_member(ty, name, body))
    }

    fn accessor_slot(&mut self, owner: TypeIdx, accessor: Option<MethodIdx>) -> Option<u32> {
        let accessor = accessor?;
        if accessor.declaring() != owner {
            self.fail(format!(
                "accessor {} is not declared on {}",
                accessor.0.index, owner.0
            ));
            return None;
        }
        Some(accessor.0.index)
    }

    /// Set the get/set accessors of a property
    pub fn set_accessors(
        &mut self,
        property: PropertyIdx,
        getter: Option<MethodIdx>,
        setter: Option<MethodIdx>,
    ) {
        let get = self.accessor_slot(property.declaring(), getter);
        let set = self.accessor_slot(property.declaring(), setter);
        if let Some(MemberDef {
            body: MemberBody::Property { getter, setter, .. },
            ..
        }) = self.member_mut(property.0)
        {
            *getter = get;
            *setter = set;
        }
    }

    /// Set the add/remove accessors of an event
    pub fn set_event_accessors(
        &mut self,
        event: EventIdx,
        add_method: Option<MethodIdx>,
        remove_method: Option<MethodIdx>,
    ) {
        let add_slot = self.accessor_slot(event.declaring(), add_method);
        let remove_slot = self.accessor_slot(event.declaring(), remove_method);
        if let Some(MemberDef {
            body: MemberBody::Event { add, remove, .. },
            ..
        }) = self.member_mut(event.0)
        {
            *add = add_slot;
            *remove = remove_slot;
        }
    }

    /// Make a member static or instance
    pub fn set_static(&mut self, member: impl Into<MemberIdx>, is_static: bool) {
        if let Some(def) = self.member_mut(member.into()) {
            def.is_static = is_static;
        }
    }

    /// Change a member's visibility (members are public by default)
    pub fn set_member_public(&mut self, member: impl Into<MemberIdx>, is_public: bool) {
        if let Some(def) = self.member_mut(member.into()) {
            def.is_public = is_public;
        }
    }

    /// Make a method virtual
    pub fn set_virtual(&mut self, method: MethodIdx, is_virtual: bool) {
        if let Some(def) = self.method_mut(method) {
            def.is_virtual = is_virtual;
        }
    }

    /// Declare `method` as an override of `base`, making both virtual
    pub fn set_override(&mut self, method: MethodIdx, base: MethodIdx) {
        if method.declaring() == base.declaring() {
            self.fail(format!(
                "method {} can not override a method of its own type",
                method.0.index
            ));
            return;
        }
        self.set_virtual(base, true);
        if let Some(def) = self.method_mut(method) {
            def.is_virtual = true;
            def.overrides = Some(base);
        }
    }

    /// Attach an attribute to a member
    pub fn add_member_attribute(&mut self, member: impl Into<MemberIdx>, attribute: Attribute) {
        if let Some(def) = self.member_mut(member.into()) {
            def.attributes.push(attribute.into_ref());
        }
    }

    /// Attach an attribute to a parameter; position -1 is the return value
    pub fn add_parameter_attribute(&mut self, method: MethodIdx, position: i32, attribute: Attribute) {
        let attribute: AttributeRef = attribute.into_ref();
        let target = self.member_mut(method.0).and_then(|member| {
            let returns_value = matches!(member.body, MemberBody::Method(_));
            let def = member.method_mut()?;
            if position == -1 {
                return returns_value.then_some(&mut def.return_attributes);
            }
            let position = usize::try_from(position).ok()?;
            def.parameters
                .get_mut(position)
                .map(|param| &mut param.attributes)
        });
        match target {
            Some(attributes) => attributes.push(attribute),
            None => self.fail(format!(
                "method {} has no parameter at position {}",
                method.0.index, position
            )),
        }
    }

    // ------------------------------------------------------------------------
    // Freezing
    // ------------------------------------------------------------------------

    /// Type definitions a definition derives from: base, interfaces and
    /// constraints
    fn supertypes(def: &TypeDef) -> impl Iterator<Item = DefId> + '_ {
        def.base
            .iter()
            .chain(def.interfaces.iter())
            .chain(def.constraints.iter())
            .filter_map(TypeHandle::definition)
    }

    fn check_acyclic(&self) -> MetaResult<()> {
        // 0 = unvisited, 1 = on stack, 2 = done
        let mut state = vec![0u8; self.types.len()];
        for start in 0..self.types.len() {
            if state[start] != 0 {
                continue;
            }
            let mut stack: Vec<(usize, Vec<DefId>)> = Vec::new();
            state[start] = 1;
            stack.push((start, Self::supertypes(&self.types[start]).collect()));
            while let Some((current, pending)) = stack.last_mut() {
                let current = *current;
                match pending.pop() {
                    Some(next) => {
                        let next = next.index as usize;
                        match state.get(next).copied() {
                            Some(1) => {
                                return Err(MetaError::invalid_argument(format!(
                                    "type {} derives from itself",
                                    self.types[next].name
                                )))
                            }
                            Some(0) => {
                                state[next] = 1;
                                stack.push((next, Self::supertypes(&self.types[next]).collect()));
                            }
                            _ => {}
                        }
                    }
                    None => {
                        state[current] = 2;
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    fn check_overrides(&self) -> MetaResult<()> {
        for def in &self.types {
            for member in &def.members {
                let mut seen = FxHashSet::default();
                let mut current = member.method().and_then(|method| method.overrides);
                while let Some(base) = current {
                    if !seen.insert(base) {
                        return Err(MetaError::invalid_argument(format!(
                            "override chain of {} is cyclic",
                            member.name
                        )));
                    }
                    current = self
                        .types
                        .get(base.0.ty.0.index as usize)
                        .and_then(|ty| ty.members.get(base.0.index as usize))
                        .and_then(MemberDef::method)
                        .and_then(|method| method.overrides);
                }
            }
        }
        Ok(())
    }

    fn referenced_handles(&self) -> Vec<&TypeHandle> {
        let mut handles: Vec<&TypeHandle> = Vec::new();
        for def in &self.types {
            handles.extend(def.base.iter());
            handles.extend(def.interfaces.iter());
            handles.extend(def.constraints.iter());
            handles.extend(def.enum_underlying.iter());
            for member in &def.members {
                match &member.body {
                    MemberBody::Field { field_type } => handles.push(field_type),
                    MemberBody::Property {
                        property_type,
                        index_parameters,
                        ..
                    } => {
                        handles.push(property_type);
                        handles.extend(index_parameters.iter().map(|p| &p.param_type));
                    }
                    MemberBody::Method(method) | MemberBody::Constructor(method) => {
                        handles.extend(method.return_type.iter());
                        handles.extend(method.parameters.iter().map(|p| &p.param_type));
                    }
                    MemberBody::Event { handler_type, .. } => handles.extend(handler_type.iter()),
                }
            }
        }
        handles
    }

    /// Validate and freeze
    pub fn build(self) -> MetaResult<Arc<Universe>> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if let Some(bad) = self
            .referenced_handles()
            .into_iter()
            .find(|h| !handle_in_range(self.id, self.types.len(), h))
        {
            return Err(MetaError::invalid_argument(format!(
                "type handle {} does not belong to universe {}",
                bad, self.id
            )));
        }
        self.check_acyclic()?;
        self.check_overrides()?;

        let universe = Universe {
            id: self.id,
            assemblies: self.assemblies,
            types: self.types,
        };

        let missing_entry_point = universe
            .assemblies
            .iter()
            .filter_map(|asm| asm.entry_point)
            .find(|method| {
                universe
                    .types
                    .get(method.0.ty.0.index as usize)
                    .and_then(|ty| ty.members.get(method.0.index as usize))
                    .is_none()
            });
        if let Some(method) = missing_entry_point {
            return Err(MetaError::invalid_argument(format!(
                "entry point {} of type {} does not exist",
                method.0.index, method.0.ty.0
            )));
        }

        debug!(
            universe = universe.id,
            assemblies = universe.assemblies.len(),
            types = universe.types.len(),
            "universe built"
        );
        Ok(Arc::new(universe))
    }
}
