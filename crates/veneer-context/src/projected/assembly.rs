//! Projected assemblies

use std::fmt;

use veneer_types::{
    AssemblyDescription, AssemblyHandle, AssemblyIdentity, AssemblyRef, AssemblyVersion,
    AttributeKind, AttributeProvider, AttributeRef, ContextId, MetaResult, MethodRef, TypeRef,
};

use crate::context::{Entity, ProjectionContext};

/// A real assembly seen through a [`ProjectionContext`]
///
/// Assemblies carry no overlay; their attribute queries report the real
/// attributes plus the context marker.
pub struct ProjectedAssembly {
    real: AssemblyRef,
    context: ProjectionContext,
}

impl ProjectedAssembly {
    pub(crate) fn new(real: AssemblyRef, context: ProjectionContext) -> Self {
        ProjectedAssembly { real, context }
    }

    /// The wrapped assembly
    pub fn real(&self) -> &AssemblyRef {
        &self.real
    }
}

impl fmt::Debug for ProjectedAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedAssembly")
            .field("real", &self.real)
            .field("context", &self.context.id())
            .finish()
    }
}

impl AttributeProvider for ProjectedAssembly {
    fn custom_attributes(&self, kind: Option<&AttributeKind>, inherit: bool) -> Vec<AttributeRef> {
        self.context
            .custom_attributes(Entity::Assembly(self.real.as_ref()), kind, inherit)
    }

    fn is_defined(&self, kind: &AttributeKind, inherit: bool) -> bool {
        self.context
            .is_attribute_defined(Entity::Assembly(self.real.as_ref()), kind, inherit)
    }
}

impl AssemblyDescription for ProjectedAssembly {
    fn handle(&self) -> AssemblyHandle {
        self.real.handle()
    }

    fn context(&self) -> Option<ContextId> {
        Some(self.context.id())
    }

    fn identity(&self) -> AssemblyIdentity {
        let real = self.real.identity();
        AssemblyIdentity {
            contexts: real.contexts.through(self.context.id()),
            ..real
        }
    }

    fn projected_from(&self) -> Option<AssemblyRef> {
        Some(self.real.clone())
    }

    fn name(&self) -> String {
        self.real.name()
    }

    fn version(&self) -> AssemblyVersion {
        self.real.version()
    }

    fn culture(&self) -> Option<String> {
        self.real.culture()
    }

    fn full_name(&self) -> String {
        self.real.full_name()
    }

    fn defined_types(&self) -> Vec<TypeRef> {
        self.context.map_types(self.real.defined_types())
    }

    fn exported_types(&self) -> Vec<TypeRef> {
        self.context.map_types(self.real.exported_types())
    }

    fn get_type(
        &self,
        name: &str,
        throw_on_error: bool,
        ignore_case: bool,
    ) -> MetaResult<Option<TypeRef>> {
        let found = self.real.get_type(name, throw_on_error, ignore_case)?;
        Ok(self.context.map_type_opt(found))
    }

    fn entry_point(&self) -> Option<MethodRef> {
        self.real
            .entry_point()
            .map(|method| self.context.map_method(&method))
    }

    fn satellite_assembly(
        &self,
        culture: &str,
        version: Option<AssemblyVersion>,
    ) -> MetaResult<AssemblyRef> {
        let satellite = self.real.satellite_assembly(culture, version)?;
        Ok(self.context.map_assembly(&satellite))
    }
}
