//! Projected parameters

use std::fmt;

use veneer_types::{
    AttributeKind, AttributeProvider, AttributeRef, ContextId, MemberIdentity, MemberRef,
    ParameterDescription, ParameterIdentity, ParameterRef, TypeRef,
};

use crate::context::{Entity, ProjectionContext};

/// A real parameter or return value seen through a [`ProjectionContext`]
pub struct ProjectedParameter {
    real: ParameterRef,
    context: ProjectionContext,
}

impl ProjectedParameter {
    pub(crate) fn new(real: ParameterRef, context: ProjectionContext) -> Self {
        ProjectedParameter { real, context }
    }

    /// The wrapped parameter
    pub fn real(&self) -> &ParameterRef {
        &self.real
    }
}

impl fmt::Debug for ProjectedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedParameter")
            .field("real", &self.real)
            .field("context", &self.context.id())
            .finish()
    }
}

impl AttributeProvider for ProjectedParameter {
    fn custom_attributes(&self, kind: Option<&AttributeKind>, inherit: bool) -> Vec<AttributeRef> {
        self.context
            .custom_attributes(Entity::Parameter(self.real.as_ref()), kind, inherit)
    }

    fn is_defined(&self, kind: &AttributeKind, inherit: bool) -> bool {
        self.context
            .is_attribute_defined(Entity::Parameter(self.real.as_ref()), kind, inherit)
    }
}

impl ParameterDescription for ProjectedParameter {
    fn name(&self) -> Option<String> {
        self.real.name()
    }

    fn position(&self) -> i32 {
        self.real.position()
    }

    fn parameter_type(&self) -> Option<TypeRef> {
        self.context.map_type_opt(self.real.parameter_type())
    }

    fn member(&self) -> MemberRef {
        self.context.map_member(&self.real.member())
    }

    fn context(&self) -> Option<ContextId> {
        Some(self.context.id())
    }

    fn identity(&self) -> ParameterIdentity {
        let real = self.real.identity();
        ParameterIdentity {
            member: MemberIdentity {
                contexts: real.member.contexts.through(self.context.id()),
                ..real.member
            },
            position: real.position,
        }
    }
}
