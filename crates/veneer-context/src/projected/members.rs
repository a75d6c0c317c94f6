//! Projected members
//!
//! Fields, properties, methods, constructors and events share one shape: the
//! wrapped member plus the owning context. Their identity is the wrapped
//! member's identity extended by the context, so two proxies of one member
//! compare equal even though members are not memoized.

use std::fmt;

use veneer_types::{
    AttributeKind, AttributeProvider, AttributeRef, ContextId, EventDescription, EventRef,
    FieldDescription, FieldRef, MemberDescription, MemberIdentity, MemberKind, MemberRef,
    MethodDescription, MethodRef, ParameterRef, PropertyDescription, PropertyRef, TypeRef,
};

use crate::context::{Entity, ProjectionContext};

macro_rules! projected_member {
    ($($name:ident($real:ty) => $wrap:expr, $doc:literal);* $(;)?) => {
        $(
            #[doc = $doc]
            pub struct $name {
                real: $real,
                context: ProjectionContext,
            }

            impl $name {
                pub(crate) fn new(real: $real, context: ProjectionContext) -> Self {
                    $name { real, context }
                }

                /// The wrapped member
                pub fn real(&self) -> &$real {
                    &self.real
                }

                fn as_member_ref(&self) -> MemberRef {
                    ($wrap)(self.real.clone())
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($name))
                        .field("real", &self.real)
                        .field("context", &self.context.id())
                        .finish()
                }
            }

            impl AttributeProvider for $name {
                fn custom_attributes(
                    &self,
                    kind: Option<&AttributeKind>,
                    inherit: bool,
                ) -> Vec<AttributeRef> {
                    let member = self.as_member_ref();
                    self.context
                        .custom_attributes(Entity::Member(&member), kind, inherit)
                }

                fn is_defined(&self, kind: &AttributeKind, inherit: bool) -> bool {
                    let member = self.as_member_ref();
                    self.context
                        .is_attribute_defined(Entity::Member(&member), kind, inherit)
                }
            }

            impl MemberDescription for $name {
                fn name(&self) -> String {
                    self.real.name()
                }

                fn kind(&self) -> MemberKind {
                    self.real.kind()
                }

                fn metadata_token(&self) -> u32 {
                    self.real.metadata_token()
                }

                fn declaring_type(&self) -> Option<TypeRef> {
                    self.context.map_type_opt(self.real.declaring_type())
                }

                fn reflected_type(&self) -> Option<TypeRef> {
                    self.context.map_type_opt(self.real.reflected_type())
                }

                fn is_public(&self) -> bool {
                    self.real.is_public()
                }

                fn is_static(&self) -> bool {
                    self.real.is_static()
                }

                fn context(&self) -> Option<ContextId> {
                    Some(self.context.id())
                }

                fn identity(&self) -> MemberIdentity {
                    let real = self.real.identity();
                    MemberIdentity {
                        contexts: real.contexts.through(self.context.id()),
                        ..real
                    }
                }
            }
        )*
    };
}

projected_member!(
    ProjectedField(FieldRef) => MemberRef::Field, "A real field seen through a [`ProjectionContext`]";
    ProjectedProperty(PropertyRef) => MemberRef::Property, "A real property seen through a [`ProjectionContext`]";
    ProjectedMethod(MethodRef) => MemberRef::from_method, "A real method or constructor seen through a [`ProjectionContext`]";
    ProjectedEvent(EventRef) => MemberRef::Event, "A real event seen through a [`ProjectionContext`]";
);

impl FieldDescription for ProjectedField {
    fn field_type(&self) -> TypeRef {
        self.context.map_type(&self.real.field_type())
    }
}

impl PropertyDescription for ProjectedProperty {
    fn property_type(&self) -> TypeRef {
        self.context.map_type(&self.real.property_type())
    }

    fn getter(&self) -> Option<MethodRef> {
        self.real
            .getter()
            .map(|getter| self.context.map_method(&getter))
    }

    fn setter(&self) -> Option<MethodRef> {
        self.real
            .setter()
            .map(|setter| self.context.map_method(&setter))
    }

    fn index_parameters(&self) -> Vec<ParameterRef> {
        self.context.map_parameters(self.real.index_parameters())
    }
}

impl MethodDescription for ProjectedMethod {
    fn parameters(&self) -> Vec<ParameterRef> {
        self.context.map_parameters(self.real.parameters())
    }

    fn return_parameter(&self) -> Option<ParameterRef> {
        self.real
            .return_parameter()
            .map(|parameter| self.context.map_parameter(&parameter))
    }

    fn return_type(&self) -> Option<TypeRef> {
        self.context.map_type_opt(self.real.return_type())
    }

    fn generic_arguments(&self) -> Vec<TypeRef> {
        self.context.map_types(self.real.generic_arguments())
    }

    fn is_virtual(&self) -> bool {
        self.real.is_virtual()
    }

    fn base_definition(&self) -> Option<MethodRef> {
        self.real
            .base_definition()
            .map(|method| self.context.map_method(&method))
    }
}

impl EventDescription for ProjectedEvent {
    fn handler_type(&self) -> Option<TypeRef> {
        self.context.map_type_opt(self.real.handler_type())
    }

    fn add_method(&self) -> Option<MethodRef> {
        self.real
            .add_method()
            .map(|method| self.context.map_method(&method))
    }

    fn remove_method(&self) -> Option<MethodRef> {
        self.real
            .remove_method()
            .map(|method| self.context.map_method(&method))
    }
}
