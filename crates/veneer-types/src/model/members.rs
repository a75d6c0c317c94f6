//! Member and parameter descriptions over the arena

use std::fmt;
use std::sync::Arc;

use crate::attribute::{matches_kind, AttributeKind, AttributeRef};
use crate::describe::{
    AttributeProvider, EventDescription, EventRef, FieldDescription, FieldRef, MemberDescription,
    MemberRef, MethodDescription, MethodRef, ParameterDescription, ParameterRef,
    PropertyDescription, PropertyRef, TypeRef,
};
use crate::handle::{MemberKind, TypeHandle};

use super::defs::{MemberBody, MemberDef, MethodDef, ParamDef};
use super::Universe;

/// Position of one member in the arena plus the type it was reached from
#[derive(Clone)]
pub(crate) struct MemberCursor {
    universe: Arc<Universe>,
    declaring: u32,
    index: u32,
    reflected: TypeHandle,
}

impl MemberCursor {
    pub(crate) fn new(universe: Arc<Universe>, declaring: u32, index: u32, reflected: TypeHandle) -> Self {
        MemberCursor {
            universe,
            declaring,
            index,
            reflected,
        }
    }

    fn def(&self) -> &MemberDef {
        self.universe.member_def(self.declaring, self.index)
    }

    fn method_def(&self) -> Option<&MethodDef> {
        self.def().method()
    }

    /// Accessor of the same declaring type, reached through the same type
    fn sibling(&self, index: u32) -> MemberCursor {
        MemberCursor {
            universe: Arc::clone(&self.universe),
            declaring: self.declaring,
            index,
            reflected: self.reflected.clone(),
        }
    }

    fn type_ref(&self, handle: &TypeHandle) -> TypeRef {
        self.universe.type_ref(handle.clone())
    }

    fn own_attributes(&self, kind: Option<&AttributeKind>) -> Vec<AttributeRef> {
        self.def()
            .attributes
            .iter()
            .filter(|attr| matches_kind(attr, kind))
            .cloned()
            .collect()
    }

    pub(crate) fn field(self) -> FieldRef {
        Arc::new(ModelField(self))
    }

    pub(crate) fn property(self) -> PropertyRef {
        Arc::new(ModelProperty(self))
    }

    pub(crate) fn method(self) -> MethodRef {
        Arc::new(ModelMethod(self))
    }

    pub(crate) fn event(self) -> EventRef {
        Arc::new(ModelEvent(self))
    }

    pub(crate) fn into_member_ref(self) -> MemberRef {
        match self.def().kind() {
            MemberKind::Field => MemberRef::Field(self.field()),
            MemberKind::Property => MemberRef::Property(self.property()),
            MemberKind::Constructor => MemberRef::Constructor(self.method()),
            MemberKind::Event => MemberRef::Event(self.event()),
            _ => MemberRef::Method(self.method()),
        }
    }

    fn parameter(&self, position: i32) -> ParameterRef {
        Arc::new(ModelParameter {
            owner: self.clone(),
            position,
        })
    }
}

macro_rules! model_member {
    ($($name:ident => $doc:literal),* $(,)?) => {
        $(
            #[doc = $doc]
            #[derive(Clone)]
            pub struct $name(MemberCursor);

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($name))
                        .field("declaring", &self.0.declaring)
                        .field("name", &self.0.def().name)
                        .field("reflected", &self.0.reflected)
                        .finish()
                }
            }

            impl MemberDescription for $name {
                fn name(&self) -> String {
                    self.0.def().name.clone()
                }

                fn kind(&self) -> MemberKind {
                    self.0.def().kind()
                }

                fn metadata_token(&self) -> u32 {
                    self.0.index + 1
                }

                fn declaring_type(&self) -> Option<TypeRef> {
                    Some(self.0.type_ref(&self.0.universe.defined(self.0.declaring)))
                }

                fn reflected_type(&self) -> Option<TypeRef> {
                    Some(self.0.type_ref(&self.0.reflected))
                }

                fn is_public(&self) -> bool {
                    self.0.def().is_public
                }

                fn is_static(&self) -> bool {
                    self.0.def().is_static
                }
            }
        )*
    };
}

model_member!(
    ModelField => "Field of a universe type",
    ModelProperty => "Property of a universe type",
    ModelMethod => "Method or constructor of a universe type",
    ModelEvent => "Event of a universe type",
);

// ============================================================================
// Fields
// ============================================================================

impl AttributeProvider for ModelField {
    fn custom_attributes(&self, kind: Option<&AttributeKind>, _inherit: bool) -> Vec<AttributeRef> {
        self.0.own_attributes(kind)
    }
}

impl FieldDescription for ModelField {
    fn field_type(&self) -> TypeRef {
        match &self.0.def().body {
            MemberBody::Field { field_type } => self.0.type_ref(field_type),
            _ => self.0.type_ref(&self.0.universe.defined(self.0.declaring)),
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

impl AttributeProvider for ModelProperty {
    fn custom_attributes(&self, kind: Option<&AttributeKind>, _inherit: bool) -> Vec<AttributeRef> {
        self.0.own_attributes(kind)
    }
}

impl PropertyDescription for ModelProperty {
    fn property_type(&self) -> TypeRef {
        match &self.0.def().body {
            MemberBody::Property { property_type, .. } => self.0.type_ref(property_type),
            _ => self.0.type_ref(&self.0.universe.defined(self.0.declaring)),
        }
    }

    fn getter(&self) -> Option<MethodRef> {
        match &self.0.def().body {
            MemberBody::Property { getter, .. } => getter.map(|index| self.0.sibling(index).method()),
            _ => None,
        }
    }

    fn setter(&self) -> Option<MethodRef> {
        match &self.0.def().body {
            MemberBody::Property { setter, .. } => setter.map(|index| self.0.sibling(index).method()),
            _ => None,
        }
    }

    fn index_parameters(&self) -> Vec<ParameterRef> {
        match &self.0.def().body {
            MemberBody::Property {
                index_parameters, ..
            } => (0..index_parameters.len() as i32)
                .map(|position| self.0.parameter(position))
                .collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Methods and constructors
// ============================================================================

impl AttributeProvider for ModelMethod {
    /// With `inherit`, inheritable attributes of overridden declarations
    /// follow the method's own
    fn custom_attributes(&self, kind: Option<&AttributeKind>, inherit: bool) -> Vec<AttributeRef> {
        let mut attributes = self.0.own_attributes(kind);
        if !inherit {
            return attributes;
        }

        let mut current = self.0.method_def().and_then(|method| method.overrides);
        while let Some(base) = current {
            let (ty, index) = base.0.slot();
            let def = self.0.universe.member_def(ty, index);
            attributes.extend(
                def.attributes
                    .iter()
                    .filter(|attr| attr.kind().is_inherited() && matches_kind(attr, kind))
                    .cloned(),
            );
            current = def.method().and_then(|method| method.overrides);
        }
        attributes
    }
}

impl MethodDescription for ModelMethod {
    fn parameters(&self) -> Vec<ParameterRef> {
        self.0
            .method_def()
            .map(|method| {
                (0..method.parameters.len() as i32)
                    .map(|position| self.0.parameter(position))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn return_parameter(&self) -> Option<ParameterRef> {
        match self.0.def().body {
            MemberBody::Method(_) => Some(self.0.parameter(-1)),
            _ => None,
        }
    }

    fn return_type(&self) -> Option<TypeRef> {
        self.0
            .method_def()
            .and_then(|method| method.return_type.as_ref())
            .map(|ty| self.0.type_ref(ty))
    }

    fn generic_arguments(&self) -> Vec<TypeRef> {
        self.0
            .method_def()
            .map(|method| {
                method
                    .generic_parameters
                    .iter()
                    .map(|&param| self.0.type_ref(&self.0.universe.defined(param)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_virtual(&self) -> bool {
        self.0.method_def().is_some_and(|method| method.is_virtual)
    }

    fn base_definition(&self) -> Option<MethodRef> {
        let mut root = self.0.method_def()?.overrides?;
        loop {
            let (ty, index) = root.0.slot();
            match self
                .0
                .universe
                .member_def(ty, index)
                .method()
                .and_then(|method| method.overrides)
            {
                Some(next) => root = next,
                None => break,
            }
        }
        self.0.universe.method(root)
    }
}

// ============================================================================
// Events
// ============================================================================

impl AttributeProvider for ModelEvent {
    fn custom_attributes(&self, kind: Option<&AttributeKind>, _inherit: bool) -> Vec<AttributeRef> {
        self.0.own_attributes(kind)
    }
}

impl EventDescription for ModelEvent {
    fn handler_type(&self) -> Option<TypeRef> {
        match &self.0.def().body {
            MemberBody::Event { handler_type, .. } => {
                handler_type.as_ref().map(|ty| self.0.type_ref(ty))
            }
            _ => None,
        }
    }

    fn add_method(&self) -> Option<MethodRef> {
        match &self.0.def().body {
            MemberBody::Event { add, .. } => add.map(|index| self.0.sibling(index).method()),
            _ => None,
        }
    }

    fn remove_method(&self) -> Option<MethodRef> {
        match &self.0.def().body {
            MemberBody::Event { remove, .. } => remove.map(|index| self.0.sibling(index).method()),
            _ => None,
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Ordinal parameter, indexer parameter or return value of a universe member
#[derive(Clone)]
pub struct ModelParameter {
    owner: MemberCursor,
    position: i32,
}

impl fmt::Debug for ModelParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelParameter")
            .field("member", &self.owner.def().name)
            .field("position", &self.position)
            .finish()
    }
}

impl ModelParameter {
    fn param_def(&self) -> Option<&ParamDef> {
        let position = usize::try_from(self.position).ok()?;
        match &self.owner.def().body {
            MemberBody::Method(method) | MemberBody::Constructor(method) => {
                method.parameters.get(position)
            }
            MemberBody::Property {
                index_parameters, ..
            } => index_parameters.get(position),
            _ => None,
        }
    }
}

impl AttributeProvider for ModelParameter {
    fn custom_attributes(&self, kind: Option<&AttributeKind>, _inherit: bool) -> Vec<AttributeRef> {
        let attributes = if self.position == -1 {
            self.owner
                .method_def()
                .map(|method| method.return_attributes.as_slice())
        } else {
            self.param_def().map(|param| param.attributes.as_slice())
        };
        attributes
            .unwrap_or_default()
            .iter()
            .filter(|attr| matches_kind(attr, kind))
            .cloned()
            .collect()
    }
}

impl ParameterDescription for ModelParameter {
    fn name(&self) -> Option<String> {
        self.param_def().map(|param| param.name.clone())
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn parameter_type(&self) -> Option<TypeRef> {
        if self.position == -1 {
            return self
                .owner
                .method_def()
                .and_then(|method| method.return_type.as_ref())
                .map(|ty| self.owner.type_ref(ty));
        }
        self.param_def()
            .map(|param| self.owner.type_ref(&param.param_type))
    }

    fn member(&self) -> MemberRef {
        self.owner.clone().into_member_ref()
    }
}
