//! Member resolution from quoted access expressions
//!
//! An [`AccessExpr`] is the data form of an expression like `x => x.Name`
//! or `x => x.Speak()`: the member it binds to (as a compiler would bind it,
//! usually to the root declaration) plus the static type of the receiver.
//! Resolution re-targets the bound member at the receiver type so the result
//! matches what a by-name lookup on that type would return.

use std::fmt;

use crate::describe::{
    FieldRef, MemberDescription, MemberRef, MethodDescription, MethodRef, PropertyDescription,
    PropertyRef, TypeRef,
};
use crate::error::{MetaError, MetaResult};
use crate::flags::BindingFlags;
use crate::handle::{MemberKind, TypeHandle};

/// Quoted member access
#[derive(Debug, Clone)]
pub enum AccessExpr {
    /// `receiver.Property`; `None` receiver for a static access
    Property {
        /// Static type of the receiver
        receiver: Option<TypeRef>,
        /// Bound property
        property: PropertyRef,
    },
    /// `receiver.Field`
    Field {
        /// Static type of the receiver
        receiver: Option<TypeRef>,
        /// Bound field
        field: FieldRef,
    },
    /// `receiver.Method(...)`
    Call {
        /// Static type of the receiver
        receiver: Option<TypeRef>,
        /// Bound method
        method: MethodRef,
    },
    /// `new T(...)`
    New {
        /// Bound constructor
        constructor: MethodRef,
    },
    /// Conversion or boxing of an inner expression
    Convert(Box<AccessExpr>),
    /// Any other expression, kept as text for diagnostics
    Other(String),
}

impl AccessExpr {
    /// Property access on a receiver
    pub fn property(receiver: &TypeRef, property: &PropertyRef) -> Self {
        AccessExpr::Property {
            receiver: Some(receiver.clone()),
            property: property.clone(),
        }
    }

    /// Field access on a receiver
    pub fn field(receiver: &TypeRef, field: &FieldRef) -> Self {
        AccessExpr::Field {
            receiver: Some(receiver.clone()),
            field: field.clone(),
        }
    }

    /// Method call on a receiver
    pub fn call(receiver: &TypeRef, method: &MethodRef) -> Self {
        AccessExpr::Call {
            receiver: Some(receiver.clone()),
            method: method.clone(),
        }
    }

    /// Wrap in a conversion
    pub fn convert(self) -> Self {
        AccessExpr::Convert(Box::new(self))
    }
}

fn receiver_name(receiver: &Option<TypeRef>, member: &dyn MemberDescription) -> String {
    receiver
        .as_ref()
        .or(member.declaring_type().as_ref())
        .map(|ty| ty.name())
        .unwrap_or_default()
}

impl fmt::Display for AccessExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessExpr::Property { receiver, property } => {
                write!(f, "{}.{}", receiver_name(receiver, property.as_ref()), property.name())
            }
            AccessExpr::Field { receiver, field } => {
                write!(f, "{}.{}", receiver_name(receiver, field.as_ref()), field.name())
            }
            AccessExpr::Call { receiver, method } => {
                write!(f, "{}.{}(..)", receiver_name(receiver, method.as_ref()), method.name())
            }
            AccessExpr::New { constructor } => write!(
                f,
                "new {}(..)",
                constructor
                    .declaring_type()
                    .map(|ty| ty.name())
                    .unwrap_or_default()
            ),
            AccessExpr::Convert(inner) => write!(f, "Convert({})", inner),
            AccessExpr::Other(text) => f.write_str(text),
        }
    }
}

/// Declaration a member description denotes, independent of the type it
/// was reached through
fn declaration(member: &dyn MemberDescription) -> (Option<TypeHandle>, MemberKind, u32) {
    (
        member.declaring_type().map(|ty| ty.handle()),
        member.kind(),
        member.metadata_token(),
    )
}

fn method_root(method: &MethodRef) -> (Option<TypeHandle>, MemberKind, u32) {
    match method.base_definition() {
        Some(root) => declaration(root.as_ref()),
        None => declaration(method.as_ref()),
    }
}

/// Root declaration of a property: that of its first accessor, or the
/// property itself when it has none
fn property_root(property: &PropertyRef) -> (Option<TypeHandle>, MemberKind, u32) {
    match property.getter().or_else(|| property.setter()) {
        Some(accessor) => method_root(&accessor),
        None => declaration(property.as_ref()),
    }
}

fn search_flags(declared_only: bool) -> BindingFlags {
    if declared_only {
        BindingFlags::ALL | BindingFlags::DECLARED_ONLY
    } else {
        BindingFlags::ALL
    }
}

/// Pick `found` or fall back to the bound member, honoring `declared_only`
fn settle<T>(
    found: Option<T>,
    bound: T,
    declared_only: bool,
    owner: &TypeRef,
    member: &dyn MemberDescription,
) -> MetaResult<T> {
    match found {
        Some(found) => Ok(found),
        None if declared_only => Err(MetaError::Unresolvable {
            member: member.name(),
            owner: owner.full_name(),
            declaring: member
                .declaring_type()
                .map(|ty| ty.full_name())
                .unwrap_or_default(),
        }),
        None => Ok(bound),
    }
}

/// Resolve `expr` to the member it accesses
///
/// A property or method bound to a base declaration is re-targeted at the
/// receiver type. With `declared_only`, a member the receiver type does not
/// itself declare is [`MetaError::Unresolvable`].
pub fn resolve_member(expr: &AccessExpr, declared_only: bool) -> MetaResult<MemberRef> {
    match expr {
        AccessExpr::Convert(inner) => resolve_member(inner, declared_only),

        AccessExpr::Field { field, .. } => Ok(MemberRef::Field(field.clone())),

        AccessExpr::Property { receiver, property } => {
            let Some(owner) = receiver.clone().or_else(|| property.declaring_type()) else {
                return Ok(MemberRef::Property(property.clone()));
            };
            if property.declaring_type().map(|ty| ty.handle()) == Some(owner.handle()) {
                return Ok(MemberRef::Property(property.clone()));
            }
            let root = property_root(property);
            let found = owner
                .properties(search_flags(declared_only))
                .into_iter()
                .find(|candidate| property_root(candidate) == root);
            settle(found, property.clone(), declared_only, &owner, property.as_ref())
                .map(MemberRef::Property)
        }

        AccessExpr::Call { receiver, method } => {
            let Some(owner) = receiver.clone().or_else(|| method.declaring_type()) else {
                return Ok(MemberRef::from_method(method.clone()));
            };
            if method.declaring_type().map(|ty| ty.handle()) == Some(owner.handle()) {
                return Ok(MemberRef::from_method(method.clone()));
            }
            let root = method_root(method);
            let found = owner
                .methods(search_flags(declared_only))
                .into_iter()
                .find(|candidate| method_root(candidate) == root);
            settle(found, method.clone(), declared_only, &owner, method.as_ref())
                .map(MemberRef::from_method)
        }

        AccessExpr::New { .. } | AccessExpr::Other(_) => Err(MetaError::invalid_argument(format!(
            "expression '{}' does not refer to a property, field or method",
            expr
        ))),
    }
}

/// Member accessed by `expr`, re-targeted at the receiver type
pub fn member_of(expr: &AccessExpr) -> MetaResult<MemberRef> {
    resolve_member(expr, false)
}

/// Property accessed by `expr`
pub fn property_of(expr: &AccessExpr) -> MetaResult<PropertyRef> {
    match member_of(expr)? {
        MemberRef::Property(property) => Ok(property),
        _ => Err(MetaError::invalid_argument(format!(
            "expression '{}' does not reference a property",
            expr
        ))),
    }
}

/// Field accessed by `expr`
pub fn field_of(expr: &AccessExpr) -> MetaResult<FieldRef> {
    match member_of(expr)? {
        MemberRef::Field(field) => Ok(field),
        _ => Err(MetaError::invalid_argument(format!(
            "expression '{}' does not reference a field",
            expr
        ))),
    }
}

/// Method called by `expr`, which must be a bare call
///
/// An instance call bound to a base declaration resolves to the receiver
/// type's override, or to the inherited declaration reached through the
/// receiver type.
pub fn method_of(expr: &AccessExpr) -> MetaResult<MethodRef> {
    let AccessExpr::Call { receiver, method } = expr else {
        return Err(MetaError::invalid_argument(format!(
            "expression '{}' should consist of a method call only",
            expr
        )));
    };
    let Some(owner) = receiver else {
        return Ok(method.clone());
    };
    if method.declaring_type().map(|ty| ty.handle()) == Some(owner.handle()) {
        return Ok(method.clone());
    }

    let root = method_root(method);
    let flags = BindingFlags::INSTANCE | BindingFlags::PUBLIC | BindingFlags::NON_PUBLIC;
    Ok(owner
        .methods(flags)
        .into_iter()
        .find(|candidate| method_root(candidate) == root)
        .unwrap_or_else(|| method.clone()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::describe::TypeDescription;
    use crate::handle::{AssemblyVersion, TypeKind};
    use crate::model::{Universe, UniverseBuilder};

    struct Zoo {
        universe: Arc<Universe>,
        animal: TypeRef,
        dog: TypeRef,
        cat: TypeRef,
    }

    fn zoo() -> Zoo {
        let mut b = UniverseBuilder::new();
        let asm = b.add_assembly("Zoo", AssemblyVersion::new(1, 0, 0, 0));
        let string = b.add_type(asm, "System", "String", TypeKind::Class);
        let animal = b.add_type(asm, "Zoo", "Animal", TypeKind::Class);
        let dog = b.add_type(asm, "Zoo", "Dog", TypeKind::Class);
        let cat = b.add_type(asm, "Zoo", "Cat", TypeKind::Class);
        b.set_base_type(dog, animal);
        b.set_base_type(cat, animal);

        let speak = b.add_method(animal, "Speak", &[], Some(string.handle()));
        b.set_virtual(speak, true);
        let bark = b.add_method(dog, "Speak", &[], Some(string.handle()));
        b.set_override(bark, speak);

        let name = b.add_property(animal, "Name", string);
        let get_name = b.add_method(animal, "get_Name", &[], Some(string.handle()));
        b.set_accessors(name, Some(get_name), None);
        b.add_field(animal, "legs", string);

        let universe = b.build().unwrap();
        Zoo {
            animal: universe.ty(animal).unwrap(),
            dog: universe.ty(dog).unwrap(),
            cat: universe.ty(cat).unwrap(),
            universe,
        }
    }

    fn speak(zoo: &Zoo) -> MethodRef {
        zoo.animal
            .method("Speak", BindingFlags::DEFAULT, None)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_call_retargets_to_override() {
        let zoo = zoo();
        let expr = AccessExpr::call(&zoo.dog, &speak(&zoo));

        let resolved = method_of(&expr).unwrap();
        assert_eq!(resolved.declaring_type().unwrap().handle(), zoo.dog.handle());

        let member = resolve_member(&expr, true).unwrap();
        assert_eq!(member.kind(), MemberKind::Method);
        assert_eq!(member.declaring_type().unwrap().handle(), zoo.dog.handle());
    }

    #[test]
    fn test_inherited_call_is_reflected_through_receiver() {
        let zoo = zoo();
        let expr = AccessExpr::call(&zoo.cat, &speak(&zoo));

        let resolved = method_of(&expr).unwrap();
        assert_eq!(resolved.declaring_type().unwrap().handle(), zoo.animal.handle());
        assert_eq!(resolved.reflected_type().unwrap().handle(), zoo.cat.handle());
    }

    #[test]
    fn test_declared_only_rejects_base_members() {
        let zoo = zoo();
        let name = zoo.animal.property("Name", BindingFlags::DEFAULT).unwrap();
        let expr = AccessExpr::property(&zoo.dog, &name);

        let err = resolve_member(&expr, true).unwrap_err();
        assert_eq!(
            err,
            MetaError::Unresolvable {
                member: "Name".to_string(),
                owner: "Zoo.Dog".to_string(),
                declaring: "Zoo.Animal".to_string(),
            }
        );

        let property = property_of(&expr).unwrap();
        assert_eq!(property.reflected_type().unwrap().handle(), zoo.dog.handle());
    }

    #[test]
    fn test_conversions_are_unwrapped() {
        let zoo = zoo();
        let legs = zoo.animal.field("legs", BindingFlags::DEFAULT).unwrap();
        let expr = AccessExpr::field(&zoo.animal, &legs).convert();

        assert_eq!(field_of(&expr).unwrap().name(), "legs");
        assert!(matches!(
            property_of(&expr),
            Err(MetaError::InvalidArgument { .. })
        ));
        assert!(matches!(
            method_of(&AccessExpr::call(&zoo.dog, &speak(&zoo)).convert()),
            Err(MetaError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_non_member_expressions_are_rejected() {
        let zoo = zoo();
        let err = member_of(&AccessExpr::Other("x + 1".to_string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: expression 'x + 1' does not refer to a property, field or method"
        );
        assert_eq!(zoo.universe.type_count(), 4);
    }
}
