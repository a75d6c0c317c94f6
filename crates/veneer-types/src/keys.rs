//! Identity keys for overlay lookup
//!
//! The same declaration can be reached through several descriptions that
//! are not equal to each other: a member obtained from a derived type
//! reports a different reflected type than the one obtained from its
//! declaring type. Overlay lookups therefore go through these normalized
//! keys instead of member identities.

use std::fmt;

use crate::describe::{MemberDescription, MethodDescription};
use crate::handle::{MemberKind, TypeHandle};

/// Overlay key of a field, property or event
///
/// Compared by declaring type, name and kind; the reflected type is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    declaring: Option<TypeHandle>,
    name: String,
    kind: MemberKind,
}

impl MemberKey {
    /// Create a key from its parts
    pub fn new(declaring: Option<TypeHandle>, name: &str, kind: MemberKind) -> Self {
        MemberKey {
            declaring,
            name: name.to_string(),
            kind,
        }
    }

    /// Key of a member description
    pub fn of(member: &dyn MemberDescription) -> Self {
        MemberKey {
            declaring: member.declaring_type().map(|ty| ty.handle()),
            name: member.name(),
            kind: member.kind(),
        }
    }

    /// Declaring type handle
    pub fn declaring(&self) -> Option<&TypeHandle> {
        self.declaring.as_ref()
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member category
    pub fn kind(&self) -> MemberKind {
        self.kind
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaring {
            Some(declaring) => write!(f, "{} {}::{}", self.kind, declaring, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// Overlay key of a method or constructor
///
/// Compared by name, ordered parameter types and generic arity, so
/// overloads that differ only in parameter types get distinct keys while
/// every description of one declaration gets the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    name: String,
    parameter_types: Vec<TypeHandle>,
    generic_arity: usize,
}

impl MethodKey {
    /// Create a key from its parts
    pub fn new(name: &str, parameter_types: Vec<TypeHandle>, generic_arity: usize) -> Self {
        MethodKey {
            name: name.to_string(),
            parameter_types,
            generic_arity,
        }
    }

    /// Key of a method description
    ///
    /// Ordinal parameters always carry a type; only the return-value
    /// pseudo-parameter may be untyped, and it is not part of the key.
    pub fn of(method: &dyn MethodDescription) -> Self {
        let parameter_types = method
            .parameters()
            .iter()
            .filter_map(|param| param.parameter_type())
            .map(|ty| ty.handle())
            .collect();

        MethodKey {
            name: method.name(),
            parameter_types,
            generic_arity: method.generic_arguments().len(),
        }
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type handles in declaration order
    pub fn parameter_types(&self) -> &[TypeHandle] {
        &self.parameter_types
    }

    /// Number of generic method parameters
    pub fn generic_arity(&self) -> usize {
        self.generic_arity
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.generic_arity > 0 {
            write!(f, "`{}", self.generic_arity)?;
        }
        write!(f, "(")?;
        for (i, ty) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::DefId;

    fn int() -> TypeHandle {
        TypeHandle::defined(DefId::new(9, 1))
    }

    fn string() -> TypeHandle {
        TypeHandle::defined(DefId::new(9, 2))
    }

    #[test]
    fn test_overloads_differ() {
        let a = MethodKey::new("Bar", vec![int()], 0);
        let b = MethodKey::new("Bar", vec![string()], 0);
        let c = MethodKey::new("Bar", vec![int()], 1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, MethodKey::new("Bar", vec![int()], 0));
    }

    #[test]
    fn test_member_key_distinguishes_kind() {
        let owner = Some(TypeHandle::defined(DefId::new(9, 5)));
        let a = MemberKey::new(owner.clone(), "Name", MemberKind::Property);
        let b = MemberKey::new(owner.clone(), "Name", MemberKind::Field);
        assert_ne!(a, b);
        assert_eq!(a, MemberKey::new(owner, "Name", MemberKind::Property));
    }

    #[test]
    fn test_display() {
        let key = MethodKey::new("Convert", vec![int(), string()], 2);
        assert_eq!(key.to_string(), "Convert`2(T9:1, T9:2)");
        let key = MemberKey::new(None, "Count", MemberKind::Field);
        assert_eq!(key.to_string(), "field Count");
    }
}
