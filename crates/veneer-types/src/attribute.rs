//! Attribute values and attribute kinds
//!
//! An attribute is a kind plus constructor-style positional arguments and
//! named arguments. Kinds form a single-inheritance hierarchy rooted at
//! [`AttributeKind::root`], and kind-filtered queries return every
//! attribute whose kind is assignable to the requested one.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::handle::ContextId;

static ROOT_KIND: Lazy<AttributeKind> = Lazy::new(|| AttributeKind {
    data: Arc::new(KindData {
        name: "Attribute".into(),
        parent: None,
        inherited: true,
    }),
});

static CONTEXT_IDENTIFIER_KIND: Lazy<AttributeKind> = Lazy::new(|| AttributeKind {
    data: Arc::new(KindData {
        name: "ContextIdentifierAttribute".into(),
        parent: Some(AttributeKind::root()),
        inherited: false,
    }),
});

#[derive(Debug)]
struct KindData {
    name: Arc<str>,
    parent: Option<AttributeKind>,
    inherited: bool,
}

/// The kind (class) of an attribute
///
/// Kinds are identified by their full name.
#[derive(Clone)]
pub struct AttributeKind {
    data: Arc<KindData>,
}

impl AttributeKind {
    /// The root kind every attribute kind derives from
    pub fn root() -> AttributeKind {
        ROOT_KIND.clone()
    }

    /// Kind of the marker attribute that identifies a projection context
    pub fn context_identifier() -> AttributeKind {
        CONTEXT_IDENTIFIER_KIND.clone()
    }

    /// Create a kind deriving directly from the root kind
    pub fn new(name: &str) -> AttributeKind {
        Self::derived(name, &ROOT_KIND)
    }

    /// Create a kind deriving from `parent`
    pub fn derived(name: &str, parent: &AttributeKind) -> AttributeKind {
        AttributeKind {
            data: Arc::new(KindData {
                name: name.into(),
                parent: Some(parent.clone()),
                inherited: true,
            }),
        }
    }

    /// Copy of this kind with a different inheritance usage flag
    ///
    /// Non-inherited kinds are skipped when an inherited attribute query
    /// walks base types.
    pub fn with_inherited(&self, inherited: bool) -> AttributeKind {
        AttributeKind {
            data: Arc::new(KindData {
                name: self.data.name.clone(),
                parent: self.data.parent.clone(),
                inherited,
            }),
        }
    }

    /// Full name of the kind
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Parent kind, `None` for the root
    pub fn parent(&self) -> Option<&AttributeKind> {
        self.data.parent.as_ref()
    }

    /// Whether attributes of this kind flow to derived types
    pub fn is_inherited(&self) -> bool {
        self.data.inherited
    }

    /// This kind followed by each of its ancestors up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = &AttributeKind> {
        std::iter::successors(Some(self), |kind| kind.parent())
    }

    /// Check whether an attribute of kind `other` is an instance of this kind
    pub fn is_assignable_from(&self, other: &AttributeKind) -> bool {
        other.ancestors().any(|kind| kind == self)
    }
}

impl PartialEq for AttributeKind {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) || self.data.name == other.data.name
    }
}

impl Eq for AttributeKind {}

impl Hash for AttributeKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.name.hash(state);
    }
}

impl fmt::Debug for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeKind({})", self.data.name)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data.name)
    }
}

/// Argument value of an attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    /// Null reference
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// String
    Str(String),
    /// Type, by full name
    Type(String),
    /// Array of values
    Array(Vec<AttributeValue>),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => write!(f, "null"),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::UInt(u) => write!(f, "{}", u),
            AttributeValue::Str(s) => write!(f, "{:?}", s),
            AttributeValue::Type(t) => write!(f, "typeof({})", t),
            AttributeValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(value.into())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        AttributeValue::UInt(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Str(value)
    }
}

/// Shared attribute instance
pub type AttributeRef = Arc<Attribute>;

/// An attribute instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    kind: AttributeKind,
    arguments: Vec<AttributeValue>,
    named: Vec<(String, AttributeValue)>,
}

impl Attribute {
    /// Create an attribute without arguments
    pub fn new(kind: AttributeKind) -> Self {
        Attribute {
            kind,
            arguments: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn with_argument(mut self, value: impl Into<AttributeValue>) -> Self {
        self.arguments.push(value.into());
        self
    }

    /// Append a named argument
    pub fn with_named(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.named.push((name.to_string(), value.into()));
        self
    }

    /// Marker attribute identifying the projection context `id`
    pub fn context_marker(id: ContextId, label: Option<&str>) -> Self {
        let marker = Attribute::new(AttributeKind::context_identifier()).with_argument(id.as_u64());
        match label {
            Some(label) => marker.with_named("label", label),
            None => marker,
        }
    }

    /// Wrap into a shared reference
    pub fn into_ref(self) -> AttributeRef {
        Arc::new(self)
    }

    /// Attribute kind
    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    /// Positional arguments
    pub fn arguments(&self) -> &[AttributeValue] {
        &self.arguments
    }

    /// Named argument by name
    pub fn named_argument(&self, name: &str) -> Option<&AttributeValue> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Check whether this attribute is an instance of `kind`
    pub fn is_instance_of(&self, kind: &AttributeKind) -> bool {
        kind.is_assignable_from(&self.kind)
    }

    /// Context id carried by a marker attribute
    pub fn context_id(&self) -> Option<ContextId> {
        if self.kind != AttributeKind::context_identifier() {
            return None;
        }
        match self.arguments.first() {
            Some(AttributeValue::UInt(id)) => Some(ContextId::from_u64(*id)),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.kind)?;
        if self.arguments.is_empty() && self.named.is_empty() {
            return write!(f, "]");
        }
        write!(f, "(")?;
        let mut first = true;
        for arg in &self.arguments {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", arg)?;
        }
        for (name, value) in &self.named {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{} = {}", name, value)?;
        }
        write!(f, ")]")
    }
}

/// Check whether `attribute` passes an optional kind filter
///
/// `None` accepts every attribute.
pub fn matches_kind(attribute: &Attribute, kind: Option<&AttributeKind>) -> bool {
    kind.map_or(true, |kind| attribute.is_instance_of(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_hierarchy() {
        let validation = AttributeKind::new("ValidationAttribute");
        let required = AttributeKind::derived("RequiredAttribute", &validation);

        assert!(validation.is_assignable_from(&required));
        assert!(AttributeKind::root().is_assignable_from(&required));
        assert!(!required.is_assignable_from(&validation));
        assert_eq!(required.ancestors().count(), 3);
    }

    #[test]
    fn test_kinds_compare_by_name() {
        let a = AttributeKind::new("ObsoleteAttribute");
        let b = AttributeKind::new("ObsoleteAttribute");
        assert_eq!(a, b);
        assert!(!a.with_inherited(false).is_inherited());
        assert_eq!(a.with_inherited(false), a);
    }

    #[test]
    fn test_marker_round_trip() {
        let id = ContextId::new();
        let marker = Attribute::context_marker(id, Some("docs"));

        assert_eq!(marker.context_id(), Some(id));
        assert!(marker.is_instance_of(&AttributeKind::root()));
        assert_eq!(
            marker.named_argument("label"),
            Some(&AttributeValue::Str("docs".to_string()))
        );
        assert_eq!(Attribute::new(AttributeKind::new("X")).context_id(), None);
    }

    #[test]
    fn test_display() {
        let attr = Attribute::new(AttributeKind::new("ObsoleteAttribute"))
            .with_argument("use Baz")
            .with_named("IsError", true);
        assert_eq!(
            attr.to_string(),
            "[ObsoleteAttribute(\"use Baz\", IsError = true)]"
        );
        assert_eq!(
            Attribute::new(AttributeKind::new("Serializable")).to_string(),
            "[Serializable]"
        );
    }

    #[test]
    fn test_matches_kind() {
        let attr = Attribute::new(AttributeKind::new("A"));
        assert!(matches_kind(&attr, None));
        assert!(matches_kind(&attr, Some(&AttributeKind::root())));
        assert!(!matches_kind(&attr, Some(&AttributeKind::new("B"))));
    }
}
