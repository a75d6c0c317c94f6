//! Member search flags

use bitflags::bitflags;

use crate::handle::MemberKind;

bitflags! {
    /// Controls which members a search returns.
    ///
    /// A member matches when its visibility bit (`PUBLIC` / `NON_PUBLIC`)
    /// and its binding bit (`INSTANCE` / `STATIC`) are both set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BindingFlags: u32 {
        /// Include instance members
        const INSTANCE = 1 << 0;
        /// Include static members
        const STATIC = 1 << 1;
        /// Include public members
        const PUBLIC = 1 << 2;
        /// Include non-public members
        const NON_PUBLIC = 1 << 3;
        /// Ignore inherited members
        const DECLARED_ONLY = 1 << 4;
        /// Compare names case-insensitively
        const IGNORE_CASE = 1 << 5;

        /// Public instance and static members, inherited ones included
        const DEFAULT = Self::INSTANCE.bits() | Self::STATIC.bits() | Self::PUBLIC.bits();
        /// Every member regardless of visibility or binding
        const ALL = Self::INSTANCE.bits()
            | Self::STATIC.bits()
            | Self::PUBLIC.bits()
            | Self::NON_PUBLIC.bits();
    }
}

impl BindingFlags {
    /// Check whether a member with the given visibility and binding passes
    pub fn accepts(self, is_public: bool, is_static: bool) -> bool {
        let visibility = if is_public {
            BindingFlags::PUBLIC
        } else {
            BindingFlags::NON_PUBLIC
        };
        let binding = if is_static {
            BindingFlags::STATIC
        } else {
            BindingFlags::INSTANCE
        };
        self.contains(visibility | binding)
    }

    /// Compare two names honoring `IGNORE_CASE`
    pub fn name_matches(self, a: &str, b: &str) -> bool {
        if self.contains(BindingFlags::IGNORE_CASE) {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }
}

bitflags! {
    /// Set of member categories, used by kind-filtered member searches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberKinds: u32 {
        /// Fields
        const FIELD = 1 << 0;
        /// Properties
        const PROPERTY = 1 << 1;
        /// Methods
        const METHOD = 1 << 2;
        /// Constructors
        const CONSTRUCTOR = 1 << 3;
        /// Events
        const EVENT = 1 << 4;
        /// Top-level types
        const TYPE_INFO = 1 << 5;
        /// Nested types
        const NESTED_TYPE = 1 << 6;
        /// Host-specific members
        const CUSTOM = 1 << 7;
    }
}

impl MemberKind {
    /// Single-category set for this kind
    pub fn as_kinds(self) -> MemberKinds {
        match self {
            MemberKind::Field => MemberKinds::FIELD,
            MemberKind::Property => MemberKinds::PROPERTY,
            MemberKind::Method => MemberKinds::METHOD,
            MemberKind::Constructor => MemberKinds::CONSTRUCTOR,
            MemberKind::Event => MemberKinds::EVENT,
            MemberKind::TypeInfo => MemberKinds::TYPE_INFO,
            MemberKind::NestedType => MemberKinds::NESTED_TYPE,
            MemberKind::Custom => MemberKinds::CUSTOM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        let flags = BindingFlags::PUBLIC | BindingFlags::INSTANCE;
        assert!(flags.accepts(true, false));
        assert!(!flags.accepts(true, true));
        assert!(!flags.accepts(false, false));
        assert!(BindingFlags::ALL.accepts(false, true));
    }

    #[test]
    fn test_name_matches() {
        assert!(BindingFlags::DEFAULT.name_matches("Name", "Name"));
        assert!(!BindingFlags::DEFAULT.name_matches("Name", "name"));
        assert!((BindingFlags::DEFAULT | BindingFlags::IGNORE_CASE).name_matches("Name", "name"));
    }

    #[test]
    fn test_member_kind_sets() {
        let kinds = MemberKinds::METHOD | MemberKinds::CONSTRUCTOR;
        assert!(kinds.contains(MemberKind::Method.as_kinds()));
        assert!(!kinds.contains(MemberKind::Field.as_kinds()));
    }
}
