//! Metadata errors

use thiserror::Error;

/// Errors raised by type-description queries, the expression resolver and
/// the attribute table builder
///
/// A missing overlay is never an error: lookups for unregistered entities
/// return empty attribute lists instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetaError {
    /// Caller passed an argument that can not be used for the operation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument
        message: String,
    },

    /// A declared-only resolution found the member only on a base type
    #[error("Member {member} is not declared on type {owner}, its declaration is on {declaring}")]
    Unresolvable {
        /// Member name
        member: String,
        /// Type the member was looked up on
        owner: String,
        /// Type that actually declares the member
        declaring: String,
    },

    /// A by-name lookup matched more than one member
    #[error("Ambiguous match for {kind} {name} on type {owner}")]
    AmbiguousMatch {
        /// Member category that was searched
        kind: String,
        /// Requested name
        name: String,
        /// Type that was searched
        owner: String,
    },

    /// Type-by-name lookup failed and the caller asked for an error
    #[error("Type {name} was not found in assembly {assembly}")]
    TypeNotFound {
        /// Requested type name
        name: String,
        /// Assembly that was searched
        assembly: String,
    },

    /// Satellite assembly lookup found no assembly for the culture
    #[error("Satellite assembly of {assembly} for culture {culture} was not found")]
    SatelliteNotFound {
        /// Main assembly name
        assembly: String,
        /// Requested culture
        culture: String,
    },

    /// Operation is not valid for the current entity (e.g. generic
    /// constraints of a non generic-parameter type)
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of the violated precondition
        message: String,
    },
}

impl MetaError {
    /// Shorthand for [`MetaError::InvalidArgument`]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        MetaError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for [`MetaError::InvalidOperation`]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        MetaError::InvalidOperation {
            message: message.into(),
        }
    }
}

/// Result alias used across the metadata crates
pub type MetaResult<T> = Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MetaError::invalid_argument("expression is not a member access");
        assert_eq!(
            err.to_string(),
            "Invalid argument: expression is not a member access"
        );

        let err = MetaError::Unresolvable {
            member: "Name".to_string(),
            owner: "Acme.Derived".to_string(),
            declaring: "Acme.Base".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Member Name is not declared on type Acme.Derived, its declaration is on Acme.Base"
        );
    }
}
