//! Registration and linking errors

use crate::ident::Ident;
use thiserror::Error;

/// Errors reported while populating a type registry.
///
/// Query-side misses are not errors; they surface as `None` views, empty
/// values or `false` flags.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReflectError {
    /// A type with the same identifier is already registered.
    #[error("duplicate type identifier: {identifier}")]
    DuplicateTypeIdentifier {
        /// The conflicting identifier.
        identifier: Ident,
    },

    /// A sibling member with the same identifier already exists.
    #[error("duplicate member identifier: {identifier}")]
    DuplicateMemberIdentifier {
        /// The conflicting identifier.
        identifier: Ident,
    },

    /// A type key does not refer to a registered (attached) descriptor.
    #[error("type key {key} is not attached to this registry")]
    DetachedType {
        /// The raw key value.
        key: u32,
    },

    /// A destructor is already linked to the descriptor.
    #[error("destructor already set for this type")]
    DestructorAlreadySet,

    /// A property with an equal key already exists on the target.
    #[error("duplicate property key")]
    DuplicateProperty,

    /// A member lookup during linking found no such member.
    #[error("no such member: {identifier}")]
    NoSuchMember {
        /// The identifier that was not found.
        identifier: Ident,
    },

    /// A constructor index during linking is out of range.
    #[error("constructor index {index} out of range")]
    NoSuchConstructor {
        /// The out-of-range index.
        index: usize,
    },
}
