//! Identifiers for types and their members
//!
//! The engine only requires a total, stable equality on identifiers; how
//! they are produced is up to the registration front-end. `Ident::from_name`
//! is a convenience for front-ends that key their metadata on names.

use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque identifier attached to types, data members, functions and bases.
///
/// Identifiers are compared for equality only; the engine never orders or
/// interprets them. `Ident::ANONYMOUS` marks fundamental or unnamed types
/// and is excluded from identifier-based lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident(u64);

impl Ident {
    /// The anonymous identifier, reserved for fundamental/unnamed types.
    pub const ANONYMOUS: Ident = Ident(0);

    /// Create an identifier from a raw value supplied by external
    /// identifier infrastructure.
    pub const fn from_raw(raw: u64) -> Self {
        Ident(raw)
    }

    /// Derive an identifier from a name by hashing it.
    ///
    /// Stable for the lifetime of the process; distinct names are expected
    /// to produce distinct identifiers for all practical inputs.
    pub fn from_name(name: &str) -> Self {
        let mut hasher = FxHasher::default();
        name.hash(&mut hasher);
        let raw = hasher.finish();
        // Hash value 0 would collide with the anonymous marker.
        Ident(if raw == 0 { 1 } else { raw })
    }

    /// Raw identifier value.
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Check whether this is the anonymous identifier.
    pub const fn is_anonymous(self) -> bool {
        self.0 == 0
    }
}

impl Default for Ident {
    fn default() -> Self {
        Ident::ANONYMOUS
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::from_name(name)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({:#x})", self.0)
    }
}
