//! Stable identifier hashes.
//!
//! Scripts name variables and host functions by string, but every runtime
//! table (environment bindings, resolver scopes, native registry) is keyed
//! by a 64-bit hash of that string. The hash must be identical across runs
//! because serialized graphs carry it.

use std::fmt;
use std::hash::Hasher;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// Hashed identifier of a variable, parameter or native function.
///
/// Two identifiers compare equal iff their source names are equal
/// (modulo hash collisions, which are treated as the same name).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Ident(u64);

impl Ident {
    /// Hash a source name into an identifier.
    pub fn from_name(name: &str) -> Self {
        let mut hasher = FxHasher::default();
        hasher.write(name.as_bytes());
        Ident(hasher.finish())
    }

    /// Create from raw hash value.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Ident(raw)
    }

    /// Get raw hash value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::from_name(name)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({:#018x})", self.0)
    }
}
