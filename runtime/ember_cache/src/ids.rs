//! Asset, function and script identities.

use std::fmt;

/// Stable identity of a script asset, owned by the asset system.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetGuid(u128);

impl AssetGuid {
    #[inline]
    pub const fn from_u128(raw: u128) -> Self {
        AssetGuid(raw)
    }

    #[inline]
    pub const fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for AssetGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for AssetGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetGuid({self})")
    }
}

/// Identity of one function inside a script asset.
///
/// The display form names the compiled payload on disk, so it must stay
/// stable: 32 lowercase hex digits.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionGuid(u128);

impl FunctionGuid {
    #[inline]
    pub const fn from_u128(raw: u128) -> Self {
        FunctionGuid(raw)
    }

    #[inline]
    pub const fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for FunctionGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for FunctionGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionGuid({self})")
    }
}

/// Dense cache-local index of a registered asset.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptId(u32);

impl ScriptId {
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        ScriptId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptId({})", self.0)
    }
}
