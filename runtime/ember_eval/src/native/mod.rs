//! Registry of host-native functions.
//!
//! Natives are looked up by the stable hash of their script-visible name.
//! Each entry describes its arguments (name, flags, type) and result types
//! so the interpreter can convert values into slots before the call and
//! back afterwards.

mod library;

use std::fmt;

use bitflags::bitflags;
use ember_ir::Ident;
use rustc_hash::FxHashMap;

use crate::errors::{slot_limit, EvalResult};
use crate::interpreter::Interpreter;
use crate::registers::{Registers, ReturnValue, ARGUMENT_SLOTS, RESULT_SLOTS};

/// Entry point shared by every callable.
pub type NativeEntry = fn(&mut Interpreter, Registers) -> ReturnValue;

/// Stable identity of a registered native.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct NativeId(Ident);

impl NativeId {
    pub fn ident(self) -> Ident {
        self.0
    }
}

impl fmt::Debug for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeId({:#018x})", self.0.raw())
    }
}

bitflags! {
    /// Per-argument conversion flags.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ArgumentFlags: u8 {
        /// Nil is passed through as `Register::Nil` instead of failing
        /// conversion.
        const NULLABLE = 1 << 0;
    }
}

/// Host-side type of an argument or result slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// Any value, in its natural slot representation.
    Any,
    Bool,
    Int,
    /// Integers are promoted.
    Float,
    Str,
    Function,
    Table,
    Host,
    /// Script side: a table with `_type = "vec3"` and `x`, `y`, `z` fields.
    Vec3,
}

impl NativeType {
    pub fn name(self) -> &'static str {
        match self {
            NativeType::Any => "any",
            NativeType::Bool => "boolean",
            NativeType::Int => "integer",
            NativeType::Float => "float",
            NativeType::Str => "string",
            NativeType::Function => "function",
            NativeType::Table => "table",
            NativeType::Host => "host",
            NativeType::Vec3 => "vec3",
        }
    }
}

/// Argument descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub flags: ArgumentFlags,
    pub ty: NativeType,
}

/// A registered native function.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub entry: NativeEntry,
    pub arguments: Vec<Argument>,
    pub returns: Vec<NativeType>,
}

impl NativeFunction {
    pub fn new(name: impl Into<String>, entry: NativeEntry) -> Self {
        NativeFunction {
            name: name.into(),
            entry,
            arguments: Vec::new(),
            returns: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, name: &str, ty: NativeType) -> Self {
        self.arguments.push(Argument {
            name: name.to_string(),
            flags: ArgumentFlags::empty(),
            ty,
        });
        self
    }

    #[must_use]
    pub fn nullable_arg(mut self, name: &str, ty: NativeType) -> Self {
        self.arguments.push(Argument {
            name: name.to_string(),
            flags: ArgumentFlags::NULLABLE,
            ty,
        });
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: NativeType) -> Self {
        self.returns.push(ty);
        self
    }

    pub fn id(&self) -> NativeId {
        NativeId(Ident::from_name(&self.name))
    }

    /// Declared arity.
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Host function registry.
#[derive(Debug, Default)]
pub struct NativeRegistry {
    functions: FxHashMap<Ident, NativeFunction>,
}

impl NativeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the core library (`assert`, `print`,
    /// `table` and float math).
    pub fn with_core_natives() -> Self {
        let mut registry = Self::new();
        library::register(&mut registry);
        registry
    }

    /// Register a native. Natives that need more slots than the calling
    /// convention provides are rejected. Re-registering a name replaces the
    /// previous entry.
    pub fn register(&mut self, function: NativeFunction) -> EvalResult<NativeId> {
        if function.arguments.len() > ARGUMENT_SLOTS {
            return Err(slot_limit(&function.name, "arguments", ARGUMENT_SLOTS));
        }
        if function.returns.len() > RESULT_SLOTS {
            return Err(slot_limit(&function.name, "results", RESULT_SLOTS));
        }
        let id = function.id();
        if self.functions.insert(id.0, function).is_some() {
            tracing::debug!(native = ?id, "replaced native function");
        }
        Ok(id)
    }

    /// Find a native by script-visible name hash.
    pub fn lookup(&self, ident: Ident) -> Option<NativeId> {
        self.functions.contains_key(&ident).then_some(NativeId(ident))
    }

    pub fn get(&self, id: NativeId) -> Option<&NativeFunction> {
        self.functions.get(&id.0)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
