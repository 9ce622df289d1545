//! Uniform native-call convention.
//!
//! Every callable, script closure or host function, is entered through the
//! same function-pointer shape: six argument slots in, four result slots
//! out. The interpreter packs values into slots before the call and unpacks
//! the result slots afterwards, so dispatch never needs to know which kind
//! of callee it is talking to.

use std::sync::Arc;

use crate::function::FunctionValue;
use crate::table::TableHandle;
use crate::value::{HostRef, ScriptValues, Value};

/// Number of argument slots.
pub const ARGUMENT_SLOTS: usize = 6;

/// Number of result slots.
pub const RESULT_SLOTS: usize = 4;

/// One generic slot.
#[derive(Clone, Debug, Default)]
pub enum Register {
    #[default]
    Empty,
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Function(FunctionValue),
    Table(TableHandle),
    Host(HostRef),
    Vec3([f32; 3]),
    /// A whole value list; used to move script arguments and results
    /// through a single slot.
    Values(ScriptValues),
}

impl Register {
    /// Natural slot representation of a value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Nil => Register::Nil,
            Value::Bool(b) => Register::Bool(b),
            Value::Int(n) => Register::Int(n),
            Value::Float(x) => Register::Float(x),
            Value::Str(s) => Register::Str(s),
            Value::Function(f) => Register::Function(f),
            Value::Table(t) => Register::Table(t),
            Value::Host(h) => Register::Host(h),
        }
    }

    /// Value held by a scalar or handle slot. `None` for empty, vector and
    /// list slots, which need context to unpack.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Register::Nil => Some(Value::Nil),
            Register::Bool(b) => Some(Value::Bool(*b)),
            Register::Int(n) => Some(Value::Int(*n)),
            Register::Float(x) => Some(Value::Float(*x)),
            Register::Str(s) => Some(Value::Str(Arc::clone(s))),
            Register::Function(f) => Some(Value::Function(f.clone())),
            Register::Table(t) => Some(Value::Table(t.clone())),
            Register::Host(h) => Some(Value::Host(h.clone())),
            Register::Empty | Register::Vec3(_) | Register::Values(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Register::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Register::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Register::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Register::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            Register::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

/// Argument slots for one call.
#[derive(Clone, Debug, Default)]
pub struct Registers([Register; ARGUMENT_SLOTS]);

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store into a slot. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, register: Register) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = register;
        }
    }

    /// Borrow a slot; out-of-range reads see `Empty`.
    pub fn get(&self, index: usize) -> &Register {
        const EMPTY: &Register = &Register::Empty;
        self.0.get(index).unwrap_or(EMPTY)
    }

    /// Move a slot out, leaving it `Empty`.
    pub fn take(&mut self, index: usize) -> Register {
        self.0
            .get_mut(index)
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

/// Result slots of one call.
#[derive(Clone, Debug, Default)]
pub struct ReturnValue([Register; RESULT_SLOTS]);

impl ReturnValue {
    /// No results.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single result in slot 0.
    pub fn single(register: Register) -> Self {
        let mut ret = Self::default();
        ret.set(0, register);
        ret
    }

    /// A whole value list in slot 0.
    pub fn values(values: ScriptValues) -> Self {
        Self::single(Register::Values(values))
    }

    pub fn set(&mut self, index: usize, register: Register) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = register;
        }
    }

    pub fn take(&mut self, index: usize) -> Register {
        self.0
            .get_mut(index)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn into_slots(self) -> [Register; RESULT_SLOTS] {
        self.0
    }
}
