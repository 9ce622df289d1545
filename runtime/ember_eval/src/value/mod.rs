//! Dynamic script values.
//!
//! `Value` is a closed sum over the language's runtime types. Scalars are
//! stored inline; strings are shared `Arc<str>`; tables and script functions
//! are pool handles whose clone/drop maintain the pool's reference counts.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::errors::{invalid_operator, EvalResult};
use crate::function::FunctionValue;
use crate::table::TableHandle;

/// Values produced by one expression. Most expressions yield exactly one;
/// calls, groups and returns may yield several.
pub type ScriptValues = SmallVec<[Value; 4]>;

/// Opaque reference to host-owned data. Compares by identity.
#[derive(Clone)]
pub struct HostRef(Arc<dyn Any + Send + Sync>);

impl HostRef {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        HostRef(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for HostRef {}

impl Hash for HostRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostRef({:p})", self.addr())
    }
}

/// Runtime value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Function(FunctionValue),
    Table(TableHandle),
    Host(HostRef),
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// Name of the active variant, as scripts see it.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
            Value::Table(_) => "table",
            Value::Host(_) => "host",
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Only nil and `false` are falsey; numeric zero is truthy.
    #[inline]
    pub fn is_truthy(&self) -> bool {
        !self.is_falsey()
    }

    #[inline]
    pub fn is_falsey(&self) -> bool {
        matches!(self, Value::Nil | Value::Bool(false))
    }

    /// The `not` operator. Collapses any value to a boolean: nil becomes
    /// `true`, booleans negate, everything else becomes `false`.
    pub fn not(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Bool(b) => !b,
            _ => false,
        }
    }

    /// The strict `!` operator. Only booleans and numbers negate.
    ///
    /// A number negates to `true` exactly when it is zero, so `!0` is `true`
    /// and `!5` is `false`. See "`!` on integers" in DESIGN.md.
    pub fn strict_not(&self) -> EvalResult<bool> {
        match self {
            Value::Bool(b) => Ok(!b),
            Value::Int(n) => Ok(*n == 0),
            Value::Float(f) => Ok(*f == 0.0),
            other => Err(invalid_operator("!", other.type_name())),
        }
    }

    /// Script-level `==`. Floats use IEEE comparison; every other variant
    /// compares like `PartialEq`. Different variants are never equal.
    pub fn script_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b,
            _ => self == other,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value as a float; integers are promoted.
    #[expect(
        clippy::cast_precision_loss,
        reason = "script integers promote to float like the host does"
    )]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableHandle> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// Structural equality used for table keys: floats compare by bit pattern
/// so that `Eq` and `Hash` agree.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::Function(f) => f.hash(state),
            Value::Table(t) => t.hash(state),
            Value::Host(h) => h.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Function(func) => write!(f, "function: {func:?}"),
            Value::Table(t) => write!(f, "table: {:?}", t.id()),
            Value::Host(h) => write!(f, "host: {:p}", h.addr()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}
