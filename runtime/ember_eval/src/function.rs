//! Function values.
//!
//! A function value is either a host-native function, identified by its
//! stable [`NativeId`], or a script closure stored in the function pool.

use std::sync::Arc;

use ember_ir::{AstGraph, ExprId};

use crate::environment::Environment;
use crate::native::NativeId;
use crate::pool::{Handle, IdentifierPool};
use crate::resolver::ResolvedVariableMap;

/// Pool of all live script closures.
pub type FunctionCache = IdentifierPool<ScriptFunction>;

/// Reference-counted handle to a pooled script closure.
pub type FunctionHandle = Handle<ScriptFunction>;

/// Callable value. Compares by identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FunctionValue {
    Native(NativeId),
    Script(FunctionHandle),
}

/// A script function literal together with everything needed to run it
/// after the interpreter that created it is gone: the graph that owns the
/// node, that graph's hop-count map, and the captured environment.
pub struct ScriptFunction {
    pub graph: Arc<AstGraph>,
    pub resolved: Arc<ResolvedVariableMap>,
    pub function: ExprId,
    pub closure: Environment,
}
