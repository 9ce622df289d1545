//! Ember Eval - resolver and tree-walking interpreter for Ember scripts.
//!
//! # Architecture
//!
//! - `Value` / `Table`: the dynamic value domain. Tables and script
//!   functions live in reference-counted `IdentifierPool`s owned by a
//!   `ScriptContext`.
//! - `Environment`: shared, chained lexical scopes.
//! - `resolve`: static pass computing hop counts for local variables.
//! - `Interpreter`: evaluates an `AstGraph` using those hop counts.
//! - `NativeRegistry`: host functions, called through the same
//!   six-slot/four-slot `Registers` convention as script closures.
//!
//! # Re-exports
//!
//! Error constructors are re-exported for natives that raise errors; the
//! canonical path is `ember_eval::errors::*`.

mod context;
mod environment;
pub mod errors;
mod function;
pub mod interpreter;
pub mod native;
mod operators;
mod pool;
pub mod registers;
mod resolver;
mod stack;
mod table;
mod tracing_setup;
mod unary_operators;
mod value;

pub use context::ScriptContext;
pub use environment::Environment;
pub use errors::{
    assertion_failed, not_callable, type_mismatch, wrong_arg_count, EvalError, EvalErrorKind,
    EvalResult,
};
pub use function::{FunctionCache, FunctionHandle, FunctionValue, ScriptFunction};
pub use interpreter::{Flow, Interpreter, InterpreterBuilder};
pub use native::{NativeFunction, NativeId, NativeRegistry, NativeType};
pub use operators::evaluate_binary;
pub use pool::{Handle, IdentifierPool, PoolId};
pub use registers::{Register, Registers, ReturnValue};
pub use resolver::{resolve, resolve_function, ResolvedVariableMap};
pub use stack::ensure_sufficient_stack;
pub use table::{Table, TableCache, TableHandle};
pub use tracing_setup::init_tracing;
pub use unary_operators::evaluate_unary;
pub use value::{HostRef, ScriptValues, Value};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
