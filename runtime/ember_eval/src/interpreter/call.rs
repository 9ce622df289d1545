//! Call dispatch.
//!
//! Natives and script closures are entered through the same
//! [`NativeEntry`] shape. For a native, arguments are converted per the
//! registered descriptors into individual slots; a script closure receives
//! itself in slot 0 and its whole argument list in slot 1, then runs through
//! [`script_entry`].

use std::mem;
use std::sync::Arc;

use ember_ir::{ExprId, ExprKind};

use super::Interpreter;
use crate::errors::{
    missing_parameter, not_callable, stack_overflow, stale_handle, type_mismatch,
    wrong_arg_count, EvalResult,
};
use crate::function::{FunctionHandle, FunctionValue};
use crate::native::{Argument, ArgumentFlags, NativeEntry, NativeId, NativeType};
use crate::registers::{Register, Registers, ReturnValue};
use crate::table::{Table, TableHandle};
use crate::value::{ScriptValues, Value};

impl Interpreter {
    /// `callee(args)`, including the `object.name(args)` sugar: the object
    /// is evaluated once and becomes the first argument. The callee is the
    /// object's field `name` when that is set, otherwise the variable `name`.
    pub(super) fn eval_call(&mut self, callee: ExprId, args: &[ExprId]) -> EvalResult<ScriptValues> {
        let graph = Arc::clone(&self.graph);
        let mut arguments = ScriptValues::new();
        let function = match graph.expr(callee) {
            ExprKind::Variable {
                var,
                object: Some(object),
                index: None,
            } => {
                let receiver = self.eval_first(*object)?;
                let field = match receiver.as_table().and_then(TableHandle::get) {
                    Some(table) => {
                        let field = table.read().field(&var.name);
                        field
                    }
                    None => Value::Nil,
                };
                arguments.push(receiver);
                if field.is_nil() {
                    self.read_variable(callee, var.ident)
                } else {
                    field
                }
            }
            _ => self.eval_first(callee)?,
        };
        for &arg in args {
            arguments.extend(self.eval_expr(arg)?);
        }
        self.call_value(&function, arguments)
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn call_value(&mut self, callee: &Value, args: ScriptValues) -> EvalResult<ScriptValues> {
        match callee {
            Value::Function(FunctionValue::Native(id)) => self.call_native(*id, args),
            Value::Function(FunctionValue::Script(handle)) => self.call_script(handle, args),
            other => Err(not_callable(other.type_name())),
        }
    }

    fn call_native(&mut self, id: NativeId, args: ScriptValues) -> EvalResult<ScriptValues> {
        let context = self.context.clone();
        let native = context
            .natives()
            .get(id)
            .ok_or_else(|| not_callable("unregistered native"))?;
        if args.len() != native.arity() {
            return Err(wrong_arg_count(&native.name, native.arity(), args.len()));
        }
        tracing::debug!(native = %native.name, args = args.len(), "calling native");

        let mut registers = Registers::new();
        for (slot, (value, argument)) in args.into_iter().zip(&native.arguments).enumerate() {
            registers.set(slot, convert_argument(value, argument)?);
        }
        let result = self.invoke(native.entry, registers)?;

        let mut values = ScriptValues::new();
        for register in result.into_slots().into_iter().take(native.returns.len()) {
            match register {
                Register::Vec3(v) => values.push(self.vec3_table(v)),
                Register::Values(list) => values.extend(list),
                other => values.push(other.to_value().unwrap_or_default()),
            }
        }
        Ok(values)
    }

    fn call_script(&mut self, handle: &FunctionHandle, args: ScriptValues) -> EvalResult<ScriptValues> {
        let mut registers = Registers::new();
        registers.set(0, Register::Function(FunctionValue::Script(handle.clone())));
        registers.set(1, Register::Values(args));
        let mut result = self.invoke(script_entry, registers)?;
        match result.take(0) {
            Register::Values(values) => Ok(values),
            _ => Ok(ScriptValues::new()),
        }
    }

    /// Enter a callable and surface any error it raised.
    fn invoke(&mut self, entry: NativeEntry, registers: Registers) -> EvalResult<ReturnValue> {
        let result = entry(self, registers);
        match self.pending_error.take() {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }

    fn run_script_function(
        &mut self,
        handle: &FunctionHandle,
        args: ScriptValues,
    ) -> EvalResult<ScriptValues> {
        if self.call_depth >= self.max_call_depth {
            return Err(stack_overflow(self.max_call_depth));
        }
        let function = handle.get().ok_or_else(|| stale_handle("function"))?;
        let ExprKind::Function { params, body, .. } = function.graph.expr(function.function) else {
            return Err(not_callable("expression"));
        };

        // Surplus arguments are dropped.
        let env = function.closure.child();
        let mut args = args.into_iter();
        for param in params {
            match args.next() {
                Some(value) => env.set_value(param.ident, value),
                None if param.admits_nil() => env.set_value(param.ident, Value::Nil),
                None => return Err(missing_parameter(&param.name)),
            }
        }

        let graph = mem::replace(&mut self.graph, Arc::clone(&function.graph));
        let resolved = mem::replace(&mut self.resolved, Arc::clone(&function.resolved));
        let global = mem::replace(
            &mut self.global,
            function.closure.global_environment().clone(),
        );
        let caller_env = mem::replace(&mut self.env, env);
        self.call_depth += 1;

        let flow = self.exec_stmts(body);

        self.call_depth -= 1;
        self.env = caller_env;
        self.global = global;
        self.resolved = resolved;
        self.graph = graph;

        // A `break` outside any loop ends the function like a bare return.
        Ok(flow?.into_values())
    }

    fn vec3_table(&self, [x, y, z]: [f32; 3]) -> Value {
        let mut table = Table::new();
        table.set_field("_type", Value::string("vec3"));
        table.set_field("x", Value::Float(f64::from(x)));
        table.set_field("y", Value::Float(f64::from(y)));
        table.set_field("z", Value::Float(f64::from(z)));
        Value::Table(self.context.new_table(table))
    }
}

/// Entry point shared by every script closure.
fn script_entry(interpreter: &mut Interpreter, mut registers: Registers) -> ReturnValue {
    let Register::Function(FunctionValue::Script(handle)) = registers.take(0) else {
        interpreter.raise(not_callable("empty slot"));
        return ReturnValue::empty();
    };
    let args = match registers.take(1) {
        Register::Values(args) => args,
        _ => ScriptValues::new(),
    };
    match interpreter.run_script_function(&handle, args) {
        Ok(values) => ReturnValue::values(values),
        Err(err) => {
            interpreter.raise(err);
            ReturnValue::empty()
        }
    }
}

/// Convert a value into the slot representation a native declared.
fn convert_argument(value: Value, argument: &Argument) -> EvalResult<Register> {
    if value.is_nil()
        && (argument.ty == NativeType::Any || argument.flags.contains(ArgumentFlags::NULLABLE))
    {
        return Ok(Register::Nil);
    }
    let register = match (argument.ty, value) {
        (NativeType::Any, value) => Register::from_value(value),
        (NativeType::Bool, Value::Bool(b)) => Register::Bool(b),
        (NativeType::Int, Value::Int(n)) => Register::Int(n),
        (NativeType::Float, value @ (Value::Float(_) | Value::Int(_))) => {
            Register::Float(value.as_float().unwrap_or_default())
        }
        (NativeType::Str, Value::Str(s)) => Register::Str(s),
        (NativeType::Function, Value::Function(f)) => Register::Function(f),
        (NativeType::Table, Value::Table(t)) => Register::Table(t),
        (NativeType::Host, Value::Host(h)) => Register::Host(h),
        (NativeType::Vec3, Value::Table(t)) => {
            let v = read_vec3(&t).ok_or_else(|| type_mismatch("vec3", "table"))?;
            Register::Vec3(v)
        }
        (ty, value) => return Err(type_mismatch(ty.name(), value.type_name())),
    };
    Ok(register)
}

/// A table tagged `_type = "vec3"` (any case) with numeric `x`, `y`, `z`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "host vectors are single precision"
)]
fn read_vec3(handle: &TableHandle) -> Option<[f32; 3]> {
    let table = handle.get()?;
    let table = table.read();
    let tag = table.field("_type");
    if !tag.as_str()?.eq_ignore_ascii_case("vec3") {
        return None;
    }
    let x = table.field("x").as_float()?;
    let y = table.field("y").as_float()?;
    let z = table.field("z").as_float()?;
    Some([x as f32, y as f32, z as f32])
}
