//! Host-native calls through the slot convention.

use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::{run, run_with, values};
use crate::{
    EvalErrorKind, Interpreter, NativeFunction, NativeRegistry, NativeType, Register, Registers,
    ReturnValue, ScriptValues, Value,
};
use ember_ir::{AstBuilder, BinaryOp, VarToken};

static MOVE_CALLS: AtomicUsize = AtomicUsize::new(0);

fn move_to(_: &mut Interpreter, _: Registers) -> ReturnValue {
    MOVE_CALLS.fetch_add(1, Ordering::SeqCst);
    ReturnValue::empty()
}

#[test]
fn test_arity_mismatch_skips_native() {
    let mut natives = NativeRegistry::with_core_natives();
    natives
        .register(
            NativeFunction::new("move_to", move_to)
                .arg("x", NativeType::Float)
                .arg("y", NativeType::Float),
        )
        .unwrap();

    let mut b = AstBuilder::new();
    let one = b.float(1.0);
    let call = b.call_stmt("move_to", vec![one]);

    let err = run_with(natives, b, vec![call]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "move_to".into(),
            expected: 2,
            got: 1,
        }
    );
    assert_eq!(MOVE_CALLS.load(Ordering::SeqCst), 0);
}

fn add(_: &mut Interpreter, args: Registers) -> ReturnValue {
    let a = args.get(0).as_int().unwrap_or_default();
    let b = args.get(1).as_int().unwrap_or_default();
    ReturnValue::single(Register::Int(a + b))
}

fn add_natives() -> NativeRegistry {
    let mut natives = NativeRegistry::new();
    natives
        .register(
            NativeFunction::new("add", add)
                .arg("a", NativeType::Int)
                .arg("b", NativeType::Int)
                .returns(NativeType::Int),
        )
        .unwrap();
    natives
}

#[test]
fn test_native_receives_converted_arguments() {
    let mut b = AstBuilder::new();
    let x = b.int(40);
    let y = b.int(2);
    let call = b.call_named("add", vec![x, y]);
    let ret = b.return_stmt(vec![call]);

    assert_eq!(
        run_with(add_natives(), b, vec![ret]).unwrap(),
        values(&[Value::Int(42)])
    );
}

#[test]
fn test_multi_value_argument_expands() {
    // local function pair() return 40, 2 end
    // return add(pair())
    let mut b = AstBuilder::new();
    let x = b.int(40);
    let y = b.int(2);
    let ret = b.return_stmt(vec![x, y]);
    let def = b.local_function_stmt("pair", vec![], vec![ret]);
    let pair = b.call_named("pair", vec![]);
    let call = b.call_named("add", vec![pair]);
    let ret = b.return_stmt(vec![call]);

    assert_eq!(
        run_with(add_natives(), b, vec![def, ret]).unwrap(),
        values(&[Value::Int(42)])
    );
}

#[test]
fn test_argument_type_mismatch() {
    let mut b = AstBuilder::new();
    let x = b.string("forty");
    let y = b.int(2);
    let call = b.call_stmt("add", vec![x, y]);

    let err = run_with(add_natives(), b, vec![call]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            expected: "integer".into(),
            got: "string".into(),
        }
    );
}

#[test]
fn test_integers_promote_to_float_arguments() {
    let mut b = AstBuilder::new();
    let sixteen = b.int(16);
    let call = b.call_named("sqrt", vec![sixteen]);
    let ret = b.return_stmt(vec![call]);
    assert_eq!(run(b, vec![ret]).unwrap(), values(&[Value::Float(4.0)]));
}

#[test]
fn test_assert_raises_through_interpreter() {
    let mut b = AstBuilder::new();
    let t = b.boolean(true);
    let ok = b.call_stmt("assert", vec![t]);
    let one = b.int(1);
    let two = b.int(2);
    let eq = b.binary(one, BinaryOp::Eq, two);
    let fail = b.call_stmt("assert", vec![eq]);
    let unreachable = b.call_stmt("undefined_function", vec![]);

    let err = run(b, vec![ok, fail, unreachable]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::AssertionFailed { .. }));
}

fn length(_: &mut Interpreter, args: Registers) -> ReturnValue {
    let [x, y, z] = args.get(0).as_vec3().unwrap_or_default();
    let len = (x * x + y * y + z * z).sqrt();
    ReturnValue::single(Register::Float(f64::from(len)))
}

fn up(_: &mut Interpreter, _: Registers) -> ReturnValue {
    ReturnValue::single(Register::Vec3([0.0, 1.0, 0.0]))
}

fn vector_natives() -> NativeRegistry {
    let mut natives = NativeRegistry::with_core_natives();
    natives
        .register(
            NativeFunction::new("length", length)
                .arg("v", NativeType::Vec3)
                .returns(NativeType::Float),
        )
        .unwrap();
    natives
        .register(NativeFunction::new("up", up).returns(NativeType::Vec3))
        .unwrap();
    natives
}

#[test]
fn test_vec3_table_converts_to_host_vector() {
    let mut b = AstBuilder::new();
    let new_table = b.call_named("table", vec![]);
    let init = b.local_stmt("v", new_table);
    let mut body = vec![init];
    for (field, value) in [("x", 3), ("y", 4), ("z", 0)] {
        let v = b.var("v");
        let slot = b.field(v, field);
        let value = b.int(value);
        body.push(b.assign_stmt(vec![slot], vec![value]));
    }
    let v = b.var("v");
    let tag = b.field(v, "_type");
    let name = b.string("Vec3");
    body.push(b.assign_stmt(vec![tag], vec![name]));
    let v = b.var("v");
    let call = b.call_named("length", vec![v]);
    body.push(b.return_stmt(vec![call]));

    assert_eq!(
        run_with(vector_natives(), b, body).unwrap(),
        values(&[Value::Float(5.0)])
    );
}

#[test]
fn test_untagged_table_is_not_a_vector() {
    let mut b = AstBuilder::new();
    let new_table = b.call_named("table", vec![]);
    let call = b.call_stmt("length", vec![new_table]);
    let err = run_with(vector_natives(), b, vec![call]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
}

#[test]
fn test_vector_result_becomes_table() {
    let mut b = AstBuilder::new();
    let call = b.call_named("up", vec![]);
    let y = b.field(call, "y");
    let call = b.call_named("up", vec![]);
    let tag = b.field(call, "_type");
    let ret = b.return_stmt(vec![y, tag]);

    assert_eq!(
        run_with(vector_natives(), b, vec![ret]).unwrap(),
        values(&[Value::Float(1.0), Value::string("vec3")])
    );
}

/// `apply(f, x)` calls back into script.
fn apply(interpreter: &mut Interpreter, args: Registers) -> ReturnValue {
    let (Some(callee), Some(arg)) = (args.get(0).to_value(), args.get(1).to_value()) else {
        return ReturnValue::empty();
    };
    let mut list = ScriptValues::new();
    list.push(arg);
    match interpreter.call_function(&callee, list) {
        Ok(results) => ReturnValue::values(results),
        Err(err) => {
            interpreter.raise(err);
            ReturnValue::empty()
        }
    }
}

#[test]
fn test_native_calls_back_into_script() {
    let mut natives = NativeRegistry::new();
    natives
        .register(
            NativeFunction::new("apply", apply)
                .arg("f", NativeType::Function)
                .arg("x", NativeType::Any)
                .returns(NativeType::Any),
        )
        .unwrap();

    // return apply(function(n) return n * 3, n end, 7)
    let mut b = AstBuilder::new();
    let n = b.var("n");
    let three = b.int(3);
    let product = b.binary(n, BinaryOp::Mul, three);
    let n = b.var("n");
    let ret = b.return_stmt(vec![product, n]);
    let function = b.function(vec![VarToken::new("n")], vec![ret]);
    let seven = b.int(7);
    let call = b.call_named("apply", vec![function, seven]);
    let ret = b.return_stmt(vec![call]);

    assert_eq!(
        run_with(natives, b, vec![ret]).unwrap(),
        values(&[Value::Int(21), Value::Int(7)])
    );
}

#[test]
fn test_nullable_argument_accepts_nil() {
    fn describe(_: &mut Interpreter, args: Registers) -> ReturnValue {
        let nil = matches!(args.get(0), Register::Nil);
        ReturnValue::single(Register::Bool(nil))
    }
    let mut natives = NativeRegistry::new();
    natives
        .register(
            NativeFunction::new("is_nil", describe)
                .nullable_arg("value", NativeType::Int)
                .returns(NativeType::Bool),
        )
        .unwrap();

    let mut b = AstBuilder::new();
    let nil = b.nil();
    let call = b.call_named("is_nil", vec![nil]);
    let ret = b.return_stmt(vec![call]);
    assert_eq!(
        run_with(natives, b, vec![ret]).unwrap(),
        values(&[Value::Bool(true)])
    );
}

#[test]
fn test_context_clones_share_native_registry() {
    let context = crate::ScriptContext::with_core_natives();
    let clone = context.clone();
    assert!(std::ptr::eq(context.natives(), clone.natives()));
    assert!(!clone.natives().is_empty());
}
