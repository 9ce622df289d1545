//! Core native library available to every script.

use crate::errors::assertion_failed;
use crate::interpreter::Interpreter;
use crate::registers::{Register, Registers, ReturnValue};
use crate::table::Table;

use super::{NativeFunction, NativeRegistry, NativeType};

pub(super) fn register(registry: &mut NativeRegistry) {
    let functions = [
        NativeFunction::new("assert", assert).arg("condition", NativeType::Any),
        NativeFunction::new("print", print).arg("value", NativeType::Any),
        NativeFunction::new("table", table).returns(NativeType::Table),
        float1("abs", abs),
        float1("floor", floor),
        float1("ceil", ceil),
        float1("sqrt", sqrt),
        float1("sin", sin),
        float1("cos", cos),
        float2("min", min),
        float2("max", max),
        float2("pow", pow),
    ];
    for function in functions {
        // Core natives are all within the slot limits.
        let _ = registry.register(function);
    }
}

fn float1(name: &str, entry: super::NativeEntry) -> NativeFunction {
    NativeFunction::new(name, entry)
        .arg("x", NativeType::Float)
        .returns(NativeType::Float)
}

fn float2(name: &str, entry: super::NativeEntry) -> NativeFunction {
    NativeFunction::new(name, entry)
        .arg("a", NativeType::Float)
        .arg("b", NativeType::Float)
        .returns(NativeType::Float)
}

fn assert(interpreter: &mut Interpreter, args: Registers) -> ReturnValue {
    let passed = args.get(0).to_value().is_some_and(|v| v.is_truthy());
    if !passed {
        interpreter.raise(assertion_failed("assertion failed!"));
    }
    ReturnValue::empty()
}

fn print(_: &mut Interpreter, args: Registers) -> ReturnValue {
    if let Some(value) = args.get(0).to_value() {
        tracing::info!(target: "ember::script", "{value}");
    }
    ReturnValue::empty()
}

fn table(interpreter: &mut Interpreter, _: Registers) -> ReturnValue {
    let handle = interpreter.context().new_table(Table::new());
    ReturnValue::single(Register::Table(handle))
}

fn map1(args: &Registers, f: fn(f64) -> f64) -> ReturnValue {
    let x = args.get(0).as_float().unwrap_or_default();
    ReturnValue::single(Register::Float(f(x)))
}

fn map2(args: &Registers, f: fn(f64, f64) -> f64) -> ReturnValue {
    let a = args.get(0).as_float().unwrap_or_default();
    let b = args.get(1).as_float().unwrap_or_default();
    ReturnValue::single(Register::Float(f(a, b)))
}

fn abs(_: &mut Interpreter, args: Registers) -> ReturnValue {
    map1(&args, f64::abs)
}

fn floor(_: &mut Interpreter, args: Registers) -> ReturnValue {
    map1(&args, f64::floor)
}

fn ceil(_: &mut Interpreter, args: Registers) -> ReturnValue {
    map1(&args, f64::ceil)
}

fn sqrt(_: &mut Interpreter, args: Registers) -> ReturnValue {
    map1(&args, f64::sqrt)
}

fn sin(_: &mut Interpreter, args: Registers) -> ReturnValue {
    map1(&args, f64::sin)
}

fn cos(_: &mut Interpreter, args: Registers) -> ReturnValue {
    map1(&args, f64::cos)
}

fn min(_: &mut Interpreter, args: Registers) -> ReturnValue {
    map2(&args, f64::min)
}

fn max(_: &mut Interpreter, args: Registers) -> ReturnValue {
    map2(&args, f64::max)
}

fn pow(_: &mut Interpreter, args: Registers) -> ReturnValue {
    map2(&args, f64::powf)
}
