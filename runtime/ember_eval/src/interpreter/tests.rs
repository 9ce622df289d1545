use super::*;
use crate::errors::EvalErrorKind;
use crate::native::NativeRegistry;
use ember_ir::{AstBuilder, BinaryOp, VarToken};
use pretty_assertions::assert_eq;

fn run(b: AstBuilder, body: Vec<StmtId>) -> EvalResult<ScriptValues> {
    let env = Environment::create(ScriptContext::new(NativeRegistry::with_core_natives()));
    InterpreterBuilder::new(env, Arc::new(b.finish(body)))
        .build()
        .interpret()
}

fn values(items: &[Value]) -> ScriptValues {
    items.iter().cloned().collect()
}

/// `local function pair() return 2, 3 end`
fn pair_function(b: &mut AstBuilder) -> StmtId {
    let two = b.int(2);
    let three = b.int(3);
    let ret = b.return_stmt(vec![two, three]);
    b.local_function_stmt("pair", vec![], vec![ret])
}

#[test]
fn test_last_value_fills_remaining_targets() {
    let mut b = AstBuilder::new();
    let def = pair_function(&mut b);
    let (ta, tb, tc) = (b.local("a"), b.local("b"), b.local("c"));
    let one = b.int(1);
    let call = b.call_named("pair", vec![]);
    let assign = b.assign_stmt(vec![ta, tb, tc], vec![one, call]);
    let (ra, rb, rc) = (b.var("a"), b.var("b"), b.var("c"));
    let ret = b.return_stmt(vec![ra, rb, rc]);

    let result = run(b, vec![def, assign, ret]).unwrap();
    assert_eq!(result, values(&[Value::Int(1), Value::Int(2), Value::Int(3)]));
}

#[test]
fn test_inner_values_contribute_only_first() {
    let mut b = AstBuilder::new();
    let def = pair_function(&mut b);
    let (ta, tb) = (b.local("a"), b.local("b"));
    let call = b.call_named("pair", vec![]);
    let nine = b.int(9);
    let assign = b.assign_stmt(vec![ta, tb], vec![call, nine]);
    let (ra, rb) = (b.var("a"), b.var("b"));
    let ret = b.return_stmt(vec![ra, rb]);

    let result = run(b, vec![def, assign, ret]).unwrap();
    assert_eq!(result, values(&[Value::Int(2), Value::Int(9)]));
}

#[test]
fn test_surplus_values_are_not_evaluated() {
    let mut b = AstBuilder::new();
    let ta = b.local("a");
    let one = b.int(1);
    // Calling nil would fail if it were evaluated.
    let boom = b.call_named("undefined_function", vec![]);
    let assign = b.assign_stmt(vec![ta], vec![one, boom]);
    let ra = b.var("a");
    let ret = b.return_stmt(vec![ra]);

    assert_eq!(run(b, vec![assign, ret]).unwrap(), values(&[Value::Int(1)]));
}

#[test]
fn test_missing_values_are_nil() {
    let mut b = AstBuilder::new();
    let (ta, tb) = (b.local("a"), b.local("b"));
    let one = b.int(1);
    let assign = b.assign_stmt(vec![ta, tb], vec![one]);
    let (ra, rb) = (b.var("a"), b.var("b"));
    let ret = b.return_stmt(vec![ra, rb]);

    assert_eq!(
        run(b, vec![assign, ret]).unwrap(),
        values(&[Value::Int(1), Value::Nil])
    );
}

#[test]
fn test_repeat_until() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let init = b.local_stmt("i", zero);
    let target = b.var("i");
    let read = b.var("i");
    let one = b.int(1);
    let inc = b.binary(read, BinaryOp::Add, one);
    let step = b.assign_stmt(vec![target], vec![inc]);
    let check = b.var("i");
    let three = b.int(3);
    let cond = b.binary(check, BinaryOp::GreaterEq, three);
    let repeat = b.repeat(vec![step], cond);
    let result = b.var("i");
    let ret = b.return_stmt(vec![result]);

    assert_eq!(
        run(b, vec![init, repeat, ret]).unwrap(),
        values(&[Value::Int(3)])
    );
}

#[test]
fn test_while_with_break() {
    // local sum, i = 0, 0
    // while true do
    //   i = i + 1
    //   if i > 4 then break end
    //   sum = sum + i
    // end
    // return sum
    let mut b = AstBuilder::new();
    let (tsum, ti) = (b.local("sum"), b.local("i"));
    let (z1, z2) = (b.int(0), b.int(0));
    let init = b.assign_stmt(vec![tsum, ti], vec![z1, z2]);

    let ti = b.var("i");
    let ri = b.var("i");
    let one = b.int(1);
    let inc = b.binary(ri, BinaryOp::Add, one);
    let step = b.assign_stmt(vec![ti], vec![inc]);

    let ri = b.var("i");
    let four = b.int(4);
    let over = b.binary(ri, BinaryOp::Greater, four);
    let brk = b.break_stmt();
    let then = b.block(vec![brk]);
    let check = b.if_stmt(vec![over], vec![then], None);

    let tsum = b.var("sum");
    let rsum = b.var("sum");
    let ri = b.var("i");
    let add = b.binary(rsum, BinaryOp::Add, ri);
    let accumulate = b.assign_stmt(vec![tsum], vec![add]);

    let body = b.block(vec![step, check, accumulate]);
    let forever = b.boolean(true);
    let while_stmt = b.while_stmt(forever, body);
    let rsum = b.var("sum");
    let ret = b.return_stmt(vec![rsum]);

    assert_eq!(
        run(b, vec![init, while_stmt, ret]).unwrap(),
        values(&[Value::Int(10)])
    );
}

#[test]
fn test_if_elseif_else() {
    fn classify(n: i64) -> Value {
        let mut b = AstBuilder::new();
        let x = b.int(n);
        let init = b.local_stmt("x", x);
        let r1 = b.var("x");
        let zero = b.int(0);
        let neg = b.binary(r1, BinaryOp::Less, zero);
        let r2 = b.var("x");
        let zero = b.int(0);
        let is_zero = b.binary(r2, BinaryOp::Eq, zero);
        let s1 = b.string("negative");
        let s1 = b.return_stmt(vec![s1]);
        let s2 = b.string("zero");
        let s2 = b.return_stmt(vec![s2]);
        let s3 = b.string("positive");
        let s3 = b.return_stmt(vec![s3]);
        let stmt = b.if_stmt(vec![neg, is_zero], vec![s1, s2], Some(s3));
        run(b, vec![init, stmt]).unwrap()[0].clone()
    }
    assert_eq!(classify(-3), Value::string("negative"));
    assert_eq!(classify(0), Value::string("zero"));
    assert_eq!(classify(8), Value::string("positive"));
}

#[test]
fn test_logical_operators_yield_deciding_operand() {
    let mut b = AstBuilder::new();
    let def = pair_function(&mut b);
    let nil = b.nil();
    let five = b.int(5);
    let or = b.logical(nil, LogicalOp::Or, five);
    let f = b.boolean(false);
    let boom = b.call_named("undefined_function", vec![]);
    let and = b.logical(f, LogicalOp::And, boom);
    let f = b.boolean(false);
    let call = b.call_named("pair", vec![]);
    let spread = b.logical(f, LogicalOp::Or, call);
    let ret = b.return_stmt(vec![or, and, spread]);

    assert_eq!(
        run(b, vec![def, ret]).unwrap(),
        values(&[
            Value::Int(5),
            Value::Bool(false),
            Value::Int(2),
            Value::Int(3)
        ])
    );
}

#[test]
fn test_table_fields_and_indices() {
    let mut b = AstBuilder::new();
    let new_table = b.call_named("table", vec![]);
    let init = b.local_stmt("t", new_table);
    let t = b.var("t");
    let field = b.field(t, "x");
    let five = b.int(5);
    let s1 = b.assign_stmt(vec![field], vec![five]);
    let t = b.var("t");
    let one = b.int(1);
    let slot = b.index(t, one);
    let a = b.string("a");
    let s2 = b.assign_stmt(vec![slot], vec![a]);
    let t = b.var("t");
    let rx = b.field(t, "x");
    let t = b.var("t");
    let one = b.int(1);
    let r1 = b.index(t, one);
    let ret = b.return_stmt(vec![rx, r1]);

    assert_eq!(
        run(b, vec![init, s1, s2, ret]).unwrap(),
        values(&[Value::Int(5), Value::string("a")])
    );
}

#[test]
fn test_nil_table_key_is_an_error() {
    let mut b = AstBuilder::new();
    let new_table = b.call_named("table", vec![]);
    let init = b.local_stmt("t", new_table);
    let t = b.var("t");
    let nil = b.nil();
    let slot = b.index(t, nil);
    let one = b.int(1);
    let write = b.assign_stmt(vec![slot], vec![one]);

    let err = run(b, vec![init, write]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::InvalidKey);
}

#[test]
fn test_field_of_non_table_is_type_mismatch() {
    let mut b = AstBuilder::new();
    let five = b.int(5);
    let read = b.field(five, "x");
    let ret = b.return_stmt(vec![read]);

    let err = run(b, vec![ret]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            expected: "table".into(),
            got: "integer".into(),
        }
    );
}

#[test]
fn test_method_call_uses_table_field() {
    // local obj = table(); obj.speed = 3
    // obj.get = function(self) return self.speed end
    // return obj.get()
    let mut b = AstBuilder::new();
    let new_table = b.call_named("table", vec![]);
    let init = b.local_stmt("obj", new_table);
    let obj = b.var("obj");
    let speed = b.field(obj, "speed");
    let three = b.int(3);
    let s1 = b.assign_stmt(vec![speed], vec![three]);
    let this = b.var("self");
    let read = b.field(this, "speed");
    let ret = b.return_stmt(vec![read]);
    let getter = b.function(vec![VarToken::new("self")], vec![ret]);
    let obj = b.var("obj");
    let slot = b.field(obj, "get");
    let s2 = b.assign_stmt(vec![slot], vec![getter]);
    let obj = b.var("obj");
    let call = b.method(obj, "get", vec![]);
    let ret = b.return_stmt(vec![call]);

    assert_eq!(
        run(b, vec![init, s1, s2, ret]).unwrap(),
        values(&[Value::Int(3)])
    );
}

#[test]
fn test_method_call_falls_back_to_free_function() {
    // function double(x) return x * 2 end
    // return (10).double()
    let mut b = AstBuilder::new();
    let x = b.var("x");
    let two = b.int(2);
    let product = b.binary(x, BinaryOp::Mul, two);
    let ret = b.return_stmt(vec![product]);
    let def = b.function_stmt("double", vec![VarToken::new("x")], vec![ret]);
    let ten = b.int(10);
    let call = b.method(ten, "double", vec![]);
    let ret = b.return_stmt(vec![call]);

    assert_eq!(run(b, vec![def, ret]).unwrap(), values(&[Value::Int(20)]));
}

#[test]
fn test_calling_non_function_fails() {
    let mut b = AstBuilder::new();
    let five = b.int(5);
    let init = b.local_stmt("x", five);
    let call = b.call_stmt("x", vec![]);

    let err = run(b, vec![init, call]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NotCallable {
            type_name: "integer".into()
        }
    );
}

#[test]
fn test_interpret_function_with_arguments() {
    let mut b = AstBuilder::new();
    let x = b.var("x");
    let y = b.var("y");
    let sum = b.binary(x, BinaryOp::Add, y);
    let ret = b.return_stmt(vec![sum]);
    let function = b.function(vec![VarToken::new("x"), VarToken::new("y")], vec![ret]);
    let graph = Arc::new(b.finish(vec![]));
    let env = Environment::new(ScriptContext::new(NativeRegistry::new()));

    let mut interpreter = InterpreterBuilder::new(env, graph).build();
    let result = interpreter
        .interpret_function(function, values(&[Value::Int(2), Value::Int(40)]))
        .unwrap();
    assert_eq!(result, values(&[Value::Int(42)]));
}

#[test]
fn test_interpreter_recovers_after_error() {
    let mut b = AstBuilder::new();
    let boom = b.call_stmt("undefined_function", vec![]);
    let one = b.int(1);
    let ret = b.return_stmt(vec![one]);
    let graph = Arc::new(b.finish(vec![boom]));
    let env = Environment::new(ScriptContext::new(NativeRegistry::new()));

    let mut interpreter = InterpreterBuilder::new(env.clone(), graph).build();
    assert!(interpreter.interpret().is_err());
    assert!(interpreter.environment().ptr_eq(&env));
    assert_eq!(
        interpreter.interpret_statement(ret).unwrap(),
        values(&[Value::Int(1)])
    );
}
