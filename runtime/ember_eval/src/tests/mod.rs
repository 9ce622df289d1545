//! End-to-end script scenarios, built with `AstBuilder` since the parser
//! lives outside this workspace.

mod native_tests;

use std::sync::Arc;

use ember_ir::{AstBuilder, StmtId};

use crate::{
    init_tracing, Environment, EvalResult, InterpreterBuilder, NativeRegistry, ScriptContext,
    ScriptValues, Value,
};

fn run_with(
    natives: NativeRegistry,
    b: AstBuilder,
    body: Vec<StmtId>,
) -> EvalResult<ScriptValues> {
    init_tracing();
    let env = Environment::create(ScriptContext::new(natives));
    InterpreterBuilder::new(env, Arc::new(b.finish(body)))
        .build()
        .interpret()
}

fn run(b: AstBuilder, body: Vec<StmtId>) -> EvalResult<ScriptValues> {
    run_with(NativeRegistry::with_core_natives(), b, body)
}

fn values(items: &[Value]) -> ScriptValues {
    items.iter().cloned().collect()
}
