//! Tree-walking interpreter.
//!
//! Every expression evaluates to a list of zero or more values: calls,
//! groups and function bodies may produce several. Statements return a
//! [`Flow`] signal instead of unwinding: `Break` stops at the nearest loop,
//! `Return` travels to the function boundary carrying its values, and
//! errors propagate as `Err` up to the entry point, where they are logged
//! once and handed back to the host.
//!
//! # Frames
//!
//! A script function carries the graph and hop-count map it was created
//! from. Calling it swaps those in along with a fresh environment, so one
//! interpreter can run closures that originate from different scripts.

mod builder;
mod call;

pub use builder::InterpreterBuilder;

use std::mem;
use std::sync::Arc;

use ember_ir::{AstGraph, ExprId, ExprKind, Ident, Literal, LogicalOp, StmtId, StmtKind};
use parking_lot::RwLock;

use crate::context::ScriptContext;
use crate::environment::Environment;
use crate::errors::{stale_handle, type_mismatch, EvalError, EvalResult};
use crate::function::{FunctionValue, ScriptFunction};
use crate::operators::evaluate_binary;
use crate::resolver::ResolvedVariableMap;
use crate::stack::ensure_sufficient_stack;
use crate::table::Table;
use crate::unary_operators::evaluate_unary;
use crate::value::{ScriptValues, Value};

/// Default limit on nested script calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

/// Control signal produced by executing a statement.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Next,
    Break,
    Return(ScriptValues),
}

/// Executes one script graph against an environment chain.
///
/// Single-threaded per invocation; build one interpreter per thread.
pub struct Interpreter {
    context: ScriptContext,
    graph: Arc<AstGraph>,
    resolved: Arc<ResolvedVariableMap>,
    /// Environment the graph's top level runs in.
    root: Environment,
    /// Innermost scope of the running frame.
    env: Environment,
    /// Target of unresolved reads and writes.
    global: Environment,
    /// Error raised by a native during the current call.
    pending_error: Option<EvalError>,
    call_depth: usize,
    max_call_depth: usize,
}

impl Interpreter {
    /// Interpreter for `graph`, whose hop counts were computed against
    /// `env` (see [`crate::resolve`]).
    pub fn new(env: Environment, graph: Arc<AstGraph>, resolved: Arc<ResolvedVariableMap>) -> Self {
        let global = env.global_environment().clone();
        Interpreter {
            context: env.context().clone(),
            graph,
            resolved,
            root: env.clone(),
            env,
            global,
            pending_error: None,
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn context(&self) -> &ScriptContext {
        &self.context
    }

    /// Innermost scope of the running frame.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn graph(&self) -> &Arc<AstGraph> {
        &self.graph
    }

    /// Run the graph's top-level statements. Returns the values of a
    /// top-level `return`, or nothing.
    pub fn interpret(&mut self) -> EvalResult<ScriptValues> {
        let graph = Arc::clone(&self.graph);
        self.entry(|this| this.exec_stmts(graph.body()).map(Flow::into_values))
    }

    /// Run a single statement of the graph in the root environment.
    pub fn interpret_statement(&mut self, stmt: StmtId) -> EvalResult<ScriptValues> {
        self.entry(|this| this.exec_stmt(stmt).map(Flow::into_values))
    }

    /// Instantiate the function literal `function` in the root environment
    /// and call it.
    pub fn interpret_function(
        &mut self,
        function: ExprId,
        args: ScriptValues,
    ) -> EvalResult<ScriptValues> {
        self.entry(|this| {
            let callee = this.eval_first(function)?;
            this.call_value(&callee, args)
        })
    }

    /// Call any function value. Natives use this to call back into script.
    pub fn call_function(&mut self, callee: &Value, args: ScriptValues) -> EvalResult<ScriptValues> {
        self.call_value(callee, args).inspect_err(|err| {
            tracing::error!(error = %err, "script call failed");
        })
    }

    /// Report an error from inside a native. The interpreter surfaces it
    /// when the native returns; the first error raised wins.
    pub fn raise(&mut self, error: EvalError) {
        if self.pending_error.is_none() {
            self.pending_error = Some(error);
        }
    }

    fn entry<T>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        let saved = mem::replace(&mut self.env, self.root.clone());
        self.pending_error = None;
        let result = f(self);
        self.env = saved;
        result.inspect_err(|err| {
            tracing::error!(error = %err, "script evaluation failed");
        })
    }

    // Statements

    fn exec_stmts(&mut self, stmts: &[StmtId]) -> EvalResult<Flow> {
        for &stmt in stmts {
            match self.exec_stmt(stmt)? {
                Flow::Next => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Next)
    }

    fn exec_stmt(&mut self, stmt: StmtId) -> EvalResult<Flow> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt))
    }

    fn exec_stmt_inner(&mut self, stmt: StmtId) -> EvalResult<Flow> {
        let graph = Arc::clone(&self.graph);
        match graph.stmt(stmt) {
            StmtKind::Block(stmts) => self.in_child_scope(|this| this.exec_stmts(stmts)),
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Expression(expr) => {
                self.eval_expr(*expr)?;
                Ok(Flow::Next)
            }
            StmtKind::If {
                conditions,
                thens,
                otherwise,
            } => {
                for (&condition, &then) in conditions.iter().zip(thens) {
                    if self.eval_first(condition)?.is_truthy() {
                        return self.exec_stmt(then);
                    }
                }
                match otherwise {
                    Some(otherwise) => self.exec_stmt(*otherwise),
                    None => Ok(Flow::Next),
                }
            }
            StmtKind::Repeat { body, condition } => self.in_child_scope(|this| loop {
                match this.exec_stmts(body)? {
                    Flow::Next => {}
                    Flow::Break => return Ok(Flow::Next),
                    flow @ Flow::Return(_) => return Ok(flow),
                }
                if this.eval_first(*condition)?.is_truthy() {
                    return Ok(Flow::Next);
                }
            }),
            StmtKind::Return(exprs) => {
                let mut values = ScriptValues::new();
                for &expr in exprs {
                    values.extend(self.eval_expr(expr)?);
                }
                Ok(Flow::Return(values))
            }
            StmtKind::While { condition, body } => {
                while self.eval_first(*condition)?.is_truthy() {
                    match self.exec_stmt(*body)? {
                        Flow::Next => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Next)
            }
        }
    }

    fn in_child_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let child = self.env.child();
        let parent = mem::replace(&mut self.env, child);
        let result = f(self);
        self.env = parent;
        result
    }

    // Expressions

    /// First value of an expression; nil if it produced none.
    fn eval_first(&mut self, expr: ExprId) -> EvalResult {
        Ok(self.eval_expr(expr)?.into_iter().next().unwrap_or_default())
    }

    fn eval_expr(&mut self, expr: ExprId) -> EvalResult<ScriptValues> {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: ExprId) -> EvalResult<ScriptValues> {
        let graph = Arc::clone(&self.graph);
        let value = match graph.expr(expr) {
            ExprKind::Binary { left, op, right } => {
                let left = self.eval_first(*left)?;
                let right = self.eval_first(*right)?;
                evaluate_binary(&left, *op, &right)?
            }
            ExprKind::Logical { left, op, right } => {
                let left = self.eval_first(*left)?;
                let decided = match op {
                    LogicalOp::And => left.is_falsey(),
                    LogicalOp::Or => left.is_truthy(),
                };
                if decided {
                    left
                } else {
                    return self.eval_expr(*right);
                }
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_first(*operand)?;
                evaluate_unary(*op, &operand)?
            }
            ExprKind::Group(items) => {
                let mut values = ScriptValues::new();
                for &item in items {
                    values.extend(self.eval_expr(item)?);
                }
                return Ok(values);
            }
            ExprKind::Literal(literal) => literal_value(literal),
            ExprKind::VariableDeclaration { var, .. } => self.read_variable(expr, var.ident),
            ExprKind::Variable { var, object, index } => match object {
                Some(object) => {
                    let object = self.eval_first(*object)?;
                    let key = match index {
                        Some(index) => self.eval_first(*index)?,
                        None => Value::string(&var.name),
                    };
                    let table = table_of(&object)?;
                    let value = table.read().get(&key)?;
                    value
                }
                None => self.read_variable(expr, var.ident),
            },
            ExprKind::Assignment { targets, values } => {
                self.assign(targets, values)?;
                return Ok(ScriptValues::new());
            }
            ExprKind::Call { callee, args } => return self.eval_call(*callee, args),
            ExprKind::Function { .. } => {
                let handle = self.context.new_function(ScriptFunction {
                    graph: Arc::clone(&self.graph),
                    resolved: Arc::clone(&self.resolved),
                    function: expr,
                    closure: self.env.clone(),
                });
                Value::Function(FunctionValue::Script(handle))
            }
        };
        Ok(smallvec::smallvec![value])
    }

    fn read_variable(&self, node: ExprId, ident: Ident) -> Value {
        match self.resolved.get(&node) {
            Some(&distance) => self.env.get_value_at(distance, ident),
            None => self.global.get_value(ident),
        }
    }

    fn write_variable(&self, node: ExprId, ident: Ident, value: Value) {
        match self.resolved.get(&node) {
            Some(&distance) => self.env.set_value_at(distance, ident, value),
            None => self.global.set_value(ident, value),
        }
    }

    /// Pair targets with values left to right. Every value expression but
    /// the last contributes its first value; the last fills all remaining
    /// targets. Value expressions without a target are not evaluated, and
    /// targets without a value receive nil.
    fn assign(&mut self, targets: &[ExprId], values: &[ExprId]) -> EvalResult<()> {
        let mut spill = ScriptValues::new().into_iter();
        for (position, &target) in targets.iter().enumerate() {
            let value = match values.get(position) {
                Some(&expr) if position + 1 == values.len() => {
                    spill = self.eval_expr(expr)?.into_iter();
                    spill.next().unwrap_or_default()
                }
                Some(&expr) => self.eval_first(expr)?,
                None => spill.next().unwrap_or_default(),
            };
            self.assign_target(target, value)?;
        }
        Ok(())
    }

    fn assign_target(&mut self, target: ExprId, value: Value) -> EvalResult<()> {
        let graph = Arc::clone(&self.graph);
        match graph.expr(target) {
            ExprKind::Variable {
                var,
                object: Some(object),
                index,
            } => {
                let object = self.eval_first(*object)?;
                let key = match index {
                    Some(index) => self.eval_first(*index)?,
                    None => Value::string(&var.name),
                };
                table_of(&object)?.write().set(key, value)
            }
            ExprKind::Variable { var, .. } | ExprKind::VariableDeclaration { var, .. } => {
                self.write_variable(target, var.ident, value);
                Ok(())
            }
            _ => Err(EvalError::new("cannot assign to this expression")),
        }
    }
}

impl Flow {
    fn into_values(self) -> ScriptValues {
        match self {
            Flow::Return(values) => values,
            Flow::Next | Flow::Break => ScriptValues::new(),
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Nil => Value::Nil,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(n) => Value::Int(*n),
        Literal::Float(x) => Value::Float(*x),
        Literal::Str(s) => Value::string(s),
    }
}

/// Table behind a value, or a type mismatch.
fn table_of(value: &Value) -> EvalResult<Arc<RwLock<Table>>> {
    value
        .as_table()
        .ok_or_else(|| type_mismatch("table", value.type_name()))?
        .get()
        .ok_or_else(|| stale_handle("table"))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
