//! Static scope resolution.
//!
//! One depth-first pass assigns every variable occurrence that refers to a
//! local binding its hop count: the number of scopes between the use and
//! the declaring scope. Occurrences missing from the map are globals.
//!
//! Scope structure mirrors what the interpreter pushes at run time:
//! function literals (parameters and body share one scope), blocks, and
//! `repeat` loops (body and condition share one scope). `if` and `while`
//! open no scope of their own; their bodies are blocks.

use std::sync::Arc;

use ember_ir::{AstGraph, ExprId, ExprKind, Ident, StmtId, StmtKind};
use rustc_hash::FxHashMap;

use crate::environment::Environment;
use crate::stack::ensure_sufficient_stack;

/// Hop count per variable node, valid only for the graph it was computed on.
pub type ResolvedVariableMap = FxHashMap<ExprId, u32>;

/// Resolve the graph's top-level statements.
///
/// With a parent environment, its current bindings form the outermost scope,
/// so top-level locals and host-supplied names resolve into that
/// environment.
pub fn resolve(graph: &AstGraph, parent: Option<&Environment>) -> Arc<ResolvedVariableMap> {
    let mut resolver = Resolver::new(graph);
    resolver.with_parent(parent, |r| r.visit_stmts(graph.body()));
    Arc::new(resolver.resolved)
}

/// Resolve a single function literal of the graph.
pub fn resolve_function(
    graph: &AstGraph,
    function: ExprId,
    parent: Option<&Environment>,
) -> Arc<ResolvedVariableMap> {
    let mut resolver = Resolver::new(graph);
    resolver.with_parent(parent, |r| r.visit_expr(function));
    Arc::new(resolver.resolved)
}

/// Declared-but-not-yet-defined is `false`.
type Scope = FxHashMap<Ident, bool>;

struct Resolver<'a> {
    graph: &'a AstGraph,
    scopes: Vec<Scope>,
    resolved: ResolvedVariableMap,
}

impl<'a> Resolver<'a> {
    fn new(graph: &'a AstGraph) -> Self {
        Resolver {
            graph,
            scopes: Vec::new(),
            resolved: ResolvedVariableMap::default(),
        }
    }

    fn with_parent(&mut self, parent: Option<&Environment>, f: impl FnOnce(&mut Self)) {
        let Some(parent) = parent else {
            f(self);
            return;
        };
        self.begin_scope();
        for ident in parent.identifiers() {
            self.declare(ident);
            self.define(ident);
        }
        f(self);
        self.end_scope();
    }

    fn begin_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// No-op outside any scope: such names are globals.
    fn declare(&mut self, ident: Ident) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.entry(ident).or_insert(false);
        }
    }

    fn define(&mut self, ident: Ident) {
        if let Some(scope) = self.scopes.last_mut() {
            debug_assert!(scope.contains_key(&ident), "declare before define");
            scope.insert(ident, true);
        }
    }

    fn resolve_local(&mut self, node: ExprId, ident: Ident) {
        if let Some(hops) = self
            .scopes
            .iter()
            .rev()
            .position(|scope| scope.contains_key(&ident))
        {
            self.resolved
                .insert(node, u32::try_from(hops).unwrap_or(u32::MAX));
        }
    }

    fn visit_stmts(&mut self, stmts: &[StmtId]) {
        for &stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_exprs(&mut self, exprs: &[ExprId]) {
        for &expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_stmt(&mut self, stmt: StmtId) {
        ensure_sufficient_stack(|| self.visit_stmt_inner(stmt));
    }

    fn visit_stmt_inner(&mut self, stmt: StmtId) {
        let graph = self.graph;
        match graph.stmt(stmt) {
            StmtKind::Block(stmts) => {
                self.begin_scope();
                self.visit_stmts(stmts);
                self.end_scope();
            }
            StmtKind::Break => {}
            StmtKind::Expression(expr) => self.visit_expr(*expr),
            StmtKind::If {
                conditions,
                thens,
                otherwise,
            } => {
                for (&condition, &then) in conditions.iter().zip(thens) {
                    self.visit_expr(condition);
                    self.visit_stmt(then);
                }
                if let Some(otherwise) = otherwise {
                    self.visit_stmt(*otherwise);
                }
            }
            StmtKind::Repeat { body, condition } => {
                self.begin_scope();
                self.visit_stmts(body);
                self.visit_expr(*condition);
                self.end_scope();
            }
            StmtKind::Return(values) => self.visit_exprs(values),
            StmtKind::While { condition, body } => {
                self.visit_expr(*condition);
                self.visit_stmt(*body);
            }
        }
    }

    fn visit_expr(&mut self, expr: ExprId) {
        ensure_sufficient_stack(|| self.visit_expr_inner(expr));
    }

    fn visit_expr_inner(&mut self, expr: ExprId) {
        let graph = self.graph;
        match graph.expr(expr) {
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                self.visit_expr(*left);
                self.visit_expr(*right);
            }
            ExprKind::Unary { operand, .. } => self.visit_expr(*operand),
            ExprKind::Group(items) => self.visit_exprs(items),
            ExprKind::Literal(_) => {}
            ExprKind::VariableDeclaration { var, .. } => self.resolve_local(expr, var.ident),
            ExprKind::Variable { var, object, index } => {
                if let Some(object) = object {
                    self.visit_expr(*object);
                    if let Some(index) = index {
                        self.visit_expr(*index);
                    }
                }
                self.resolve_local(expr, var.ident);
            }
            ExprKind::Assignment { targets, values } => self.visit_assignment(targets, values),
            ExprKind::Call { callee, args } => {
                self.visit_expr(*callee);
                self.visit_exprs(args);
            }
            ExprKind::Function { params, body, .. } => {
                self.begin_scope();
                for param in params {
                    self.declare(param.ident);
                    self.define(param.ident);
                }
                self.visit_stmts(body);
                self.end_scope();
            }
        }
    }

    /// Values are resolved before targets, so `local x = x + 1` reads the
    /// outer `x`. A local bound directly to a function literal is declared
    /// first so the function can call itself.
    fn visit_assignment(&mut self, targets: &[ExprId], values: &[ExprId]) {
        let graph = self.graph;
        for (&target, &value) in targets.iter().zip(values) {
            if let (
                ExprKind::VariableDeclaration { var, local: true },
                ExprKind::Function { .. },
            ) = (graph.expr(target), graph.expr(value))
            {
                self.declare(var.ident);
                self.define(var.ident);
            }
        }

        self.visit_exprs(values);

        for &target in targets {
            match graph.expr(target) {
                ExprKind::Variable { var, object, index } => {
                    if let Some(object) = object {
                        self.visit_expr(*object);
                    }
                    if let Some(index) = index {
                        self.visit_expr(*index);
                    }
                    self.resolve_local(target, var.ident);
                }
                ExprKind::VariableDeclaration { var, local } => {
                    if *local {
                        self.declare(var.ident);
                        self.define(var.ident);
                    }
                    self.resolve_local(target, var.ident);
                }
                // Not assignable; the interpreter reports it.
                _ => self.visit_expr(target),
            }
        }
    }
}
