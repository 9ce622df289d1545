//! Programmatic construction of AST graphs.
//!
//! The parser is an external collaborator; hosts and tests that want to run
//! scripts without it build graphs directly through this builder.

use crate::{
    AstGraph, BinaryOp, ExprId, ExprKind, Literal, LogicalOp, StmtId, StmtKind, TypeHint, UnaryOp,
    VarToken,
};

/// Incremental builder for an [`AstGraph`].
///
/// Every method allocates one node and returns its id. Children must be
/// allocated before their parents, so ids always point backwards.
#[derive(Default)]
pub struct AstBuilder {
    exprs: Vec<ExprKind>,
    stmts: Vec<StmtKind>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression node.
    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId::new(arena_index(self.exprs.len()));
        self.exprs.push(kind);
        id
    }

    /// Allocate a statement node.
    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId::new(arena_index(self.stmts.len()));
        self.stmts.push(kind);
        id
    }

    /// Finish the graph with the given top-level statements.
    pub fn finish(self, body: Vec<StmtId>) -> AstGraph {
        AstGraph::from_parts(self.exprs, self.stmts, body)
    }

    // Literals

    pub fn nil(&mut self) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Nil))
    }

    pub fn boolean(&mut self, value: bool) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Bool(value)))
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Int(value)))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Float(value)))
    }

    pub fn string(&mut self, value: impl Into<String>) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Str(value.into())))
    }

    // Operators

    pub fn binary(&mut self, left: ExprId, op: BinaryOp, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { left, op, right })
    }

    pub fn logical(&mut self, left: ExprId, op: LogicalOp, right: ExprId) -> ExprId {
        self.expr(ExprKind::Logical { left, op, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn group(&mut self, items: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Group(items))
    }

    // Variables

    /// Read of (or assignment to) a plain variable.
    pub fn var(&mut self, name: &str) -> ExprId {
        self.expr(ExprKind::Variable {
            var: VarToken::new(name),
            object: None,
            index: None,
        })
    }

    /// `local name` declaration target.
    pub fn local(&mut self, name: &str) -> ExprId {
        self.expr(ExprKind::VariableDeclaration {
            var: VarToken::new(name),
            local: true,
        })
    }

    /// `local name: types` declaration target.
    pub fn typed_local(&mut self, name: &str, types: Vec<TypeHint>) -> ExprId {
        self.expr(ExprKind::VariableDeclaration {
            var: VarToken::typed(name, types),
            local: true,
        })
    }

    /// Non-local declaration target, e.g. the name in `function f() end`.
    pub fn global_decl(&mut self, name: &str) -> ExprId {
        self.expr(ExprKind::VariableDeclaration {
            var: VarToken::new(name),
            local: false,
        })
    }

    /// `object.name`
    pub fn field(&mut self, object: ExprId, name: &str) -> ExprId {
        self.expr(ExprKind::Variable {
            var: VarToken::new(name),
            object: Some(object),
            index: None,
        })
    }

    /// `object[key]`
    pub fn index(&mut self, object: ExprId, key: ExprId) -> ExprId {
        self.expr(ExprKind::Variable {
            var: VarToken::new(""),
            object: Some(object),
            index: Some(key),
        })
    }

    pub fn assign(&mut self, targets: Vec<ExprId>, values: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Assignment { targets, values })
    }

    pub fn call(&mut self, callee: ExprId, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Call { callee, args })
    }

    /// Call a function by name.
    pub fn call_named(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        let callee = self.var(name);
        self.call(callee, args)
    }

    /// `object.name(args)`
    pub fn method(&mut self, object: ExprId, name: &str, args: Vec<ExprId>) -> ExprId {
        let callee = self.field(object, name);
        self.call(callee, args)
    }

    pub fn function(&mut self, params: Vec<VarToken>, body: Vec<StmtId>) -> ExprId {
        self.expr(ExprKind::Function {
            params,
            returns: Vec::new(),
            body,
        })
    }

    // Statements

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expression(expr))
    }

    pub fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Block(stmts))
    }

    pub fn break_stmt(&mut self) -> StmtId {
        self.stmt(StmtKind::Break)
    }

    pub fn if_stmt(
        &mut self,
        conditions: Vec<ExprId>,
        thens: Vec<StmtId>,
        otherwise: Option<StmtId>,
    ) -> StmtId {
        self.stmt(StmtKind::If {
            conditions,
            thens,
            otherwise,
        })
    }

    pub fn repeat(&mut self, body: Vec<StmtId>, condition: ExprId) -> StmtId {
        self.stmt(StmtKind::Repeat { body, condition })
    }

    pub fn while_stmt(&mut self, condition: ExprId, body: StmtId) -> StmtId {
        self.stmt(StmtKind::While { condition, body })
    }

    pub fn return_stmt(&mut self, values: Vec<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(values))
    }

    /// `targets = values` as a statement.
    pub fn assign_stmt(&mut self, targets: Vec<ExprId>, values: Vec<ExprId>) -> StmtId {
        let expr = self.assign(targets, values);
        self.expr_stmt(expr)
    }

    /// `local name = value` as a statement.
    pub fn local_stmt(&mut self, name: &str, value: ExprId) -> StmtId {
        let target = self.local(name);
        self.assign_stmt(vec![target], vec![value])
    }

    /// `function name(params) body end` as a statement.
    pub fn function_stmt(&mut self, name: &str, params: Vec<VarToken>, body: Vec<StmtId>) -> StmtId {
        let target = self.global_decl(name);
        let function = self.function(params, body);
        self.assign_stmt(vec![target], vec![function])
    }

    /// `local function name(params) body end` as a statement.
    pub fn local_function_stmt(
        &mut self,
        name: &str,
        params: Vec<VarToken>,
        body: Vec<StmtId>,
    ) -> StmtId {
        let target = self.local(name);
        let function = self.function(params, body);
        self.assign_stmt(vec![target], vec![function])
    }

    /// `name(args)` as a statement.
    pub fn call_stmt(&mut self, name: &str, args: Vec<ExprId>) -> StmtId {
        let call = self.call_named(name, args);
        self.expr_stmt(call)
    }
}

/// Arena sizes are bounded by `u32`.
fn arena_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
