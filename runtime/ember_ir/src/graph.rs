//! The AST graph of one script asset.
//!
//! A graph owns flat arenas of expressions and statements plus the list of
//! top-level statements. Graphs are immutable once built; the evaluator shares
//! them behind `Arc` so script closures can outlive the interpreter that
//! created them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ExprId, ExprKind, StmtId, StmtKind};

/// Errors produced while encoding or decoding a serialized graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("malformed graph payload: {0}")]
    Codec(#[from] bincode::Error),
    #[error("expression {index} out of range (graph has {len} expressions)")]
    DanglingExpr { index: u32, len: usize },
    #[error("statement {index} out of range (graph has {len} statements)")]
    DanglingStmt { index: u32, len: usize },
    #[error("if statement has {conditions} conditions but {thens} branches")]
    UnbalancedIf { conditions: usize, thens: usize },
    #[error("{arena} {index} is its own ancestor")]
    Cycle { arena: &'static str, index: u32 },
}

/// Arena-backed AST for one script.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AstGraph {
    exprs: Vec<ExprKind>,
    stmts: Vec<StmtKind>,
    body: Vec<StmtId>,
}

impl AstGraph {
    pub(crate) fn from_parts(exprs: Vec<ExprKind>, stmts: Vec<StmtKind>, body: Vec<StmtId>) -> Self {
        AstGraph { exprs, stmts, body }
    }

    /// Look up an expression node.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()]
    }

    /// Look up a statement node.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &StmtKind {
        &self.stmts[id.index()]
    }

    /// Top-level statements, in source order.
    pub fn body(&self) -> &[StmtId] {
        &self.body
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    /// Encode into the structured binary asset format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GraphError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the structured binary asset format.
    ///
    /// The decoded graph is validated so that every child reference lands
    /// inside the arenas and no node contains itself; a payload that fails
    /// validation is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GraphError> {
        let graph: AstGraph = bincode::deserialize(bytes)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Check that all node references are in range and that no node is its
    /// own ancestor.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.check_stmts(&self.body)?;
        let mut children = Vec::new();
        for node in self.nodes() {
            if let Node::Stmt(id) = node {
                if let StmtKind::If { conditions, thens, .. } = self.stmt(id) {
                    if conditions.len() != thens.len() {
                        return Err(GraphError::UnbalancedIf {
                            conditions: conditions.len(),
                            thens: thens.len(),
                        });
                    }
                }
            }
            children.clear();
            self.children(node, &mut children);
            for child in &children {
                match *child {
                    Node::Expr(id) => self.check_expr(id)?,
                    Node::Stmt(id) => self.check_stmt(id)?,
                }
            }
        }
        self.check_acyclic()
    }

    /// Every node in both arenas.
    fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        let exprs = (0u32..).zip(&self.exprs).map(|(i, _)| Node::Expr(ExprId::new(i)));
        let stmts = (0u32..).zip(&self.stmts).map(|(i, _)| Node::Stmt(StmtId::new(i)));
        exprs.chain(stmts)
    }

    /// Direct children of a node, across both arenas.
    fn children(&self, node: Node, out: &mut Vec<Node>) {
        match node {
            Node::Expr(id) => match self.expr(id) {
                ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                    out.extend([Node::Expr(*left), Node::Expr(*right)]);
                }
                ExprKind::Unary { operand, .. } => out.push(Node::Expr(*operand)),
                ExprKind::Group(items) => exprs(out, items),
                ExprKind::Literal(_) | ExprKind::VariableDeclaration { .. } => {}
                ExprKind::Variable { object, index, .. } => {
                    out.extend(object.iter().chain(index.iter()).copied().map(Node::Expr));
                }
                ExprKind::Assignment { targets, values } => {
                    exprs(out, targets);
                    exprs(out, values);
                }
                ExprKind::Call { callee, args } => {
                    out.push(Node::Expr(*callee));
                    exprs(out, args);
                }
                ExprKind::Function { body, .. } => stmts(out, body),
            },
            Node::Stmt(id) => match self.stmt(id) {
                StmtKind::Block(body) => stmts(out, body),
                StmtKind::Break => {}
                StmtKind::Expression(expr) => out.push(Node::Expr(*expr)),
                StmtKind::If {
                    conditions,
                    thens,
                    otherwise,
                } => {
                    exprs(out, conditions);
                    stmts(out, thens);
                    out.extend(otherwise.iter().copied().map(Node::Stmt));
                }
                StmtKind::Repeat { body, condition } => {
                    stmts(out, body);
                    out.push(Node::Expr(*condition));
                }
                StmtKind::Return(values) => exprs(out, values),
                StmtKind::While { condition, body } => {
                    out.push(Node::Expr(*condition));
                    out.push(Node::Stmt(*body));
                }
            },
        }
    }

    /// Iterative depth-first walk; reaching a node that is still open means
    /// it is its own ancestor. Shared subtrees are fine.
    ///
    /// Requires every child reference to be in range.
    fn check_acyclic(&self) -> Result<(), GraphError> {
        let mut expr_marks = vec![Mark::Unvisited; self.exprs.len()];
        let mut stmt_marks = vec![Mark::Unvisited; self.stmts.len()];
        let mut stack = Vec::new();
        let mut children = Vec::new();

        for root in self.nodes() {
            stack.push(Visit::Enter(root));
            while let Some(visit) = stack.pop() {
                match visit {
                    Visit::Enter(node) => {
                        let mark = match node {
                            Node::Expr(id) => &mut expr_marks[id.index()],
                            Node::Stmt(id) => &mut stmt_marks[id.index()],
                        };
                        match *mark {
                            Mark::Done => continue,
                            Mark::Open => return Err(node.cycle()),
                            Mark::Unvisited => *mark = Mark::Open,
                        }
                        stack.push(Visit::Exit(node));
                        children.clear();
                        self.children(node, &mut children);
                        stack.extend(children.iter().copied().map(Visit::Enter));
                    }
                    Visit::Exit(Node::Expr(id)) => expr_marks[id.index()] = Mark::Done,
                    Visit::Exit(Node::Stmt(id)) => stmt_marks[id.index()] = Mark::Done,
                }
            }
        }
        Ok(())
    }

    fn check_expr(&self, id: ExprId) -> Result<(), GraphError> {
        if id.index() < self.exprs.len() {
            Ok(())
        } else {
            Err(GraphError::DanglingExpr {
                index: id.raw(),
                len: self.exprs.len(),
            })
        }
    }

    fn check_stmt(&self, id: StmtId) -> Result<(), GraphError> {
        if id.index() < self.stmts.len() {
            Ok(())
        } else {
            Err(GraphError::DanglingStmt {
                index: id.raw(),
                len: self.stmts.len(),
            })
        }
    }

    fn check_stmts(&self, ids: &[StmtId]) -> Result<(), GraphError> {
        ids.iter().try_for_each(|id| self.check_stmt(*id))
    }
}

fn exprs(out: &mut Vec<Node>, ids: &[ExprId]) {
    out.extend(ids.iter().copied().map(Node::Expr));
}

fn stmts(out: &mut Vec<Node>, ids: &[StmtId]) {
    out.extend(ids.iter().copied().map(Node::Stmt));
}

#[derive(Copy, Clone, Debug)]
enum Node {
    Expr(ExprId),
    Stmt(StmtId),
}

impl Node {
    fn cycle(self) -> GraphError {
        match self {
            Node::Expr(id) => GraphError::Cycle {
                arena: "expression",
                index: id.raw(),
            },
            Node::Stmt(id) => GraphError::Cycle {
                arena: "statement",
                index: id.raw(),
            },
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Open,
    Done,
}

#[derive(Copy, Clone)]
enum Visit {
    Enter(Node),
    Exit(Node),
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
