use super::*;
use crate::{AstBuilder, BinaryOp, Literal, TypeHint, VarToken};
use pretty_assertions::assert_eq;

fn sample_graph() -> AstGraph {
    let mut b = AstBuilder::new();
    let n = b.var("n");
    let one = b.int(1);
    let sub = b.binary(n, BinaryOp::Sub, one);
    let ret = b.return_stmt(vec![sub]);
    let param = VarToken::typed("n", vec![TypeHint::Integer]);
    let decl = b.function_stmt("dec", vec![param], vec![ret]);
    let arg = b.float(2.5);
    let call = b.call_stmt("dec", vec![arg]);
    b.finish(vec![decl, call])
}

#[test]
fn test_bytes_roundtrip_preserves_graph() {
    let graph = sample_graph();
    let bytes = graph.to_bytes().unwrap();
    let decoded = AstGraph::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, graph);
}

#[test]
fn test_truncated_payload_is_rejected() {
    let bytes = sample_graph().to_bytes().unwrap();
    let result = AstGraph::from_bytes(&bytes[..bytes.len() / 2]);
    assert!(matches!(result, Err(GraphError::Codec(_))));
}

#[test]
fn test_empty_payload_is_rejected() {
    assert!(AstGraph::from_bytes(&[]).is_err());
}

#[test]
fn test_dangling_expr_fails_validation() {
    let graph = AstGraph::from_parts(
        vec![ExprKind::Unary {
            op: crate::UnaryOp::Minus,
            operand: ExprId::new(5),
        }],
        vec![],
        vec![],
    );
    assert!(matches!(
        graph.validate(),
        Err(GraphError::DanglingExpr { index: 5, len: 1 })
    ));
}

#[test]
fn test_dangling_body_stmt_fails_validation() {
    let graph = AstGraph::from_parts(
        vec![ExprKind::Literal(Literal::Nil)],
        vec![],
        vec![StmtId::new(0)],
    );
    assert!(matches!(
        graph.validate(),
        Err(GraphError::DanglingStmt { index: 0, len: 0 })
    ));
}

#[test]
fn test_unbalanced_if_fails_validation() {
    let graph = AstGraph::from_parts(
        vec![ExprKind::Literal(Literal::Bool(true))],
        vec![StmtKind::If {
            conditions: vec![ExprId::new(0)],
            thens: vec![],
            otherwise: None,
        }],
        vec![StmtId::new(0)],
    );
    assert!(matches!(
        graph.validate(),
        Err(GraphError::UnbalancedIf {
            conditions: 1,
            thens: 0
        })
    ));
}

#[test]
fn test_self_referencing_expr_fails_validation() {
    let graph = AstGraph::from_parts(
        vec![ExprKind::Unary {
            op: crate::UnaryOp::Minus,
            operand: ExprId::new(0),
        }],
        vec![StmtKind::Expression(ExprId::new(0))],
        vec![StmtId::new(0)],
    );
    assert!(matches!(
        graph.validate(),
        Err(GraphError::Cycle {
            arena: "expression",
            index: 0
        })
    ));
}

#[test]
fn test_self_containing_block_fails_validation() {
    let graph = AstGraph::from_parts(vec![], vec![StmtKind::Block(vec![StmtId::new(0)])], vec![]);
    assert!(matches!(graph.validate(), Err(GraphError::Cycle { .. })));
}

#[test]
fn test_cycle_across_arenas_fails_validation() {
    // function() <stmt 0> end, where stmt 0 evaluates the function itself.
    let graph = AstGraph::from_parts(
        vec![ExprKind::Function {
            params: vec![],
            returns: vec![],
            body: vec![StmtId::new(0)],
        }],
        vec![StmtKind::Expression(ExprId::new(0))],
        vec![StmtId::new(0)],
    );
    assert!(matches!(graph.validate(), Err(GraphError::Cycle { .. })));
}

#[test]
fn test_shared_subtree_passes_validation() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let twice = b.binary(one, BinaryOp::Add, one);
    let stmt = b.expr_stmt(twice);
    let block = b.block(vec![stmt, stmt]);
    let graph = b.finish(vec![block, block]);
    assert!(graph.validate().is_ok());
}

#[test]
fn test_deep_graph_validates_without_recursion() {
    let mut b = AstBuilder::new();
    let mut expr = b.int(1);
    for _ in 0..200_000 {
        expr = b.unary(crate::UnaryOp::Minus, expr);
    }
    let stmt = b.expr_stmt(expr);
    let graph = b.finish(vec![stmt]);
    assert!(graph.validate().is_ok());
}

#[test]
fn test_operator_symbols() {
    assert_eq!(BinaryOp::Eq.as_symbol(), "==");
    assert_eq!(BinaryOp::NotEq.as_symbol(), "!=");
    assert_eq!(crate::UnaryOp::Bang.as_symbol(), "!");
    assert_eq!(crate::UnaryOp::Not.as_symbol(), "not");
}

#[test]
fn test_admits_nil() {
    assert!(VarToken::new("x").admits_nil());
    assert!(VarToken::typed("x", vec![TypeHint::Integer, TypeHint::Nil]).admits_nil());
    assert!(VarToken::typed("x", vec![TypeHint::Any]).admits_nil());
    assert!(!VarToken::typed("x", vec![TypeHint::Integer]).admits_nil());
}
