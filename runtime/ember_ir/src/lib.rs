//! Ember IR - AST surface shared by the resolver, interpreter and asset cache.
//!
//! # Architecture
//!
//! - `AstGraph`: flat arenas of `ExprKind` / `StmtKind` nodes, indexed by
//!   `ExprId` / `StmtId`. A node's id doubles as its identity for the
//!   resolver's hop-count map.
//! - `AstBuilder`: programmatic construction for hosts and tests.
//! - `Ident`: stable 64-bit hash of a source name.
//!
//! Graphs serialize with `bincode` and are validated on decode.

mod ast;
mod builder;
mod graph;
mod ident;
mod ids;

pub use ast::{BinaryOp, ExprKind, Literal, LogicalOp, StmtKind, TypeHint, UnaryOp, VarToken};
pub use builder::AstBuilder;
pub use graph::{AstGraph, GraphError};
pub use ident::Ident;
pub use ids::{ExprId, StmtId};
