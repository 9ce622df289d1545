//! Expression and statement node kinds.
//!
//! The node set is closed: the resolver and interpreter dispatch with an
//! exhaustive `match`. Children are referenced by arena index, never boxed.

use serde::{Deserialize, Serialize};

use crate::{ExprId, Ident, StmtId};

/// Binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl BinaryOp {
    /// Source spelling, used in diagnostics.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
        }
    }
}

/// Short-circuiting operators. They yield the deciding operand, not a bool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

/// Unary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Minus,
    /// `not x`: collapses any value to a boolean.
    Not,
    /// `!x`: strict negation, booleans and integers only.
    Bang,
    /// `~x`: bitwise complement.
    Tilde,
}

impl UnaryOp {
    /// Source spelling, used in diagnostics.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Not => "not",
            UnaryOp::Bang => "!",
            UnaryOp::Tilde => "~",
        }
    }
}

/// Literal constants as they appear in source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Declared type annotation on a parameter or local.
///
/// Only used to decide whether a missing argument may default to nil; no
/// static checking is performed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeHint {
    Any,
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    Function,
    Table,
    /// Host-defined type such as `vec3f`.
    Named(String),
}

/// A named variable occurrence together with its optional type annotations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarToken {
    pub ident: Ident,
    pub name: String,
    /// Union of accepted types; empty means untyped.
    pub types: Vec<TypeHint>,
}

impl VarToken {
    /// Untyped variable.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        VarToken {
            ident: Ident::from_name(&name),
            name,
            types: Vec::new(),
        }
    }

    /// Variable annotated with a union of types.
    pub fn typed(name: impl Into<String>, types: Vec<TypeHint>) -> Self {
        VarToken {
            types,
            ..VarToken::new(name)
        }
    }

    /// Whether nil is an acceptable value for this variable.
    pub fn admits_nil(&self) -> bool {
        self.types.is_empty()
            || self
                .types
                .iter()
                .any(|t| matches!(t, TypeHint::Any | TypeHint::Nil))
    }
}

/// Expression node kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Binary {
        left: ExprId,
        op: BinaryOp,
        right: ExprId,
    },
    Logical {
        left: ExprId,
        op: LogicalOp,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    /// Parenthesized list; every member contributes all of its values.
    Group(Vec<ExprId>),
    Literal(Literal),
    /// Declaration target. `local` introduces a binding in the current scope;
    /// a non-local declaration writes wherever the name resolves.
    VariableDeclaration {
        var: VarToken,
        local: bool,
    },
    /// Variable read or assignment target. With `object`, this is a field
    /// access `object.name`; with `object` and `index`, `object[index]`.
    Variable {
        var: VarToken,
        object: Option<ExprId>,
        index: Option<ExprId>,
    },
    Assignment {
        targets: Vec<ExprId>,
        values: Vec<ExprId>,
    },
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
    },
    Function {
        params: Vec<VarToken>,
        returns: Vec<TypeHint>,
        body: Vec<StmtId>,
    },
}

/// Statement node kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    Break,
    Expression(ExprId),
    /// `if c0 then t0 elseif c1 then t1 ... else e end`; `conditions` and
    /// `thens` have equal length.
    If {
        conditions: Vec<ExprId>,
        thens: Vec<StmtId>,
        otherwise: Option<StmtId>,
    },
    /// `repeat body until condition`; the condition sees the body's locals.
    Repeat {
        body: Vec<StmtId>,
        condition: ExprId,
    },
    Return(Vec<ExprId>),
    While {
        condition: ExprId,
        body: StmtId,
    },
}
