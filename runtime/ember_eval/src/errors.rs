//! Evaluation errors.
//!
//! `EvalErrorKind` carries the structured category; factory functions are the
//! public API and populate both `kind` and `message`. None of these errors
//! are fatal to the host: evaluation unwinds to the entry point, which logs
//! the error and hands it back to the caller.

use std::fmt;

use ember_ir::BinaryOp;

/// Result of evaluating a single value.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Type/Operator
    TypeMismatch {
        expected: String,
        got: String,
    },
    BinaryTypeMismatch {
        op: BinaryOp,
        left: String,
        right: String,
    },
    InvalidOperator {
        op: &'static str,
        type_name: String,
    },

    // Tables
    InvalidKey,
    StaleHandle {
        kind: &'static str,
    },

    // Arithmetic
    DivisionByZero,
    IntegerOverflow {
        operation: &'static str,
    },

    // Function
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    NotCallable {
        type_name: String,
    },
    MissingParameter {
        name: String,
    },
    StackOverflow {
        depth: usize,
    },
    SlotLimit {
        name: String,
        what: &'static str,
        limit: usize,
    },

    // Assertion
    AssertionFailed {
        message: String,
    },

    /// Catch-all for errors without a structured kind.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::BinaryTypeMismatch { op, left, right } => write!(
                f,
                "cannot apply operator `{}` to {left} and {right}",
                op.as_symbol()
            ),
            Self::InvalidOperator { op, type_name } => {
                write!(f, "operator `{op}` cannot be applied to {type_name}")
            }
            Self::InvalidKey => write!(f, "nil cannot be used as a table key"),
            Self::StaleHandle { kind } => write!(f, "{kind} handle is no longer valid"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::IntegerOverflow { operation } => {
                write!(f, "integer overflow in {operation}")
            }
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(
                    f,
                    "calling function with wrong number of arguments: {name} expects {expected} {arg_word}, got {got}"
                )
            }
            Self::NotCallable { type_name } => {
                write!(f, "trying to call non function ({type_name})")
            }
            Self::MissingParameter { name } => write!(f, "missing parameter value for `{name}`"),
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }
            Self::SlotLimit { name, what, limit } => {
                write!(f, "native function {name} declares more than {limit} {what}")
            }
            Self::AssertionFailed { message } => write!(f, "assertion failed: {message}"),
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory errors.
    pub message: String,
}

impl EvalError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError { kind, message }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Type/Operator

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn binary_type_mismatch(op: BinaryOp, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BinaryTypeMismatch {
        op,
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn invalid_operator(op: &'static str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperator {
        op,
        type_name: type_name.to_string(),
    })
}

// Tables

#[cold]
pub fn invalid_key() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidKey)
}

#[cold]
pub fn stale_handle(kind: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StaleHandle { kind })
}

// Arithmetic

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow { operation })
}

// Function

#[cold]
pub fn wrong_arg_count(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn missing_parameter(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingParameter {
        name: name.to_string(),
    })
}

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

#[cold]
pub fn slot_limit(name: &str, what: &'static str, limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SlotLimit {
        name: name.to_string(),
        what,
        limit,
    })
}

// Assertion

#[cold]
pub fn assertion_failed(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssertionFailed {
        message: message.into(),
    })
}
