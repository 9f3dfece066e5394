//! Runtime errors for the interpreter

use thiserror::Error;

/// Runtime error during evaluation
///
/// Every variant carries enough context to render a message for the user.
/// Errors abort the current top-level statement only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("undefined identifier: {0}")]
    UndefinedIdentifier(String),

    #[error("undefined function: {0}")]
    UndefinedFunction(String),

    #[error("function {name} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("unsupported operation {op}: {operands}")]
    UnsupportedOperation { op: String, operands: String },

    #[error("builtin already registered: {0}")]
    DuplicateBuiltin(String),

    #[error("recursion limit exceeded: more than {0} nested calls")]
    RecursionLimitExceeded(usize),
}

impl EvalError {
    pub fn undefined_identifier(name: &str) -> Self {
        EvalError::UndefinedIdentifier(name.to_string())
    }

    pub fn undefined_function(name: &str) -> Self {
        EvalError::UndefinedFunction(name.to_string())
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        EvalError::ArityMismatch {
            name: name.to_string(),
            expected,
            got,
        }
    }

    pub fn unsupported(op: &str, operands: &str) -> Self {
        EvalError::UnsupportedOperation {
            op: op.to_string(),
            operands: operands.to_string(),
        }
    }

    pub fn duplicate_builtin(name: &str) -> Self {
        EvalError::DuplicateBuiltin(name.to_string())
    }

    /// Short machine-friendly kind name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            EvalError::UndefinedIdentifier(_) => "undefined_identifier",
            EvalError::UndefinedFunction(_) => "undefined_function",
            EvalError::ArityMismatch { .. } => "arity_mismatch",
            EvalError::DivisionByZero => "division_by_zero",
            EvalError::UnsupportedOperation { .. } => "unsupported_operation",
            EvalError::DuplicateBuiltin(_) => "duplicate_builtin",
            EvalError::RecursionLimitExceeded(_) => "recursion_limit_exceeded",
        }
    }
}

/// Result type for interpreter operations
pub type EvalResult<T> = Result<T, EvalError>;
