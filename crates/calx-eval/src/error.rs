//! Runtime error types for the calx evaluator.

use calx_types::{Diagnostic, ErrorCode, ParseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Evaluation error. Aborts the line being executed, never the program.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EvalError {
    /// Variable lookup miss.
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    /// Function-call lookup miss.
    #[error("undefined function '{0}'")]
    UndefinedFunction(String),
    /// Fewer arguments than declared parameters.
    #[error("function '{name}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    /// Function calls nested deeper than the configured limit.
    #[error("maximum call depth is {limit}")]
    RecursionLimit { limit: usize },
    /// Expression evaluation nested deeper than the configured limit,
    /// counting parentheses and calls alike.
    #[error("maximum evaluation depth is {limit}")]
    EvalTooDeep { limit: usize },
    /// Evaluation step budget used up.
    #[error("gas exhausted after {limit} steps")]
    GasExhausted { limit: u64 },
    /// The tree does not have the shape the grammar produces.
    #[error("malformed syntax tree: {0}")]
    MalformedTree(String),
}

impl EvalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UndefinedVariable(_) => ErrorCode::UNDEFINED_VARIABLE,
            Self::UndefinedFunction(_) => ErrorCode::UNDEFINED_FUNCTION,
            Self::ArityMismatch { .. } => ErrorCode::ARITY_MISMATCH,
            Self::RecursionLimit { .. } => ErrorCode::RECURSION_LIMIT,
            Self::GasExhausted { .. } => ErrorCode::GAS_EXHAUSTED,
            Self::EvalTooDeep { .. } => ErrorCode::EVAL_TOO_DEEP,
            Self::MalformedTree(_) => ErrorCode::MALFORMED_TREE,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code(), self.to_string())
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Failure of the one-shot helpers that parse and evaluate in one go.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// The grammar matched, but text was left over.
    #[error("unconsumed input: {0:?}")]
    Trailing(String),
}

impl RunError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(e) => e.code(),
            Self::Eval(e) => e.code(),
            Self::Trailing(_) => ErrorCode::TRAILING_INPUT,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code(), self.to_string())
    }
}
