use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Name,
    Limit,
    Structure,
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const NO_MATCH: Self = Self(100);
    pub const TRAILING_INPUT: Self = Self(101);

    // ── Name resolution errors (E200–E299) ──
    pub const UNDEFINED_VARIABLE: Self = Self(200);
    pub const UNDEFINED_FUNCTION: Self = Self(201);
    pub const ARITY_MISMATCH: Self = Self(202);

    // ── Resource limits (E300–E399) ──
    pub const NESTING_TOO_DEEP: Self = Self(300);
    pub const RECURSION_LIMIT: Self = Self(301);
    pub const GAS_EXHAUSTED: Self = Self(302);
    pub const EVAL_TOO_DEEP: Self = Self(303);

    // ── Structure errors (E400–E499) ──
    pub const MALFORMED_TREE: Self = Self(400);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            200..=299 => ErrorCategory::Name,
            300..=399 => ErrorCategory::Limit,
            400..=499 => ErrorCategory::Structure,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Name => write!(f, "name"),
            Self::Limit => write!(f, "limit"),
            Self::Structure => write!(f, "structure"),
        }
    }
}

/// A structured, serializable error report.
///
/// Front ends render these; they must not parse free-form error strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub category: ErrorCategory,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            category: code.category(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.code, self.message)
    }
}

/// Parse failure.
///
/// Failure is total: there is no partial tree and no source position, only
/// the fact that no prefix of the input matched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No prefix of the input matched the grammar.
    #[error("no prefix of the input matched the grammar")]
    NoMatch,
    /// Parenthesis nesting exceeds the structural limit.
    #[error("maximum nesting depth is {limit}, got {depth}")]
    NestingTooDeep { depth: usize, limit: usize },
}

impl ParseError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoMatch => ErrorCode::NO_MATCH,
            Self::NestingTooDeep { .. } => ErrorCode::NESTING_TOO_DEEP,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code(), self.to_string())
    }
}
