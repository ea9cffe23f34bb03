//! Shared types for the calx toolchain.
//!
//! This crate defines the tagged syntax tree produced by the parser and
//! walked by the evaluator, the parse error type, and the stable error
//! codes every stage reports through.

mod error;
pub mod node;

pub use error::{Diagnostic, ErrorCategory, ErrorCode, ParseError};
pub use node::{Node, Tag};

/// Result type used by the parsing stage.
pub type Result<T> = std::result::Result<T, ParseError>;
