//! calx tree-walking evaluator.
//!
//! Executes a parsed program line by line against one environment of numeric
//! variables and user-defined functions, producing one [`LineResult`] per
//! assignment or expression line.
//!
//! ```text
//! source → calx_parser::parse → Node (Lines) → Evaluator::execute → [LineResult]
//! ```

mod env;
mod error;
mod evaluator;

pub use env::{Environment, Function, FunctionTable, Variables};
pub use error::{EvalError, EvalResult, RunError};
pub use evaluator::{
    eval, Budget, EvalLimits, Evaluator, LineResult, DEFAULT_GAS_LIMIT, DEFAULT_MAX_CALL_DEPTH,
    DEFAULT_MAX_EVAL_DEPTH,
};

use calx_types::Node;

/// Execute a parsed program with a fresh environment and default limits.
pub fn execute(ast: &Node) -> Vec<LineResult> {
    Evaluator::new().execute(ast)
}

/// Parse and execute a whole program. Leftover text is an error here.
pub fn run(source: &str) -> Result<Vec<LineResult>, RunError> {
    let parsed = calx_parser::parse(source)?;
    if !parsed.is_complete() {
        return Err(RunError::Trailing(parsed.remainder.to_string()));
    }
    Ok(execute(&parsed.ast))
}

/// Parse and evaluate a single expression in an empty environment.
pub fn parse_eval(text: &str) -> Result<f64, RunError> {
    let parsed = calx_parser::parse_expression(text)?;
    if !parsed.is_complete() {
        return Err(RunError::Trailing(parsed.remainder.to_string()));
    }
    let env = Environment::new();
    let mut budget = Budget::new(EvalLimits::default());
    Ok(eval(&parsed.ast, &env, &mut budget)?)
}
