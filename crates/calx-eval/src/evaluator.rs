//! Core expression and line evaluator.

use std::fmt;

use calx_types::{Node, Tag};
use serde::{Deserialize, Serialize};

use crate::env::{Environment, Function};
use crate::error::{EvalError, EvalResult};

/// Default evaluation steps allowed per top-level line.
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;

/// Default maximum depth of nested function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// Default maximum depth of nested `eval` frames, across calls. Keeps the
/// native stack bounded whatever mix of parentheses and calls a program uses.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 512;

/// Resource limits applied while evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalLimits {
    /// Evaluation steps allowed for a single top-level line.
    pub gas_limit: u64,
    /// Deepest allowed nesting of function calls.
    pub max_call_depth: usize,
    /// Deepest allowed nesting of evaluated nodes.
    pub max_eval_depth: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }
}

/// Gas, call-depth and eval-depth accounting for one evaluation.
#[derive(Debug, Clone)]
pub struct Budget {
    limits: EvalLimits,
    gas: u64,
    calls: usize,
    depth: usize,
}

impl Budget {
    pub fn new(limits: EvalLimits) -> Self {
        Self {
            limits,
            gas: 0,
            calls: 0,
            depth: 0,
        }
    }

    /// Consume one unit of gas. Returns error if exhausted.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.limits.gas_limit {
            Err(EvalError::GasExhausted {
                limit: self.limits.gas_limit,
            })
        } else {
            Ok(())
        }
    }

    fn enter_call(&mut self) -> EvalResult<()> {
        if self.calls >= self.limits.max_call_depth {
            return Err(EvalError::RecursionLimit {
                limit: self.limits.max_call_depth,
            });
        }
        self.calls += 1;
        Ok(())
    }

    fn exit_call(&mut self) {
        self.calls = self.calls.saturating_sub(1);
    }

    fn descend(&mut self) -> EvalResult<()> {
        if self.depth >= self.limits.max_eval_depth {
            return Err(EvalError::EvalTooDeep {
                limit: self.limits.max_eval_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn reset(&mut self) {
        self.gas = 0;
        self.calls = 0;
        self.depth = 0;
    }

    pub fn gas_used(&self) -> u64 {
        self.gas
    }

    pub fn limits(&self) -> EvalLimits {
        self.limits
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Line results
// ══════════════════════════════════════════════════════════════════════════════

/// What one top-level line produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LineResult {
    /// `name = expression` stored a value.
    Assignment { name: String, value: f64 },
    /// A bare expression was evaluated.
    Value { value: f64 },
    /// The line failed; nothing was assigned.
    Error { error: EvalError },
}

impl LineResult {
    pub fn assignment(name: impl Into<String>, value: f64) -> Self {
        Self::Assignment {
            name: name.into(),
            value,
        }
    }

    pub fn value(value: f64) -> Self {
        Self::Value { value }
    }

    pub fn error(error: EvalError) -> Self {
        Self::Error { error }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for LineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignment { name, value } => write!(f, "{name} = {value}"),
            Self::Value { value } => write!(f, "{value}"),
            Self::Error { error } => write!(f, "{}", error.to_diagnostic()),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expression evaluation
// ══════════════════════════════════════════════════════════════════════════════

/// Evaluate an expression subtree to a number.
pub fn eval<'ast>(
    node: &'ast Node,
    env: &Environment<'ast>,
    budget: &mut Budget,
) -> EvalResult<f64> {
    budget.tick()?;
    budget.descend()?;
    let result = eval_node(node, env, budget);
    budget.ascend();
    result
}

fn eval_node<'ast>(
    node: &'ast Node,
    env: &Environment<'ast>,
    budget: &mut Budget,
) -> EvalResult<f64> {
    match node.tag() {
        Tag::Expression => eval(child(node, 0)?, env, budget),
        Tag::Sum | Tag::Multiplication => eval_fold(node, env, budget),
        // `(` expression `)`
        Tag::Unit => eval(child(node, 1)?, env, budget),
        Tag::Number => {
            let text = literal(node)?;
            text.parse::<f64>()
                .map_err(|_| malformed(format!("invalid number literal '{text}'")))
        }
        Tag::Variable => {
            let name = literal(node)?;
            env.get(name)
                .ok_or_else(|| EvalError::UndefinedVariable(name.to_string()))
        }
        Tag::FunctionCall => eval_call(node, env, budget),
        other => Err(malformed(format!("cannot evaluate a {other} node"))),
    }
}

/// Left fold over `head Terms[Term[op operand]...]`.
fn eval_fold<'ast>(
    node: &'ast Node,
    env: &Environment<'ast>,
    budget: &mut Budget,
) -> EvalResult<f64> {
    let mut acc = eval(child(node, 0)?, env, budget)?;
    for term in child(node, 1)?.children() {
        let op = child(term, 0)?;
        let rhs = eval(child(term, 1)?, env, budget)?;
        acc = match (node.tag(), op.tag()) {
            (Tag::Sum, Tag::OpAdd) => acc + rhs,
            (Tag::Sum, Tag::OpMinus) => acc - rhs,
            (Tag::Multiplication, Tag::OpMult) => acc * rhs,
            // IEEE semantics: x/0 is ±inf, 0/0 is NaN.
            (Tag::Multiplication, Tag::OpDiv) => acc / rhs,
            (parent, op) => return Err(malformed(format!("{op} operator inside {parent}"))),
        };
    }
    Ok(acc)
}

/// `name ( Arguments[Argument[expr delim]...] )`
fn eval_call<'ast>(
    node: &'ast Node,
    env: &Environment<'ast>,
    budget: &mut Budget,
) -> EvalResult<f64> {
    let name = literal(child(node, 0)?)?;
    let function = env
        .function(name)
        .ok_or_else(|| EvalError::UndefinedFunction(name.to_string()))?;

    // Arguments are evaluated in the caller's frame, left to right.
    let args = child(node, 2)?
        .children()
        .iter()
        .map(|arg| eval(child(arg, 0)?, env, budget))
        .collect::<EvalResult<Vec<f64>>>()?;
    if args.len() < function.params.len() {
        return Err(EvalError::ArityMismatch {
            name: name.to_string(),
            expected: function.params.len(),
            got: args.len(),
        });
    }

    let frame = env.call_frame(&function.params, &args);
    budget.enter_call()?;
    let result = eval(function.body, &frame, budget);
    budget.exit_call();
    result
}

// ══════════════════════════════════════════════════════════════════════════════
// Program execution
// ══════════════════════════════════════════════════════════════════════════════

/// Executes programs line by line against one persistent environment.
#[derive(Debug)]
pub struct Evaluator<'ast> {
    env: Environment<'ast>,
    budget: Budget,
}

impl<'ast> Evaluator<'ast> {
    /// Create an evaluator with default limits.
    pub fn new() -> Self {
        Self::with_limits(EvalLimits::default())
    }

    pub fn with_limits(limits: EvalLimits) -> Self {
        Self {
            env: Environment::new(),
            budget: Budget::new(limits),
        }
    }

    /// Execute every line of a `Lines` tree in source order.
    ///
    /// Function declarations produce no result. A failing line reports an
    /// error and execution continues with the next line.
    pub fn execute(&mut self, program: &'ast Node) -> Vec<LineResult> {
        if program.tag() != Tag::Lines {
            let error = malformed(format!("expected a Lines node, got {}", program.tag()));
            return vec![LineResult::error(error)];
        }
        program
            .children()
            .iter()
            .filter_map(|line| self.exec_line(line))
            .collect()
    }

    /// Execute one `Line` (or a bare statement node).
    pub fn exec_line(&mut self, line: &'ast Node) -> Option<LineResult> {
        self.budget.reset();
        match self.exec_statement(line) {
            Ok(result) => result,
            Err(error) => Some(LineResult::error(error)),
        }
    }

    fn exec_statement(&mut self, line: &'ast Node) -> EvalResult<Option<LineResult>> {
        let stmt = match line.tag() {
            Tag::Line => child(line, 0)?,
            _ => line,
        };
        match stmt.tag() {
            Tag::VariableDeclaration => {
                let name = literal(child(stmt, 0)?)?;
                let value = eval(child(stmt, 2)?, &self.env, &mut self.budget)?;
                self.env.assign(name, value);
                Ok(Some(LineResult::assignment(name, value)))
            }
            Tag::FunctionDeclaration => {
                let name = literal(child(stmt, 0)?)?;
                let params = child(stmt, 2)?
                    .children()
                    .iter()
                    .map(|param| literal(child(param, 0)?).map(str::to_string))
                    .collect::<EvalResult<Vec<String>>>()?;
                let body = child(stmt, 5)?;
                self.env.declare(name, Function { params, body });
                Ok(None)
            }
            _ => {
                let value = eval(stmt, &self.env, &mut self.budget)?;
                Ok(Some(LineResult::value(value)))
            }
        }
    }

    /// Current value of a top-level variable.
    pub fn variable(&self, name: &str) -> Option<f64> {
        self.env.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.env.has_function(name)
    }

    pub fn environment(&self) -> &Environment<'ast> {
        &self.env
    }

    /// Gas consumed by the most recent line.
    pub fn gas_used(&self) -> u64 {
        self.budget.gas_used()
    }
}

impl Default for Evaluator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tree access ──────────────────────────────────────────────────────────────

fn child(node: &Node, index: usize) -> EvalResult<&Node> {
    node.child(index).ok_or_else(|| {
        malformed(format!("{} node has no child at index {index}", node.tag()))
    })
}

fn literal(node: &Node) -> EvalResult<&str> {
    node.value()
        .ok_or_else(|| malformed(format!("{} node carries no literal", node.tag())))
}

fn malformed(detail: String) -> EvalError {
    EvalError::MalformedTree(detail)
}
