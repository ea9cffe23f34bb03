//! The calx grammar, built from the combinators.
//!
//! Precedence (lowest → highest):
//! 3. `+`, `-` (left fold)
//! 2. `*`, `/` (left fold)
//! 1. `( expr )`, call, variable, number
//!
//! Spaces and tabs may precede any token. Each rule is a function returning
//! a fresh parser; recursive references go through [`lazy`].

use std::sync::LazyLock;

use calx_types::Tag;
use regex::Regex;

use crate::combinator::{
    chain, commit, lazy, literal, or, pattern, skipping, some, tagged, then_skipping,
    BoxedParser,
};

fn anchored(source: &str) -> Regex {
    Regex::new(source).expect("grammar regex must compile")
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| anchored(r"^[ \t\r]*"));
static BLANK: LazyLock<Regex> = LazyLock::new(|| anchored(r"^[\s;]*"));
static NUMBER: LazyLock<Regex> = LazyLock::new(|| anchored(r"^-?[0-9]+(?:\.[0-9]+)?"));
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| anchored(r"^[a-zA-Z][a-zA-Z0-9]*"));
static ARGUMENT_DELIMITER: LazyLock<Regex> = LazyLock::new(|| anchored(r"^,?"));
static LINE_DELIMITER: LazyLock<Regex> = LazyLock::new(|| anchored(r"^(?:[\n;][\s;]*|\z)"));

// ══════════════════════════════════════════════════════════════════════════════
// Terminals
// ══════════════════════════════════════════════════════════════════════════════

pub fn whitespace() -> BoxedParser {
    pattern(Tag::Whitespace, &WHITESPACE)
}

/// number := `-?[0-9]+(\.[0-9]+)?`
pub fn number() -> BoxedParser {
    pattern(Tag::Number, &NUMBER)
}

/// variable := `[a-zA-Z][a-zA-Z0-9]*`
pub fn variable() -> BoxedParser {
    pattern(Tag::Variable, &VARIABLE)
}

/// Optional comma between arguments and parameters.
pub fn argument_delimiter() -> BoxedParser {
    pattern(Tag::ArgumentDelimiter, &ARGUMENT_DELIMITER)
}

/// Newlines and semicolons ending a line, or the end of the input.
pub fn line_delimiter() -> BoxedParser {
    pattern(Tag::Whitespace, &LINE_DELIMITER)
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// expression := sum
pub fn expression() -> BoxedParser {
    tagged(Tag::Expression, sum())
}

/// sum := multiplication { ("+" | "-") multiplication }
pub fn sum() -> BoxedParser {
    let operator = or(vec![
        tagged(Tag::OpAdd, literal('+')),
        tagged(Tag::OpMinus, literal('-')),
    ]);
    let term = then_skipping(Tag::Term, whitespace(), vec![operator, multiplication()]);
    chain(Tag::Sum, whitespace(), multiplication(), Tag::Terms, term)
}

/// multiplication := unit { ("*" | "/") unit }
pub fn multiplication() -> BoxedParser {
    let operator = or(vec![
        tagged(Tag::OpMult, literal('*')),
        tagged(Tag::OpDiv, literal('/')),
    ]);
    let term = then_skipping(Tag::Term, whitespace(), vec![operator, unit()]);
    chain(Tag::Multiplication, whitespace(), unit(), Tag::Terms, term)
}

/// unit := "(" expression ")" | function_call | variable | number
///
/// A name followed by `(` is always a call: if the call fails the unit
/// fails, rather than falling back to the bare variable and re-reading the
/// parenthesis as the next operand.
pub fn unit() -> BoxedParser {
    let call_start = then_skipping(
        Tag::FunctionCall,
        whitespace(),
        vec![variable(), literal('(')],
    );
    or(vec![
        then_skipping(
            Tag::Unit,
            whitespace(),
            vec![literal('('), lazy(expression), literal(')')],
        ),
        commit(
            call_start,
            skipping(whitespace(), lazy(function_call)),
            skipping(whitespace(), variable()),
        ),
        skipping(whitespace(), number()),
    ])
}

/// function_call := variable "(" { expression [","] } ")"
pub fn function_call() -> BoxedParser {
    let argument = then_skipping(
        Tag::Argument,
        whitespace(),
        vec![lazy(expression), argument_delimiter()],
    );
    then_skipping(
        Tag::FunctionCall,
        whitespace(),
        vec![
            variable(),
            literal('('),
            some(Tag::Arguments, argument),
            literal(')'),
        ],
    )
}

// ══════════════════════════════════════════════════════════════════════════════
// Program
// ══════════════════════════════════════════════════════════════════════════════

/// variable_declaration := variable "=" expression
pub fn variable_declaration() -> BoxedParser {
    then_skipping(
        Tag::VariableDeclaration,
        whitespace(),
        vec![variable(), literal('='), expression()],
    )
}

/// function_declaration := variable "(" { variable [","] } ")" "=" expression
pub fn function_declaration() -> BoxedParser {
    let parameter = then_skipping(
        Tag::Parameter,
        whitespace(),
        vec![variable(), argument_delimiter()],
    );
    then_skipping(
        Tag::FunctionDeclaration,
        whitespace(),
        vec![
            variable(),
            literal('('),
            some(Tag::Parameters, parameter),
            literal(')'),
            literal('='),
            expression(),
        ],
    )
}

/// declaration := variable_declaration | function_declaration
pub fn declaration() -> BoxedParser {
    or(vec![variable_declaration(), function_declaration()])
}

/// line := (declaration | expression) line_delimiter
///
/// Declarations go first so `x=1` is never read as the expression `x`.
pub fn line() -> BoxedParser {
    then_skipping(
        Tag::Line,
        whitespace(),
        vec![or(vec![declaration(), expression()]), line_delimiter()],
    )
}

/// program := { line }, after any leading blank lines.
pub fn program() -> BoxedParser {
    skipping(pattern(Tag::Whitespace, &BLANK), some(Tag::Lines, line()))
}
