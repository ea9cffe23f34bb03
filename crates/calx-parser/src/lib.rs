//! calx parser: turns program text into a tagged [`Node`] tree.
//!
//! The grammar is a fixed composition of backtracking combinators (see
//! [`combinator`]). Parsing either matches a prefix of the input, reporting
//! whatever text was left over, or fails as a whole with no partial tree.

pub mod combinator;
pub mod grammar;

use calx_types::{Node, ParseError, Result};
use combinator::Parser;

/// Maximum parenthesis nesting accepted before parsing starts.
pub const MAX_NESTING_DEPTH: usize = 64;

/// A successful parse: the tree and the text the grammar did not consume.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<'src> {
    pub ast: Node,
    pub remainder: &'src str,
}

impl Parsed<'_> {
    /// `true` when nothing but whitespace was left unconsumed.
    pub fn is_complete(&self) -> bool {
        self.remainder.trim().is_empty()
    }
}

/// Parse a whole program.
///
/// A program that matched no line at all fails with [`ParseError::NoMatch`]
/// unless the input is blank; otherwise unconsumed trailing text is reported
/// in [`Parsed::remainder`].
pub fn parse(text: &str) -> Result<Parsed<'_>> {
    check_nesting(text)?;
    let (ast, remainder) = grammar::program()
        .parse(text)
        .ok_or(ParseError::NoMatch)?;
    if ast.children().is_empty() && !remainder.trim().is_empty() {
        return Err(ParseError::NoMatch);
    }
    Ok(Parsed { ast, remainder })
}

/// Parse a single expression, leaving any trailing text in the remainder.
pub fn parse_expression(text: &str) -> Result<Parsed<'_>> {
    check_nesting(text)?;
    let (ast, remainder) = grammar::expression()
        .parse(text)
        .ok_or(ParseError::NoMatch)?;
    Ok(Parsed { ast, remainder })
}

/// Reject input whose parentheses nest deeper than [`MAX_NESTING_DEPTH`];
/// the recursive descent would otherwise grow the stack without bound.
fn check_nesting(text: &str) -> Result<()> {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    if deepest > MAX_NESTING_DEPTH {
        return Err(ParseError::NestingTooDeep {
            depth: deepest,
            limit: MAX_NESTING_DEPTH,
        });
    }
    Ok(())
}
