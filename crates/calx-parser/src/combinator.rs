//! Backtracking parser combinators over `&str`.
//!
//! A parser maps an input slice to an [`Outcome`]: the produced node plus the
//! unconsumed rest, or `None`. Failure hands nothing back, so the caller keeps
//! its original slice and an ordered choice can retry the next alternative
//! from the same position. No combinator ever mutates shared state.

use calx_types::{Node, Tag};
use regex::Regex;
use std::cell::OnceCell;
use std::rc::Rc;

/// Result of running a parser: the node and the unconsumed remainder.
pub type Outcome<'a> = Option<(Node, &'a str)>;

pub trait Parser {
    fn parse<'a>(&self, input: &'a str) -> Outcome<'a>;
}

// Allow plain functions and closures to be parsers
impl<F> Parser for F
where
    F: for<'a> Fn(&'a str) -> Outcome<'a>,
{
    fn parse<'a>(&self, input: &'a str) -> Outcome<'a> {
        self(input)
    }
}

// === Boxed Parser for type erasure ===

#[derive(Clone)]
pub struct BoxedParser {
    parser: Rc<dyn Parser>,
}

impl BoxedParser {
    /// Box a parsing function. The `Fn` bound lets closures infer that the
    /// remainder they return borrows from their input.
    pub fn new<F>(parser: F) -> Self
    where
        F: for<'a> Fn(&'a str) -> Outcome<'a> + 'static,
    {
        BoxedParser {
            parser: Rc::new(parser),
        }
    }
}

impl Parser for BoxedParser {
    fn parse<'a>(&self, input: &'a str) -> Outcome<'a> {
        self.parser.parse(input)
    }
}

// === Primitive Parsers ===

/// Match exactly one character equal to `target`, as a `Char` leaf.
pub fn literal(target: char) -> BoxedParser {
    BoxedParser::new(move |input: &str| {
        let rest = input.strip_prefix(target)?;
        let len = input.len() - rest.len();
        Some((Node::leaf(Tag::Char, &input[..len]), rest))
    })
}

/// Match `regex` at the very start of the input and emit a `tag` leaf with the
/// matched text. A match found further into the input does not count.
pub fn pattern(tag: Tag, regex: &Regex) -> BoxedParser {
    let regex = regex.clone();
    BoxedParser::new(move |input: &str| {
        let found = regex.find(input).filter(|m| m.start() == 0)?;
        let (matched, rest) = input.split_at(found.end());
        Some((Node::leaf(tag, matched), rest))
    })
}

// === Combinators ===

/// Ordered choice: the first alternative that succeeds wins.
pub fn or(parsers: Vec<BoxedParser>) -> BoxedParser {
    BoxedParser::new(move |input: &str| parsers.iter().find_map(|p| p.parse(input)))
}

/// Sequence: every parser must succeed in turn; the results become the
/// children of one `tag` branch. Any failure fails the whole sequence.
pub fn then(tag: Tag, parsers: Vec<BoxedParser>) -> BoxedParser {
    BoxedParser::new(move |input: &str| {
        let mut rest = input;
        let mut children = Vec::with_capacity(parsers.len());
        for parser in &parsers {
            let (node, after) = parser.parse(rest)?;
            children.push(node);
            rest = after;
        }
        Some((Node::branch(tag, children), rest))
    })
}

/// Like [`then`], but tries `skip` before each element and steps past it
/// when it matches. Skipped text never shows up in the tree.
pub fn then_skipping(tag: Tag, skip: BoxedParser, parsers: Vec<BoxedParser>) -> BoxedParser {
    BoxedParser::new(move |input: &str| {
        let mut rest = input;
        let mut children = Vec::with_capacity(parsers.len());
        for parser in &parsers {
            rest = skip_over(&skip, rest);
            let (node, after) = parser.parse(rest)?;
            children.push(node);
            rest = after;
        }
        Some((Node::branch(tag, children), rest))
    })
}

/// Optionally step past `skip`, then run `parser`.
pub fn skipping(skip: BoxedParser, parser: BoxedParser) -> BoxedParser {
    BoxedParser::new(move |input: &str| parser.parse(skip_over(&skip, input)))
}

/// Zero or more repetitions collected under a `tag` branch. Never fails.
pub fn some(tag: Tag, parser: BoxedParser) -> BoxedParser {
    at_least(tag, 0, parser)
}

/// `minimum` or more repetitions collected under a `tag` branch.
///
/// Repetition stops at the first failure, or at a success that consumed
/// nothing (which would otherwise repeat forever).
pub fn at_least(tag: Tag, minimum: usize, parser: BoxedParser) -> BoxedParser {
    BoxedParser::new(move |input: &str| {
        let mut rest = input;
        let mut children = Vec::new();
        while let Some((node, after)) = parser.parse(rest) {
            let progressed = after.len() < rest.len();
            children.push(node);
            rest = after;
            if !progressed {
                break;
            }
        }
        if children.len() < minimum {
            return None;
        }
        Some((Node::branch(tag, children), rest))
    })
}

/// A `head` optionally followed by one or more `tail` items.
///
/// Produces the same tree as
/// `or([then_skipping(tag, skip, [head, at_least(tail_tag, 1, tail)]), skipping(skip, head)])`
/// but runs `head` only once, so layered precedence rules stay linear
/// instead of re-parsing every operand when the continuation is absent.
pub fn chain(
    tag: Tag,
    skip: BoxedParser,
    head: BoxedParser,
    tail_tag: Tag,
    tail: BoxedParser,
) -> BoxedParser {
    let tail = at_least(tail_tag, 1, tail);
    BoxedParser::new(move |input: &str| {
        let (first, after_head) = head.parse(skip_over(&skip, input))?;
        match tail.parse(skip_over(&skip, after_head)) {
            Some((rest_node, rest)) => Some((Node::branch(tag, vec![first, rest_node]), rest)),
            None => Some((first, after_head)),
        }
    })
}

/// Choice that stops backtracking once `prefix` matches.
///
/// When `prefix` matches, the result is whatever `full` gives, success or
/// failure; `fallback` runs only when `prefix` does not match. Unlike [`or`],
/// a failing `full` is never retried as something shorter, so a failed
/// alternative cannot send the enclosing rules back over the same text.
pub fn commit(prefix: BoxedParser, full: BoxedParser, fallback: BoxedParser) -> BoxedParser {
    BoxedParser::new(move |input: &str| match prefix.parse(input) {
        Some(_) => full.parse(input),
        None => fallback.parse(input),
    })
}

/// Wrap a successful result as the sole child of a new `tag` branch.
pub fn tagged(tag: Tag, parser: BoxedParser) -> BoxedParser {
    BoxedParser::new(move |input: &str| {
        let (node, rest) = parser.parse(input)?;
        Some((Node::branch(tag, vec![node]), rest))
    })
}

/// Defer building a rule until it first runs, so rules can refer to each
/// other recursively. The rule is built once and reused afterwards.
pub fn lazy(rule: fn() -> BoxedParser) -> BoxedParser {
    let built = OnceCell::new();
    BoxedParser::new(move |input: &str| built.get_or_init(rule).parse(input))
}

fn skip_over<'a>(skip: &BoxedParser, input: &'a str) -> &'a str {
    match skip.parse(input) {
        Some((_, rest)) => rest,
        None => input,
    }
}
