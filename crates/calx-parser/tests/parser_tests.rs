//! Grammar tests for the calx parser.
//!
//! Covers: terminals, precedence layering, unit alternatives, declarations,
//! program lines and delimiters, leftover text, failure, structural limits,
//! rendering, and determinism.

use calx_parser::{parse, parse_expression, Parsed, MAX_NESTING_DEPTH};
use calx_types::{Node, ParseError, Tag};
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse a program, panicking on failure.
fn parse_ok(source: &str) -> Parsed<'_> {
    parse(source).unwrap_or_else(|e| panic!("failed to parse {source:?}: {e}"))
}

/// Parse an expression that must consume all input; return the node under
/// the `Expression` wrapper.
fn expr(source: &str) -> Node {
    let parsed = parse_expression(source).expect("expression should parse");
    assert!(parsed.is_complete(), "leftover {:?}", parsed.remainder);
    assert_eq!(parsed.ast.tag(), Tag::Expression);
    parsed.ast.children()[0].clone()
}

/// The statement node of each program line.
fn statements(source: &str) -> Vec<Node> {
    parse_ok(source)
        .ast
        .children()
        .iter()
        .map(|line| {
            assert_eq!(line.tag(), Tag::Line);
            line.children()[0].clone()
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────
// Terminals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_number_literal() {
    assert_eq!(expr("42"), Node::leaf(Tag::Number, "42"));
}

#[test]
fn test_negative_number_literal() {
    assert_eq!(expr("-7"), Node::leaf(Tag::Number, "-7"));
}

#[test]
fn test_fractional_number_literal() {
    assert_eq!(expr("2.25"), Node::leaf(Tag::Number, "2.25"));
}

#[test]
fn test_variable_literal() {
    assert_eq!(expr("abc12"), Node::leaf(Tag::Variable, "abc12"));
}

#[test]
fn test_leading_whitespace_is_skipped() {
    assert_eq!(expr("   \t x"), Node::leaf(Tag::Variable, "x"));
}

// ─────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_multiplication_binds_tighter_than_sum() {
    let node = expr("2+3*4");
    assert_eq!(node.tag(), Tag::Sum);
    assert_eq!(node.children()[0], Node::leaf(Tag::Number, "2"));
    let terms = &node.children()[1];
    assert_eq!(terms.tag(), Tag::Terms);
    let term = &terms.children()[0];
    assert_eq!(term.children()[0].tag(), Tag::OpAdd);
    assert_eq!(term.children()[1].tag(), Tag::Multiplication);
}

#[test]
fn test_parentheses_override_precedence() {
    let node = expr("(2+3)*4");
    assert_eq!(node.tag(), Tag::Multiplication);
    let unit = &node.children()[0];
    assert_eq!(unit.tag(), Tag::Unit);
    assert_eq!(unit.children()[1].tag(), Tag::Expression);
    assert_eq!(unit.children()[1].children()[0].tag(), Tag::Sum);
}

#[test]
fn test_chain_of_same_precedence_is_flat() {
    let node = expr("8-3-2");
    assert_eq!(node.tag(), Tag::Sum);
    let terms = node.children()[1].children();
    assert_eq!(terms.len(), 2);
    assert!(terms.iter().all(|t| t.children()[0].tag() == Tag::OpMinus));
}

#[test]
fn test_operator_tags() {
    let node = expr("1*2/3");
    let ops: Vec<Tag> = node.children()[1]
        .children()
        .iter()
        .map(|t| t.children()[0].tag())
        .collect();
    assert_eq!(ops, vec![Tag::OpMult, Tag::OpDiv]);
}

#[test]
fn test_negative_operand_after_operator() {
    let node = expr("2*-3");
    let term = &node.children()[1].children()[0];
    assert_eq!(term.children()[1], Node::leaf(Tag::Number, "-3"));
}

#[test]
fn test_whitespace_insensitive() {
    assert_eq!(
        parse_expression("1 +   2").unwrap().ast,
        parse_expression("1+2").unwrap().ast
    );
    assert_eq!(
        parse_expression(" ( 2 + 3 ) * 4").unwrap().ast,
        parse_expression("(2+3)*4").unwrap().ast
    );
}

// ─────────────────────────────────────────────────────────────────────
// Calls
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_call_is_preferred_over_variable() {
    let node = expr("f(1, 2)");
    assert_eq!(node.tag(), Tag::FunctionCall);
    assert_eq!(node.children()[0].value(), Some("f"));
    assert_eq!(node.children()[2].tag(), Tag::Arguments);
    assert_eq!(node.children()[2].children().len(), 2);
}

#[test]
fn test_call_without_arguments() {
    let node = expr("g()");
    assert_eq!(node.tag(), Tag::FunctionCall);
    assert!(node.children()[2].children().is_empty());
}

#[test]
fn test_call_arguments_need_no_commas() {
    let node = expr("f(1 x 2)");
    assert_eq!(node.children()[2].children().len(), 3);
}

#[test]
fn test_space_before_call_parenthesis() {
    // `x (2)` is a call, exactly like `x(2)`.
    let node = expr("f(1 x (2))");
    let args = node.children()[2].children();
    assert_eq!(args.len(), 2);
    assert_eq!(args[1].children()[0].children()[0].tag(), Tag::FunctionCall);
}

#[test]
fn test_nested_calls() {
    let node = expr("f(g(1), h())");
    let args = node.children()[2].children();
    assert_eq!(args[0].children()[0].children()[0].tag(), Tag::FunctionCall);
    assert_eq!(args[1].children()[0].children()[0].tag(), Tag::FunctionCall);
}

// ─────────────────────────────────────────────────────────────────────
// Program lines
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_variable_declaration() {
    let stmts = statements("x = 1 + 2");
    assert_eq!(stmts.len(), 1);
    let decl = &stmts[0];
    assert_eq!(decl.tag(), Tag::VariableDeclaration);
    assert_eq!(decl.children()[0].value(), Some("x"));
    assert_eq!(decl.children()[2].tag(), Tag::Expression);
}

#[test]
fn test_function_declaration() {
    let stmts = statements("f(a,b)=a+b*2");
    let decl = &stmts[0];
    assert_eq!(decl.tag(), Tag::FunctionDeclaration);
    let params: Vec<&str> = decl.children()[2]
        .children()
        .iter()
        .filter_map(|p| p.children()[0].value())
        .collect();
    assert_eq!(params, vec!["a", "b"]);
    assert_eq!(decl.children()[5].tag(), Tag::Expression);
}

#[test]
fn test_function_declaration_parameters_need_no_commas() {
    let stmts = statements("f(a b) = a");
    assert_eq!(stmts[0].children()[2].children().len(), 2);
}

#[test]
fn test_call_line_is_an_expression() {
    let stmts = statements("f(x)");
    assert_eq!(stmts[0].tag(), Tag::Expression);
    assert_eq!(stmts[0].children()[0].tag(), Tag::FunctionCall);
}

#[test]
fn test_lines_split_on_semicolons_and_newlines() {
    let stmts = statements("x=2;y=x*3\n\n  y;\n");
    let tags: Vec<Tag> = stmts.iter().map(Node::tag).collect();
    assert_eq!(
        tags,
        vec![Tag::VariableDeclaration, Tag::VariableDeclaration, Tag::Expression]
    );
}

#[test]
fn test_leading_blank_lines() {
    let parsed = parse_ok("\n\n ;\n x = 1");
    assert_eq!(parsed.ast.children().len(), 1);
    assert_eq!(parsed.remainder, "");
}

#[test]
fn test_empty_program() {
    let parsed = parse_ok("");
    assert_eq!(parsed.ast, Node::branch(Tag::Lines, vec![]));
    let blank = parse_ok("  \n\t\n");
    assert!(blank.ast.children().is_empty());
    assert!(blank.is_complete());
}

// ─────────────────────────────────────────────────────────────────────
// Leftovers and failure
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_expression_leftover_is_reported() {
    let parsed = parse_expression("1+2 garbage").unwrap();
    assert_eq!(parsed.remainder, " garbage");
    assert!(!parsed.is_complete());
    assert_eq!(parsed.ast.children()[0].tag(), Tag::Sum);
}

#[test]
fn test_dangling_operator_fails_program() {
    assert_eq!(parse("1+"), Err(ParseError::NoMatch));
}

#[test]
fn test_dangling_operator_leaves_expression_remainder() {
    let parsed = parse_expression("1+").unwrap();
    assert_eq!(parsed.remainder, "+");
}

#[test]
fn test_program_leftover_after_valid_lines() {
    let parsed = parse_ok("x=1;1+");
    assert_eq!(parsed.ast.children().len(), 1);
    assert_eq!(parsed.remainder, "1+");
}

#[test]
fn test_statements_on_one_line_need_a_delimiter() {
    assert_eq!(parse("1 2"), Err(ParseError::NoMatch));
    assert_eq!(parse_ok("1; 2").ast.children().len(), 2);
}

#[test]
fn test_unbalanced_parenthesis_fails() {
    assert_eq!(parse("(1+2"), Err(ParseError::NoMatch));
    assert_eq!(parse_expression(")"), Err(ParseError::NoMatch));
}

#[test]
fn test_name_before_parenthesis_must_be_a_call() {
    // `a(` commits to a call, so the tail is not re-read as `a` then `(...)`.
    assert_eq!(parse_expression("a(1"), Err(ParseError::NoMatch));
    assert_eq!(parse_expression("a (1 2"), Err(ParseError::NoMatch));
    let parsed = parse_expression("a+(1").unwrap();
    assert_eq!(parsed.remainder, "+(1");
}

#[test]
fn test_unclosed_calls_fail_in_linear_time() {
    let deep = MAX_NESTING_DEPTH - 4;
    let inputs = [
        format!("{}1", "a(".repeat(deep)),
        format!("{}1", "a((".repeat(deep / 2)),
        format!("x = {}", "f(1 (".repeat(deep / 2)),
        format!("{}1 ", "g(x, ".repeat(deep)),
    ];
    let start = Instant::now();
    for input in &inputs {
        assert_eq!(parse(input), Err(ParseError::NoMatch), "input {input:?}");
    }
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "took {:?}",
        start.elapsed()
    );
}

#[test]
fn test_closed_deep_calls_parse() {
    let deep = MAX_NESTING_DEPTH;
    let source = format!("{}1{}", "a(".repeat(deep), ")".repeat(deep));
    let parsed = parse_ok(&source);
    assert!(parsed.is_complete());
    assert_eq!(parsed.ast.children().len(), 1);
}

#[test]
fn test_nesting_limit() {
    let ok = format!("{}1{}", "(".repeat(MAX_NESTING_DEPTH), ")".repeat(MAX_NESTING_DEPTH));
    assert!(parse(&ok).is_ok());

    let depth = MAX_NESTING_DEPTH + 1;
    let deep = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(
        parse(&deep),
        Err(ParseError::NestingTooDeep {
            depth,
            limit: MAX_NESTING_DEPTH
        })
    );
    assert!(matches!(
        parse_expression(&deep),
        Err(ParseError::NestingTooDeep { .. })
    ));
}

// ─────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_render_expression() {
    let parsed = parse_expression("2+3*4").unwrap();
    assert_eq!(
        parsed.ast.to_string(),
        "Expression[Sum[2 Terms[Term[OpAdd[+] Multiplication[3 Terms[Term[OpMult[*] 4]]]]]]]"
    );
}

#[test]
fn test_render_call() {
    let parsed = parse_expression("f(1,2)").unwrap();
    assert_eq!(
        parsed.ast.to_string(),
        "Expression[FunctionCall[f( Arguments[Argument[Expression[1] ,] Argument[Expression[2] ]])]]"
    );
}

#[test]
fn test_render_program() {
    let parsed = parse_ok("x=2;y");
    assert_eq!(
        parsed.ast.to_string(),
        "Lines[Line[VariableDeclaration[x= Expression[2]] ] Line[Expression[y] ]]"
    );
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parse_determinism_100_iterations() {
    let source = "f(a, b) = a * (b + 1)\nx = f(2, 3)\nx / 4; f(x x)\n";
    let first = parse_ok(source).ast;
    for _ in 0..100 {
        assert_eq!(parse_ok(source).ast, first);
    }
}
