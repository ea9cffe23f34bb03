use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use calx_eval::{
    EvalLimits, Evaluator, LineResult, DEFAULT_GAS_LIMIT, DEFAULT_MAX_CALL_DEPTH,
    DEFAULT_MAX_EVAL_DEPTH,
};
use calx_types::{Diagnostic, Node};
use clap::Parser;
use serde::Serialize;

/// calx parses and runs programs of numeric assignments, user functions and
/// arithmetic expressions, one result per line.
#[derive(Parser, Debug)]
#[command(name = "calx", version, about, long_about = None)]
struct Args {
    /// Program file to run. Reads standard input when omitted.
    file: Option<PathBuf>,

    /// Print one JSON report instead of text.
    #[arg(long)]
    json: bool,

    /// Only print line results, without the remainder and tree header.
    #[arg(short, long)]
    quiet: bool,

    /// Evaluation steps allowed per line.
    #[arg(long, default_value_t = DEFAULT_GAS_LIMIT)]
    gas_limit: u64,

    /// Deepest allowed nesting of function calls.
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Deepest allowed nesting of evaluated expressions, calls included.
    #[arg(long, default_value_t = DEFAULT_MAX_EVAL_DEPTH)]
    max_eval_depth: usize,
}

impl Args {
    fn limits(&self) -> EvalLimits {
        EvalLimits {
            gas_limit: self.gas_limit,
            max_call_depth: self.max_call_depth,
            max_eval_depth: self.max_eval_depth,
        }
    }
}

/// `--json` output.
#[derive(Debug, Serialize)]
struct Report<'a> {
    remainder: &'a str,
    ast: &'a Node,
    results: Vec<LineReport<'a>>,
}

#[derive(Debug, Serialize)]
struct LineReport<'a> {
    #[serde(flatten)]
    result: &'a LineResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<Diagnostic>,
}

impl<'a> LineReport<'a> {
    fn new(result: &'a LineResult) -> Self {
        let diagnostic = match result {
            LineResult::Error { error } => Some(error.to_diagnostic()),
            _ => None,
        };
        Self { result, diagnostic }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let source = read_source(&args)?;

    let parsed = match calx_parser::parse(&source) {
        Ok(parsed) => parsed,
        Err(err) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&err.to_diagnostic())?);
            } else {
                eprintln!("Parser Failed");
                eprintln!("{}", err.to_diagnostic());
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut evaluator = Evaluator::with_limits(args.limits());
    let results = evaluator.execute(&parsed.ast);

    if args.json {
        let report = Report {
            remainder: parsed.remainder,
            ast: &parsed.ast,
            results: results.iter().map(LineReport::new).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    if !args.quiet {
        print!("{}", header(parsed.remainder, &parsed.ast));
    }
    for result in &results {
        if result.is_error() {
            eprintln!("{result}");
        } else {
            println!("{result}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_source(args: &Args) -> anyhow::Result<String> {
    match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read standard input")?;
            Ok(source)
        }
    }
}

/// Remainder, tree rendering and the output separator.
fn header(remainder: &str, ast: &Node) -> String {
    format!("Unprocessed: \"{remainder}\"\nAst: {ast}\n---------------- OUTPUT -------------\n")
}
