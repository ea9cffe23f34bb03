//! Variable and function environment for the calx evaluator.

use calx_types::Node;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Variable bindings of one frame.
pub type Variables = BTreeMap<String, f64>;

/// A declared function: ordered parameter names and the body expression,
/// borrowed from the syntax tree it was declared in.
#[derive(Debug, Clone, PartialEq)]
pub struct Function<'ast> {
    pub params: Vec<String>,
    pub body: &'ast Node,
}

/// Functions by name.
pub type FunctionTable<'ast> = BTreeMap<String, Function<'ast>>;

/// Evaluation environment.
///
/// Every frame owns its variables. The function table is shared by all
/// frames of one program run: a declaration made on a later line is visible
/// to calls evaluated after it, from any frame.
#[derive(Debug)]
pub struct Environment<'ast> {
    variables: Variables,
    functions: Rc<RefCell<FunctionTable<'ast>>>,
}

impl<'ast> Environment<'ast> {
    /// Create an empty top-level environment.
    pub fn new() -> Self {
        Self {
            variables: Variables::new(),
            functions: Rc::new(RefCell::new(FunctionTable::new())),
        }
    }

    /// Look up a variable in this frame.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    /// Bind or rebind a variable in this frame.
    pub fn assign(&mut self, name: &str, value: f64) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Register a function, replacing any earlier one of the same name.
    pub fn declare(&self, name: &str, function: Function<'ast>) {
        self.functions.borrow_mut().insert(name.to_string(), function);
    }

    pub fn function(&self, name: &str) -> Option<Function<'ast>> {
        self.functions.borrow().get(name).cloned()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.borrow().contains_key(name)
    }

    /// Build the frame a function body runs in.
    ///
    /// The caller's variables are copied, then `args[i]` is bound to
    /// `params[i]`; surplus arguments are ignored. The callee can never
    /// write through to the caller's bindings. The function table is shared.
    pub fn call_frame(&self, params: &[String], args: &[f64]) -> Environment<'ast> {
        let mut variables = self.variables.clone();
        for (param, value) in params.iter().zip(args) {
            variables.insert(param.clone(), *value);
        }
        Environment {
            variables,
            functions: Rc::clone(&self.functions),
        }
    }
}

impl Default for Environment<'_> {
    fn default() -> Self {
        Self::new()
    }
}
